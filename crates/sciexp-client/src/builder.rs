use sciexp_rpc::{
    ComputationalResourceScheduling, DataType, ExperimentModel, ExperimentType, InputDataObject,
    OutputDataObject, UserConfigurationData,
};

use crate::context::GatewayContext;
use crate::error::GatewayError;
use crate::request::LaunchRequest;

pub const INPUT_TAR_FILE: &str = "Input_Tar_File";
pub const WALLTIME_INPUT: &str = "Walltime";
pub const PARALLEL_GROUP_INPUT: &str = "Parallel_Group_Count";
pub const OUTPUT_DATA: &str = "Output_Data";

/// Cluster family that submits under a per-user DN.
const USER_DN_RESOURCE_FAMILY: &str = "jureca";

/// Whether `resource` submits jobs under a user DN built from the cluster user.
pub fn requires_user_dn(resource: &str) -> bool {
    resource
        .to_ascii_lowercase()
        .contains(USER_DN_RESOURCE_FAMILY)
}

/// Translates a flat launch request into the nested experiment entity.
///
/// Performs no remote calls. Fails only when an identifier the service needs
/// is missing.
pub fn build_experiment_model(
    request: &LaunchRequest,
    gateway: &GatewayContext,
    project_id: &str,
) -> Result<ExperimentModel, GatewayError> {
    request.validate()?;
    if project_id.trim().is_empty() {
        return Err(GatewayError::LocalValidation(
            "project_id must not be empty".to_string(),
        ));
    }
    if gateway.gateway_id.trim().is_empty() {
        return Err(GatewayError::LocalValidation(
            "gateway_id must not be empty".to_string(),
        ));
    }

    let scheduling = ComputationalResourceScheduling {
        resource_host_id: request.resource.clone(),
        queue_name: request.queue.clone(),
        node_count: request.nodes,
        total_cpu_count: request.cores,
        wall_time_limit: request.wall_time_minutes,
    };

    let user_dn = match request.cluster_user.as_deref().map(str::trim) {
        Some(user) if !user.is_empty() && requires_user_dn(&request.resource) => {
            Some(format!("CN={}", user))
        }
        _ => None,
    };

    let user_configuration_data = UserConfigurationData {
        airavata_auto_schedule: false,
        override_manual_scheduled_params: false,
        share_experiment_publicly: false,
        computational_resource_scheduling: scheduling,
        experiment_data_dir: Some(request.output_dir.clone()),
        generate_cert: user_dn.is_some(),
        user_dn,
    };

    let inputs = vec![
        InputDataObject {
            name: INPUT_TAR_FILE.to_string(),
            value: request.input_path.clone(),
            data_type: DataType::Uri,
            is_required: true,
            input_order: 0,
        },
        InputDataObject {
            name: WALLTIME_INPUT.to_string(),
            value: request.wall_time_minutes.to_string(),
            data_type: DataType::Integer,
            is_required: true,
            input_order: 1,
        },
        InputDataObject {
            name: PARALLEL_GROUP_INPUT.to_string(),
            value: request.groups.to_string(),
            data_type: DataType::Integer,
            is_required: true,
            input_order: 2,
        },
    ];

    let outputs = vec![OutputDataObject {
        name: OUTPUT_DATA.to_string(),
        value: String::new(),
        data_type: DataType::Uri,
        data_movement: true,
        location: Some(request.output_dir.clone()),
    }];

    Ok(ExperimentModel {
        experiment_id: None,
        project_id: project_id.to_string(),
        gateway_id: gateway.gateway_id.clone(),
        experiment_type: ExperimentType::SingleApplication,
        user_name: request.user_id.clone(),
        experiment_name: request.experiment_name.clone(),
        description: Some(format!(
            "{} submitted from {} (request {})",
            request.experiment_name, request.source_host, request.request_id
        )),
        execution_id: gateway.application_interface_id.clone(),
        gateway_execution_id: Some(request.request_id.clone()),
        user_configuration_data,
        experiment_inputs: inputs,
        experiment_outputs: outputs,
        experiment_status: None,
        errors: None,
    })
}
