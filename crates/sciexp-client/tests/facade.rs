use sciexp_client::{
    build_experiment_model, GatewayClient, GatewayContext, GatewayError, LaunchRequest,
    ReconciledStatus, DEFAULT_PROJECT_NAME, LAUNCH_CONFIRMATION, TERMINATION_CONFIRMATION,
};
use sciexp_rpc::{
    AuthzToken, ErrorModel, ExperimentModel, ExperimentState, ExperimentStatus, JobState,
    JobStatus, JobStatuses, Project, RpcChannel, RpcError,
};
use serde_json::{json, Value};
use std::cell::RefCell;
use std::rc::Rc;

type CallLog = Rc<RefCell<Vec<String>>>;

/// In-memory service whose answers are fixed up front.
struct ScriptedChannel {
    log: CallLog,
    projects: Result<Vec<Project>, RpcError>,
    created_project: Result<String, RpcError>,
    create: Result<String, RpcError>,
    launch: Result<(), RpcError>,
    state: Result<ExperimentState, RpcError>,
    jobs: Result<JobStatuses, RpcError>,
    /// Wire replies decoded in place of `state` / `jobs` when set.
    raw_status: Option<Value>,
    raw_jobs: Option<Value>,
    errors: Option<Vec<ErrorModel>>,
    fetch: Result<(), RpcError>,
    terminate: Result<(), RpcError>,
    submitted: RefCell<Option<ExperimentModel>>,
}

impl ScriptedChannel {
    fn new(log: &CallLog) -> Self {
        Self {
            log: Rc::clone(log),
            projects: Ok(vec![project(Some("proj-42"))]),
            created_project: Ok("proj-new".to_string()),
            create: Ok("exp-100".to_string()),
            launch: Ok(()),
            state: Ok(ExperimentState::Created),
            jobs: Ok(JobStatuses::new()),
            raw_status: None,
            raw_jobs: None,
            errors: None,
            fetch: Ok(()),
            terminate: Ok(()),
            submitted: RefCell::new(None),
        }
    }

    fn record(&self, call: &str) {
        self.log.borrow_mut().push(call.to_string());
    }
}

impl RpcChannel for ScriptedChannel {
    fn get_user_projects(
        &self,
        _token: &AuthzToken,
        gateway_id: &str,
        user_name: &str,
    ) -> Result<Vec<Project>, RpcError> {
        assert_eq!(gateway_id, "ultrascan");
        assert_eq!(user_name, "alice");
        self.record("getUserProjects");
        self.projects.clone()
    }

    fn create_project(
        &self,
        _token: &AuthzToken,
        _gateway_id: &str,
        project: &Project,
    ) -> Result<String, RpcError> {
        assert_eq!(project.name, DEFAULT_PROJECT_NAME);
        assert_eq!(project.owner, "alice");
        self.record("createProject");
        self.created_project.clone()
    }

    fn create_experiment(
        &self,
        _token: &AuthzToken,
        _gateway_id: &str,
        model: &ExperimentModel,
    ) -> Result<String, RpcError> {
        self.record("createExperiment");
        *self.submitted.borrow_mut() = Some(model.clone());
        self.create.clone()
    }

    fn launch_experiment(
        &self,
        _token: &AuthzToken,
        experiment_id: &str,
        _gateway_id: &str,
    ) -> Result<(), RpcError> {
        self.record(&format!("launchExperiment:{}", experiment_id));
        self.launch.clone()
    }

    fn get_experiment_status(
        &self,
        _token: &AuthzToken,
        _experiment_id: &str,
    ) -> Result<ExperimentStatus, RpcError> {
        self.record("getExperimentStatus");
        match &self.raw_status {
            Some(raw) => serde_json::from_value(raw.clone())
                .map_err(|err| RpcError::Protocol(err.to_string())),
            None => self.state.clone().map(ExperimentStatus::new),
        }
    }

    fn get_job_statuses(
        &self,
        _token: &AuthzToken,
        _experiment_id: &str,
    ) -> Result<JobStatuses, RpcError> {
        self.record("getJobStatuses");
        match &self.raw_jobs {
            Some(raw) => serde_json::from_value(raw.clone())
                .map_err(|err| RpcError::Protocol(err.to_string())),
            None => self.jobs.clone(),
        }
    }

    fn get_experiment(
        &self,
        _token: &AuthzToken,
        experiment_id: &str,
    ) -> Result<ExperimentModel, RpcError> {
        self.record("getExperiment");
        self.fetch.clone()?;
        let mut model =
            build_experiment_model(&request(), &gateway(), "proj-42").expect("stored model");
        model.experiment_id = Some(experiment_id.to_string());
        model.errors = self.errors.clone();
        Ok(model)
    }

    fn terminate_experiment(
        &self,
        _token: &AuthzToken,
        experiment_id: &str,
        _gateway_id: &str,
    ) -> Result<(), RpcError> {
        self.record(&format!("terminateExperiment:{}", experiment_id));
        self.terminate.clone()
    }

    fn close(&mut self) {
        self.record("close");
    }
}

fn project(id: Option<&str>) -> Project {
    Project {
        project_id: id.map(str::to_string),
        owner: "alice".to_string(),
        gateway_id: "ultrascan".to_string(),
        name: "Existing".to_string(),
        description: None,
    }
}

fn gateway() -> GatewayContext {
    GatewayContext {
        gateway_id: "ultrascan".to_string(),
        application_interface_id: None,
    }
}

fn request() -> LaunchRequest {
    LaunchRequest {
        source_host: "uslims3.example.edu".to_string(),
        user_id: "alice".to_string(),
        experiment_name: "US3-AIRA".to_string(),
        request_id: "uslims3_CU_Boulder_1974".to_string(),
        resource: "comet.sdsc.edu".to_string(),
        queue: "normal".to_string(),
        cores: 24,
        nodes: 1,
        groups: 1,
        wall_time_minutes: 60,
        cluster_user: None,
        input_path: "in.tar".to_string(),
        output_dir: "/out".to_string(),
    }
}

fn client_with(configure: impl FnOnce(&mut ScriptedChannel)) -> (GatewayClient<ScriptedChannel>, CallLog) {
    let log = CallLog::default();
    let mut channel = ScriptedChannel::new(&log);
    configure(&mut channel);
    (GatewayClient::with_channel(channel, gateway()), log)
}

fn calls(log: &CallLog) -> Vec<String> {
    log.borrow().clone()
}

fn jobs(entries: &[(&str, JobState)]) -> JobStatuses {
    entries
        .iter()
        .map(|(name, state)| (name.to_string(), JobStatus::new(*state)))
        .collect()
}

#[test]
fn launch_resolves_creates_then_launches() {
    let (client, log) = client_with(|_| {});
    let outcome = client.launch(&request());

    assert!(outcome.launched);
    assert_eq!(outcome.experiment_id.as_deref(), Some("exp-100"));
    assert_eq!(outcome.message, LAUNCH_CONFIRMATION);
    assert_eq!(outcome.error_code, None);
    assert_eq!(
        calls(&log),
        vec![
            "getUserProjects",
            "createExperiment",
            "launchExperiment:exp-100"
        ]
    );

    let submitted = client.context().channel().submitted.borrow().clone().expect("model sent");
    assert_eq!(submitted.project_id, "proj-42");
    assert_eq!(
        submitted
            .user_configuration_data
            .computational_resource_scheduling
            .total_cpu_count,
        24
    );
}

#[test]
fn launch_creates_default_project_when_user_has_none() {
    let (client, log) = client_with(|c| c.projects = Ok(vec![]));
    let outcome = client.launch(&request());

    assert!(outcome.launched);
    assert_eq!(
        calls(&log),
        vec![
            "getUserProjects",
            "createProject",
            "createExperiment",
            "launchExperiment:exp-100"
        ]
    );
    let submitted = client.context().channel().submitted.borrow().clone().expect("model sent");
    assert_eq!(submitted.project_id, "proj-new");
}

#[test]
fn project_lookup_failure_creates_nothing() {
    let (client, log) = client_with(|c| {
        c.projects = Err(RpcError::Connectivity("timed out".to_string()))
    });
    let outcome = client.launch(&request());

    assert!(!outcome.launched);
    assert_eq!(outcome.experiment_id, None);
    assert_eq!(outcome.error_code, Some("lookup_failed"));
    assert!(outcome.message.contains("timed out"), "{}", outcome.message);
    assert_eq!(calls(&log), vec!["getUserProjects"]);
}

#[test]
fn create_failure_never_launches() {
    let (client, log) = client_with(|c| {
        c.create = Err(RpcError::InvalidRequest("queue unknown".to_string()))
    });
    let outcome = client.launch(&request());

    assert!(!outcome.launched);
    assert_eq!(outcome.error_code, Some("create_failed"));
    assert_eq!(calls(&log), vec!["getUserProjects", "createExperiment"]);
}

#[test]
fn launch_failure_reports_orphaned_experiment_without_identity() {
    let (client, log) = client_with(|c| {
        c.launch = Err(RpcError::RemoteSystem("scheduler down".to_string()))
    });
    let outcome = client.launch(&request());

    assert!(!outcome.launched);
    assert_eq!(outcome.experiment_id, None);
    assert_eq!(outcome.error_code, Some("launch_failed"));
    assert!(outcome.message.contains("exp-100"), "{}", outcome.message);
    assert_eq!(
        calls(&log),
        vec![
            "getUserProjects",
            "createExperiment",
            "launchExperiment:exp-100"
        ]
    );
}

#[test]
fn invalid_request_is_rejected_before_any_remote_call() {
    let (client, log) = client_with(|_| {});
    let mut bad = request();
    bad.nodes = 0;
    let outcome = client.launch(&bad);

    assert!(!outcome.launched);
    assert_eq!(outcome.error_code, Some("local_validation"));
    assert!(calls(&log).is_empty());
}

#[test]
fn executing_with_queued_job_reports_queued() {
    let (client, log) = client_with(|c| {
        c.state = Ok(ExperimentState::Executing);
        c.jobs = Ok(jobs(&[("job_1", JobState::Queued)]));
    });
    assert_eq!(client.get_status("exp-100").unwrap(), ReconciledStatus::Queued);
    assert_eq!(calls(&log), vec!["getExperimentStatus", "getJobStatuses"]);
}

#[test]
fn executing_with_finished_job_stays_executing() {
    let (client, _log) = client_with(|c| {
        c.state = Ok(ExperimentState::Executing);
        c.jobs = Ok(jobs(&[("job_1", JobState::Complete)]));
    });
    assert_eq!(
        client.get_status("exp-100").unwrap(),
        ReconciledStatus::Executing
    );
}

#[test]
fn completed_with_failed_job_reports_failed() {
    let (client, _log) = client_with(|c| {
        c.state = Ok(ExperimentState::Completed);
        c.jobs = Ok(jobs(&[("job_1", JobState::Failed)]));
    });
    assert_eq!(client.get_status("exp-100").unwrap(), ReconciledStatus::Failed);
}

#[test]
fn only_first_job_in_key_order_is_consulted() {
    let (client, _log) = client_with(|c| {
        c.state = Ok(ExperimentState::Executing);
        c.jobs = Ok(jobs(&[("job_b", JobState::Active), ("job_a", JobState::Suspended)]));
    });
    assert_eq!(
        client.get_status("exp-100").unwrap(),
        ReconciledStatus::Executing
    );
}

#[test]
fn empty_job_collection_keeps_experiment_state() {
    let (client, _log) = client_with(|c| c.state = Ok(ExperimentState::Executing));
    assert_eq!(
        client.get_status("exp-100").unwrap(),
        ReconciledStatus::Executing
    );
}

#[test]
fn other_states_skip_job_query() {
    for state in [
        ExperimentState::Created,
        ExperimentState::Scheduled,
        ExperimentState::Launched,
        ExperimentState::Canceling,
        ExperimentState::Canceled,
        ExperimentState::Failed,
        ExperimentState::Unknown,
    ] {
        let (client, log) = client_with(|c| {
            c.state = Ok(state);
            c.jobs = Err(RpcError::RemoteSystem("must not be called".to_string()));
        });
        let status = client.get_status("exp-100").unwrap();
        assert_eq!(status.as_str(), state.as_str());
        assert_eq!(calls(&log), vec!["getExperimentStatus"]);
    }
}

#[test]
fn unset_experiment_state_reports_unknown() {
    for raw in [json!({}), json!({ "state": null })] {
        let (client, log) = client_with(|c| c.raw_status = Some(raw));
        assert_eq!(
            client.get_status("exp-100").unwrap(),
            ReconciledStatus::Unknown
        );
        assert_eq!(calls(&log), vec!["getExperimentStatus"]);
    }
}

#[test]
fn job_without_state_keeps_experiment_state() {
    let (client, log) = client_with(|c| {
        c.raw_status = Some(json!({ "state": 4 }));
        c.raw_jobs = Some(json!({ "job_1": {} }));
    });
    assert_eq!(
        client.get_status("exp-100").unwrap(),
        ReconciledStatus::Executing
    );
    assert_eq!(calls(&log), vec!["getExperimentStatus", "getJobStatuses"]);

    let (client, _log) = client_with(|c| {
        c.raw_status = Some(json!({ "state": 7 }));
        c.raw_jobs = Some(json!({ "job_1": { "job_state": null } }));
    });
    assert_eq!(
        client.get_status("exp-100").unwrap(),
        ReconciledStatus::Completed
    );
}

#[test]
fn job_query_failure_is_surfaced() {
    let (client, _log) = client_with(|c| {
        c.state = Ok(ExperimentState::Completed);
        c.jobs = Err(RpcError::Connectivity("reset".to_string()));
    });
    let err = client.get_status("exp-100").unwrap_err();
    assert!(matches!(err, GatewayError::JobStatusQueryFailed { .. }), "{}", err);
}

#[test]
fn experiment_query_failure_is_surfaced() {
    let (client, log) = client_with(|c| {
        c.state = Err(RpcError::NotFound("exp-404".to_string()))
    });
    let err = client.get_status("exp-404").unwrap_err();
    assert_eq!(err.code(), "status_query_failed");
    assert_eq!(err.rpc_error().map(RpcError::kind), Some("not_found"));
    assert_eq!(calls(&log), vec!["getExperimentStatus"]);
}

#[test]
fn status_is_stable_across_repeated_queries() {
    let (client, _log) = client_with(|c| {
        c.state = Ok(ExperimentState::Executing);
        c.jobs = Ok(jobs(&[("job_1", JobState::Active)]));
    });
    let first = client.get_status("exp-100").unwrap();
    let second = client.get_status("exp-100").unwrap();
    assert_eq!(first, ReconciledStatus::Active);
    assert_eq!(first, second);
}

#[test]
fn errors_absent_when_none_recorded() {
    let (client, _log) = client_with(|c| c.errors = Some(vec![]));
    assert_eq!(client.get_errors("exp-100").unwrap(), None);

    let (client, _log) = client_with(|c| c.errors = None);
    assert_eq!(client.get_errors("exp-100").unwrap(), None);
}

#[test]
fn errors_return_only_first_message() {
    let (client, _log) = client_with(|c| {
        c.errors = Some(vec![
            ErrorModel {
                actual_error_message: Some("walltime exceeded".to_string()),
                ..ErrorModel::default()
            },
            ErrorModel {
                actual_error_message: Some("staging failed".to_string()),
                ..ErrorModel::default()
            },
        ])
    });
    assert_eq!(
        client.get_errors("exp-100").unwrap().as_deref(),
        Some("walltime exceeded")
    );
}

#[test]
fn errors_fall_back_to_user_friendly_message() {
    let (client, _log) = client_with(|c| {
        c.errors = Some(vec![ErrorModel {
            user_friendly_message: Some("job ran out of time".to_string()),
            ..ErrorModel::default()
        }])
    });
    assert_eq!(
        client.get_errors("exp-100").unwrap().as_deref(),
        Some("job ran out of time")
    );
}

#[test]
fn errors_fetch_failure_is_surfaced() {
    let (client, _log) = client_with(|c| c.fetch = Err(RpcError::NotFound("exp-9".to_string())));
    let err = client.get_errors("exp-9").unwrap_err();
    assert_eq!(err.code(), "fetch_failed");
}

#[test]
fn terminate_reports_remote_outcome() {
    let (client, log) = client_with(|_| {});
    let outcome = client.terminate("exp-100");
    assert!(outcome.terminated);
    assert_eq!(outcome.message, TERMINATION_CONFIRMATION);
    assert_eq!(calls(&log), vec!["terminateExperiment:exp-100"]);

    let (client, _log) = client_with(|c| {
        c.terminate = Err(RpcError::InvalidRequest("already finished".to_string()))
    });
    let outcome = client.terminate("exp-100");
    assert!(!outcome.terminated);
    assert!(!outcome.message.is_empty());
    assert_eq!(outcome.error_code, Some("termination_failed"));
}

#[test]
fn blank_experiment_id_is_caller_error() {
    let (client, log) = client_with(|_| {});
    assert_eq!(client.get_status(" ").unwrap_err().code(), "local_validation");
    assert_eq!(client.get_errors("").unwrap_err().code(), "local_validation");
    assert!(!client.terminate("").terminated);
    assert!(calls(&log).is_empty());
}

#[test]
fn channel_closed_once_on_drop() {
    let (client, log) = client_with(|c| c.state = Ok(ExperimentState::Launched));
    client.get_status("exp-100").unwrap();
    client.get_status("exp-100").unwrap();
    drop(client);
    let closes = calls(&log).iter().filter(|c| *c == "close").count();
    assert_eq!(closes, 1);
}

#[test]
fn explicit_shutdown_does_not_close_twice() {
    let (client, log) = client_with(|_| {});
    client.shutdown();
    assert_eq!(calls(&log), vec!["close"]);
}
