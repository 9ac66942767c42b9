use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use crate::channel::{AuthzToken, RpcChannel};
use crate::error::RpcError;
use crate::model::{ExperimentModel, Project};
use crate::status::{ExperimentStatus, JobStatuses};

/// Channel that posts `{"method", "params"}` envelopes to `http://host:port/rpc`.
pub struct HttpChannel {
    endpoint: String,
    client: Option<Client>,
}

#[derive(Debug, Deserialize)]
struct ResponseEnvelope {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RemoteFault>,
}

#[derive(Debug, Deserialize)]
struct RemoteFault {
    kind: String,
    #[serde(default)]
    message: String,
}

impl HttpChannel {
    pub fn connect(host: &str, port: u16, timeout: Duration) -> Result<Self, RpcError> {
        if host.trim().is_empty() {
            return Err(RpcError::Connectivity("server host is empty".to_string()));
        }
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| RpcError::Connectivity(e.to_string()))?;
        let endpoint = format!("http://{}:{}/rpc", host, port);
        debug!(endpoint = %endpoint, timeout_ms = timeout.as_millis() as u64, "rpc channel opened");
        Ok(Self {
            endpoint,
            client: Some(client),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn is_closed(&self) -> bool {
        self.client.is_none()
    }

    fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, RpcError> {
        let client = self.client.as_ref().ok_or(RpcError::Closed)?;
        debug!(method, "rpc call");
        let response = client
            .post(&self.endpoint)
            .json(&json!({ "method": method, "params": params }))
            .send()
            .map_err(|e| RpcError::Connectivity(format!("{}: {}", method, e)))?;
        let http_status = response.status();
        let body = response
            .text()
            .map_err(|e| RpcError::Connectivity(format!("{}: {}", method, e)))?;
        let envelope: ResponseEnvelope = serde_json::from_str(&body).map_err(|e| {
            RpcError::Protocol(format!("{}: http {}: {}", method, http_status, e))
        })?;
        if let Some(fault) = envelope.error {
            debug!(method, kind = %fault.kind, "rpc fault");
            return Err(RpcError::from_remote(&fault.kind, fault.message));
        }
        let value = envelope.result.unwrap_or(Value::Null);
        serde_json::from_value(value)
            .map_err(|e| RpcError::Protocol(format!("{}: malformed result: {}", method, e)))
    }
}

fn encode<T: serde::Serialize>(value: &T) -> Result<Value, RpcError> {
    serde_json::to_value(value).map_err(|e| RpcError::Protocol(e.to_string()))
}

impl RpcChannel for HttpChannel {
    fn get_user_projects(
        &self,
        token: &AuthzToken,
        gateway_id: &str,
        user_name: &str,
    ) -> Result<Vec<Project>, RpcError> {
        self.call(
            "getUserProjects",
            json!({
                "authz_token": encode(token)?,
                "gateway_id": gateway_id,
                "user_name": user_name,
                "limit": -1,
                "offset": 0,
            }),
        )
    }

    fn create_project(
        &self,
        token: &AuthzToken,
        gateway_id: &str,
        project: &Project,
    ) -> Result<String, RpcError> {
        self.call(
            "createProject",
            json!({
                "authz_token": encode(token)?,
                "gateway_id": gateway_id,
                "project": encode(project)?,
            }),
        )
    }

    fn create_experiment(
        &self,
        token: &AuthzToken,
        gateway_id: &str,
        model: &ExperimentModel,
    ) -> Result<String, RpcError> {
        self.call(
            "createExperiment",
            json!({
                "authz_token": encode(token)?,
                "gateway_id": gateway_id,
                "experiment": encode(model)?,
            }),
        )
    }

    fn launch_experiment(
        &self,
        token: &AuthzToken,
        experiment_id: &str,
        gateway_id: &str,
    ) -> Result<(), RpcError> {
        self.call(
            "launchExperiment",
            json!({
                "authz_token": encode(token)?,
                "experiment_id": experiment_id,
                "gateway_id": gateway_id,
            }),
        )
    }

    fn get_experiment_status(
        &self,
        token: &AuthzToken,
        experiment_id: &str,
    ) -> Result<ExperimentStatus, RpcError> {
        self.call(
            "getExperimentStatus",
            json!({
                "authz_token": encode(token)?,
                "experiment_id": experiment_id,
            }),
        )
    }

    fn get_job_statuses(
        &self,
        token: &AuthzToken,
        experiment_id: &str,
    ) -> Result<JobStatuses, RpcError> {
        self.call(
            "getJobStatuses",
            json!({
                "authz_token": encode(token)?,
                "experiment_id": experiment_id,
            }),
        )
    }

    fn get_experiment(
        &self,
        token: &AuthzToken,
        experiment_id: &str,
    ) -> Result<ExperimentModel, RpcError> {
        self.call(
            "getExperiment",
            json!({
                "authz_token": encode(token)?,
                "experiment_id": experiment_id,
            }),
        )
    }

    fn terminate_experiment(
        &self,
        token: &AuthzToken,
        experiment_id: &str,
        gateway_id: &str,
    ) -> Result<(), RpcError> {
        self.call(
            "terminateExperiment",
            json!({
                "authz_token": encode(token)?,
                "experiment_id": experiment_id,
                "gateway_id": gateway_id,
            }),
        )
    }

    fn close(&mut self) {
        if self.client.take().is_some() {
            debug!(endpoint = %self.endpoint, "rpc channel closed");
        }
    }
}
