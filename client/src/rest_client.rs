use crate::protocol::{self, AssignRoleVariables, OperationRequest};
use crate::{ClientConfig, ControlPlane};
use kvcluster_common::{
    ClusterState, NodeDescription, Result, RoleAssignmentRequest, RoleAssignmentResult,
    TopologyError,
};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, info, instrument, warn};

/// Admin API client: every operation is one HTTP POST to `api_path`.
pub struct AdminApiClient {
    http: reqwest::Client,
    config: ClientConfig,
    api_url: String,
}

impl AdminApiClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| TopologyError::config(format!("failed to build HTTP client: {}", e)))?;

        let api_url = config.api_url();
        info!("Using control plane at {}", api_url);

        Ok(Self {
            http,
            config,
            api_url,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn transport_error(&self, err: reqwest::Error) -> TopologyError {
        let message = if err.is_timeout() {
            format!("timed out after {}s: {}", self.config.request_timeout_seconds, err)
        } else {
            err.to_string()
        };
        TopologyError::Transport {
            endpoint: self.config.endpoint.clone(),
            message,
        }
    }

    /// Send one operation and return the parsed response envelope.
    async fn execute<V: Serialize>(
        &self,
        operation: &str,
        query: &str,
        variables: Option<V>,
    ) -> Result<Value> {
        let body = OperationRequest { query, variables };

        let response = self
            .http
            .post(&self.api_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| self.transport_error(e))?;

        let envelope: Value = serde_json::from_slice(&bytes).map_err(|e| TopologyError::Decode {
            operation: operation.to_string(),
            message: format!("HTTP {} with non-JSON body: {}", status, e),
        })?;

        debug!("{} -> HTTP {}: {}", operation, status, envelope);

        Ok(envelope)
    }
}

#[async_trait::async_trait]
impl ControlPlane for AdminApiClient {
    fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    #[instrument(skip(self))]
    async fn probe(&self) -> Result<()> {
        let url = self.config.probe_url();

        let response = self
            .http
            .get(&url)
            .timeout(self.config.probe_timeout())
            .send()
            .await
            .map_err(|e| TopologyError::Unreachable {
                endpoint: self.config.endpoint.clone(),
                message: if e.is_timeout() {
                    format!("no answer within {}s", self.config.probe_timeout_seconds)
                } else {
                    e.to_string()
                },
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TopologyError::Unreachable {
                endpoint: self.config.endpoint.clone(),
                message: format!("GET {} returned HTTP {}", url, status),
            });
        }

        debug!("Probe of {} succeeded with HTTP {}", url, status);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_servers(&self) -> Result<Vec<NodeDescription>> {
        let envelope = self
            .execute::<()>("getServers", protocol::GET_SERVERS, None)
            .await?;
        let servers = protocol::decode_servers(&envelope)?;

        {
            let mut seen = HashSet::with_capacity(servers.len());
            for server in &servers {
                if !seen.insert(server.uri.as_str()) {
                    warn!("Control plane listed uri {} more than once", server.uri);
                }
            }
        }

        info!("Discovered {} servers", servers.len());
        Ok(servers)
    }

    #[instrument(skip(self))]
    async fn get_cluster_state(&self) -> Result<ClusterState> {
        let envelope = self
            .execute::<()>("getClusterState", protocol::GET_CLUSTER_STATE, None)
            .await?;
        let state = protocol::decode_cluster_state(&envelope)?;

        info!(
            "Cluster self={} failover={} known_roles={}",
            state.self_uri,
            state.failover_mode,
            state.known_roles.len()
        );
        Ok(state)
    }

    #[instrument(skip(self, request), fields(uri = %request.target_node().uri))]
    async fn assign_role(&self, request: &RoleAssignmentRequest) -> Result<RoleAssignmentResult> {
        let variables = AssignRoleVariables::from(request);
        let envelope = self
            .execute("assignRole", protocol::ASSIGN_ROLE, Some(variables))
            .await?;

        let result = protocol::classify_assignment(envelope);
        if result.success {
            info!("Assigned {:?} to {}", request.roles(), request.target_node().uri);
        } else {
            warn!(
                "Assignment of {:?} to {} was not accepted",
                request.roles(),
                request.target_node().uri
            );
        }
        Ok(result)
    }
}
