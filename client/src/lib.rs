pub mod config;
pub mod protocol;
pub mod rest_client;

use kvcluster_common::{
    ClusterState, NodeDescription, Result, RoleAssignmentRequest, RoleAssignmentResult,
};

pub use config::*;
pub use rest_client::*;

/// Control-plane interface for topology queries and management mutations
#[async_trait::async_trait]
pub trait ControlPlane: Send + Sync {
    /// `host:port` this client talks to
    fn endpoint(&self) -> &str;

    /// Plain liveness request against the endpoint's root
    async fn probe(&self) -> Result<()>;

    /// List discovered cluster members, in control-plane order
    async fn get_servers(&self) -> Result<Vec<NodeDescription>>;

    /// Fetch the aggregate cluster view of the queried endpoint
    async fn get_cluster_state(&self) -> Result<ClusterState>;

    /// Bind roles to a node.
    ///
    /// The mutation is not guaranteed to be idempotent; confirm with a fresh
    /// `get_cluster_state` before issuing it again.
    async fn assign_role(&self, request: &RoleAssignmentRequest) -> Result<RoleAssignmentResult>;
}

/// Convenience client builder
pub struct ClientBuilder {
    config: ClientConfig,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
        }
    }

    pub fn endpoint<S: Into<String>>(mut self, endpoint: S) -> Self {
        self.config.endpoint = endpoint.into();
        self
    }

    pub fn api_path<S: Into<String>>(mut self, api_path: S) -> Self {
        self.config.api_path = api_path.into();
        self
    }

    pub fn probe_timeout(mut self, timeout_seconds: u64) -> Self {
        self.config.probe_timeout_seconds = timeout_seconds;
        self
    }

    pub fn request_timeout(mut self, timeout_seconds: u64) -> Self {
        self.config.request_timeout_seconds = timeout_seconds;
        self
    }

    pub fn build(self) -> Result<AdminApiClient> {
        AdminApiClient::new(self.config)
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
