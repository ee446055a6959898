//! In-memory control plane for unit tests.

use async_trait::async_trait;
use kvcluster_client::ControlPlane;
use kvcluster_common::{
    ClusterState, FailoverMode, NodeDescription, Result, RoleAssignmentRequest,
    RoleAssignmentResult, TopologyError,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub(crate) struct MockControlPlane {
    pub reachable: bool,
    pub servers: Vec<NodeDescription>,
    pub state: ClusterState,
    pub join_response: Value,
    pub calls: AtomicUsize,
    pub assignments: Mutex<Vec<RoleAssignmentRequest>>,
}

impl MockControlPlane {
    pub fn new(self_uri: &str, uris: &[&str]) -> Self {
        Self {
            reachable: true,
            servers: uris.iter().map(|u| NodeDescription::new(*u)).collect(),
            state: ClusterState {
                self_uri: self_uri.to_string(),
                self_uuid: String::new(),
                failover_mode: FailoverMode::Disabled,
                known_roles: ["key-value", "vshard-router", "vshard-storage"]
                    .iter()
                    .map(|r| r.to_string())
                    .collect(),
                can_bootstrap_vshard: false,
                vshard_bucket_count: 30000,
            },
            join_response: json!({ "data": { "join_server": true } }),
            calls: AtomicUsize::new(0),
            assignments: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn assignments(&self) -> Vec<RoleAssignmentRequest> {
        self.assignments.lock().unwrap().clone()
    }
}

#[async_trait]
impl ControlPlane for MockControlPlane {
    fn endpoint(&self) -> &str {
        "mock:0"
    }

    async fn probe(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.reachable {
            Ok(())
        } else {
            Err(TopologyError::Unreachable {
                endpoint: self.endpoint().to_string(),
                message: "GET http://mock:0/ returned HTTP 503".to_string(),
            })
        }
    }

    async fn get_servers(&self) -> Result<Vec<NodeDescription>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.servers.clone())
    }

    async fn get_cluster_state(&self) -> Result<ClusterState> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.state.clone())
    }

    async fn assign_role(&self, request: &RoleAssignmentRequest) -> Result<RoleAssignmentResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.assignments.lock().unwrap().push(request.clone());
        Ok(kvcluster_client::protocol::classify_assignment(
            self.join_response.clone(),
        ))
    }
}
