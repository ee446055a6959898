use crate::error::{Result, TopologyError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;

/// Advertised `host:port` of a cluster member
pub type NodeUri = String;

/// Name of an assignable application role
pub type RoleName = String;

/// One discovered cluster member.
///
/// Optional fields stay `None` when the control plane omits them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDescription {
    pub uri: NodeUri,
    pub alias: Option<String>,
    pub status: Option<String>,
    pub uuid: Option<String>,
    pub message: Option<String>,
    pub replicaset_id: Option<String>,
}

impl NodeDescription {
    pub fn new(uri: impl Into<NodeUri>) -> Self {
        Self {
            uri: uri.into(),
            alias: None,
            status: None,
            uuid: None,
            message: None,
            replicaset_id: None,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_uuid(mut self, uuid: impl Into<String>) -> Self {
        self.uuid = Some(uuid.into());
        self
    }

    pub fn with_replicaset(mut self, replicaset_id: impl Into<String>) -> Self {
        self.replicaset_id = Some(replicaset_id.into());
        self
    }

    /// A node that already belongs to a replicaset has been joined before.
    pub fn is_joined(&self) -> bool {
        self.replicaset_id.is_some()
    }
}

impl fmt::Display for NodeDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.uri)?;
        if let Some(alias) = &self.alias {
            write!(f, " alias={}", alias)?;
        }
        if let Some(status) = &self.status {
            write!(f, " status={}", status)?;
        }
        if let Some(uuid) = &self.uuid {
            write!(f, " uuid={}", uuid)?;
        }
        if let Some(replicaset) = &self.replicaset_id {
            write!(f, " replicaset={}", replicaset)?;
        }
        if let Some(message) = self.message.as_deref().filter(|m| !m.is_empty()) {
            write!(f, " message={:?}", message)?;
        }
        Ok(())
    }
}

/// Failover mode as reported by the control plane
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailoverMode {
    Disabled,
    Eventual,
    Stateful,
    Other(String),
}

impl FailoverMode {
    /// Older control planes report failover as an on/off flag.
    pub fn from_flag(enabled: bool) -> Self {
        if enabled {
            FailoverMode::Eventual
        } else {
            FailoverMode::Disabled
        }
    }
}

impl From<&str> for FailoverMode {
    fn from(mode: &str) -> Self {
        match mode {
            "disabled" => FailoverMode::Disabled,
            "eventual" => FailoverMode::Eventual,
            "stateful" => FailoverMode::Stateful,
            other => FailoverMode::Other(other.to_string()),
        }
    }
}

impl fmt::Display for FailoverMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailoverMode::Disabled => write!(f, "disabled"),
            FailoverMode::Eventual => write!(f, "eventual"),
            FailoverMode::Stateful => write!(f, "stateful"),
            FailoverMode::Other(mode) => write!(f, "{}", mode),
        }
    }
}

/// Aggregate cluster view as seen from the queried endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterState {
    pub self_uri: NodeUri,
    pub self_uuid: String,
    pub failover_mode: FailoverMode,
    pub known_roles: BTreeSet<RoleName>,
    pub can_bootstrap_vshard: bool,
    pub vshard_bucket_count: u64,
}

impl ClusterState {
    pub fn knows_role(&self, role: &str) -> bool {
        self.known_roles.contains(role)
    }
}

/// Binds an ordered, non-empty list of roles to one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleAssignmentRequest {
    target_node: NodeDescription,
    roles: Vec<RoleName>,
}

impl RoleAssignmentRequest {
    /// Fails with `TopologyError::Config` when `roles` is empty.
    pub fn new(target_node: NodeDescription, roles: Vec<RoleName>) -> Result<Self> {
        if roles.is_empty() {
            return Err(TopologyError::config(format!(
                "role assignment for {} requires at least one role",
                target_node.uri
            )));
        }
        Ok(Self { target_node, roles })
    }

    pub fn target_node(&self) -> &NodeDescription {
        &self.target_node
    }

    pub fn roles(&self) -> &[RoleName] {
        &self.roles
    }
}

/// Outcome of the assignment mutation with the response envelope kept verbatim
#[derive(Debug, Clone, PartialEq)]
pub struct RoleAssignmentResult {
    pub success: bool,
    pub raw_response: Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_description_optional_fields() {
        let node = NodeDescription::new("a:1");
        assert_eq!(node.uri, "a:1");
        assert!(node.alias.is_none());
        assert!(node.status.is_none());
        assert!(!node.is_joined());
        assert_eq!(node.to_string(), "a:1");

        let node = node
            .with_alias("router")
            .with_status("healthy")
            .with_replicaset("rs-1");
        assert!(node.is_joined());
        assert_eq!(node.to_string(), "a:1 alias=router status=healthy replicaset=rs-1");
    }

    #[test]
    fn test_failover_mode_parsing() {
        assert_eq!(FailoverMode::from("disabled"), FailoverMode::Disabled);
        assert_eq!(FailoverMode::from("stateful"), FailoverMode::Stateful);
        assert_eq!(
            FailoverMode::from("raft"),
            FailoverMode::Other("raft".to_string())
        );
        assert_eq!(FailoverMode::from_flag(true), FailoverMode::Eventual);
        assert_eq!(FailoverMode::from_flag(false), FailoverMode::Disabled);
        assert_eq!(FailoverMode::Other("raft".to_string()).to_string(), "raft");
    }

    #[test]
    fn test_role_assignment_request_requires_roles() {
        let err = RoleAssignmentRequest::new(NodeDescription::new("a:1"), vec![]).unwrap_err();
        assert!(matches!(err, TopologyError::Config { .. }));

        let request = RoleAssignmentRequest::new(
            NodeDescription::new("a:1"),
            vec!["key-value".to_string(), "vshard-router".to_string()],
        )
        .unwrap();
        assert_eq!(request.target_node().uri, "a:1");
        assert_eq!(request.roles(), ["key-value", "vshard-router"]);
    }

    #[test]
    fn test_cluster_state_knows_role() {
        let state = ClusterState {
            self_uri: "a:1".to_string(),
            self_uuid: String::new(),
            failover_mode: FailoverMode::Disabled,
            known_roles: ["key-value".to_string()].into_iter().collect(),
            can_bootstrap_vshard: false,
            vshard_bucket_count: 30000,
        };
        assert!(state.knows_role("key-value"));
        assert!(!state.knows_role("bogus"));
    }
}
