//! Admin API operation texts, request bodies and response decoding.
//!
//! Every request is a single JSON document `{"query": ..., "variables": ...}`
//! and every response is an envelope with `data` and optionally `errors`.

use kvcluster_common::{
    ClusterState, FailoverMode, NodeDescription, Result, RoleAssignmentRequest,
    RoleAssignmentResult, TopologyError,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const GET_SERVERS: &str = r#"
    query getServers {
        serverList: servers {
            uuid
            alias
            uri
            status
            message
            replicaset {
                uuid
            }
        }
    }
"#;

pub const GET_CLUSTER_STATE: &str = r#"
    query getClusterState {
        cluster {
            self {
                uri
                uuid
            }
            failover
            known_roles
            can_bootstrap_vshard
            vshard_bucket_count
        }
    }
"#;

pub const ASSIGN_ROLE: &str = r#"
    mutation assignRole($uri: String!, $roles: [String!]) {
        join_server(
            uri: $uri
            roles: $roles
        )
    }
"#;

/// Key of the mutation result inside `data`
pub const JOIN_SERVER_KEY: &str = "join_server";

#[derive(Debug, Serialize)]
pub struct OperationRequest<'a, V: Serialize> {
    pub query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<V>,
}

/// Variables of the assignment mutation: the node's full descriptor plus roles.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct AssignRoleVariables<'a> {
    pub uri: &'a str,
    pub alias: Option<&'a str>,
    pub status: Option<&'a str>,
    pub uuid: Option<&'a str>,
    pub message: Option<&'a str>,
    pub replicaset: Option<ReplicasetRef<'a>>,
    pub roles: &'a [String],
}

/// The node's replicaset as the control plane reports it: `{ "uuid": ... }`
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ReplicasetRef<'a> {
    pub uuid: &'a str,
}

impl<'a> From<&'a RoleAssignmentRequest> for AssignRoleVariables<'a> {
    fn from(request: &'a RoleAssignmentRequest) -> Self {
        let node = request.target_node();
        Self {
            uri: &node.uri,
            alias: node.alias.as_deref(),
            status: node.status.as_deref(),
            uuid: node.uuid.as_deref(),
            message: node.message.as_deref(),
            replicaset: node
                .replicaset_id
                .as_deref()
                .map(|uuid| ReplicasetRef { uuid }),
            roles: request.roles(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ServerListData {
    #[serde(rename = "serverList")]
    server_list: Vec<WireServer>,
}

#[derive(Debug, Deserialize)]
struct WireServer {
    uri: String,
    #[serde(default)]
    alias: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    uuid: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    replicaset: Option<WireReplicasetRef>,
}

#[derive(Debug, Deserialize)]
struct WireReplicasetRef {
    #[serde(default)]
    uuid: Option<String>,
}

impl From<WireServer> for NodeDescription {
    fn from(server: WireServer) -> Self {
        Self {
            uri: server.uri,
            alias: server.alias,
            status: server.status,
            uuid: server.uuid,
            message: server.message,
            replicaset_id: server.replicaset.and_then(|r| r.uuid),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ClusterData {
    #[serde(default)]
    cluster: Option<WireCluster>,
}

#[derive(Debug, Deserialize)]
struct WireCluster {
    #[serde(rename = "self", default)]
    myself: Option<WireSelf>,
    #[serde(default)]
    failover: Option<WireFailover>,
    #[serde(default)]
    known_roles: Vec<String>,
    #[serde(default)]
    can_bootstrap_vshard: bool,
    #[serde(default)]
    vshard_bucket_count: u64,
}

#[derive(Debug, Default, Deserialize)]
struct WireSelf {
    #[serde(default)]
    uri: Option<String>,
    #[serde(default)]
    uuid: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireFailover {
    Flag(bool),
    Mode(String),
}

impl From<WireCluster> for ClusterState {
    fn from(cluster: WireCluster) -> Self {
        let myself = cluster.myself.unwrap_or_default();
        let failover_mode = match cluster.failover {
            Some(WireFailover::Flag(enabled)) => FailoverMode::from_flag(enabled),
            Some(WireFailover::Mode(mode)) => FailoverMode::from(mode.as_str()),
            None => FailoverMode::Disabled,
        };

        Self {
            self_uri: myself.uri.unwrap_or_default(),
            self_uuid: myself.uuid.unwrap_or_default(),
            failover_mode,
            known_roles: cluster.known_roles.into_iter().collect(),
            can_bootstrap_vshard: cluster.can_bootstrap_vshard,
            vshard_bucket_count: cluster.vshard_bucket_count,
        }
    }
}

/// Decode `data` of an envelope, failing with `Protocol` when it is absent or null.
fn decode_data<T: DeserializeOwned>(operation: &str, envelope: &Value) -> Result<T> {
    let data = match envelope.get("data") {
        Some(data) if !data.is_null() => data,
        _ => {
            return Err(TopologyError::Protocol {
                operation: operation.to_string(),
                payload: envelope.clone(),
            })
        }
    };

    T::deserialize(data).map_err(|e| TopologyError::Decode {
        operation: operation.to_string(),
        message: e.to_string(),
    })
}

pub fn decode_servers(envelope: &Value) -> Result<Vec<NodeDescription>> {
    let data: ServerListData = decode_data("getServers", envelope)?;
    Ok(data.server_list.into_iter().map(NodeDescription::from).collect())
}

pub fn decode_cluster_state(envelope: &Value) -> Result<ClusterState> {
    let data: ClusterData = decode_data("getClusterState", envelope)?;
    let cluster = data.cluster.ok_or_else(|| TopologyError::Protocol {
        operation: "getClusterState".to_string(),
        payload: envelope.clone(),
    })?;
    Ok(cluster.into())
}

/// Successful only if `data.join_server` is present and there is no `errors` field.
pub fn classify_assignment(envelope: Value) -> RoleAssignmentResult {
    let has_result = envelope
        .get("data")
        .and_then(Value::as_object)
        .map_or(false, |data| data.contains_key(JOIN_SERVER_KEY));
    let has_errors = envelope.get("errors").is_some();

    RoleAssignmentResult {
        success: has_result && !has_errors,
        raw_response: envelope,
    }
}
