use kvcluster_common::{ClusterState, NodeDescription, Result, TopologyError};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// What to do when no discovered node matches the cluster's self uri
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FallbackPolicy {
    /// Take the first discovered node
    #[default]
    FirstNode,

    /// Abort with `TopologyError::SelfNotDiscovered`
    Fail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// The node's uri equals `ClusterState::self_uri`
    SelfMatch,
    /// No node matched; the first one was taken
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Located<'a> {
    pub node: &'a NodeDescription,
    pub selection: Selection,
}

/// Pick the bootstrap node: the first node whose uri is the cluster's self uri.
///
/// Pure function of its inputs. With `FallbackPolicy::FirstNode` an unmatched
/// self uri selects `nodes[0]`.
pub fn locate_bootstrap<'a>(
    nodes: &'a [NodeDescription],
    state: &ClusterState,
    policy: FallbackPolicy,
) -> Result<Located<'a>> {
    if let Some(node) = nodes.iter().find(|n| n.uri == state.self_uri) {
        return Ok(Located {
            node,
            selection: Selection::SelfMatch,
        });
    }

    let first = nodes.first().ok_or(TopologyError::EmptyDiscovery)?;

    match policy {
        FallbackPolicy::FirstNode => {
            warn!(
                "Self uri {:?} is not among {} discovered servers, falling back to {}",
                state.self_uri,
                nodes.len(),
                first.uri
            );
            Ok(Located {
                node: first,
                selection: Selection::Fallback,
            })
        }
        FallbackPolicy::Fail => Err(TopologyError::SelfNotDiscovered {
            self_uri: state.self_uri.clone(),
            discovered: nodes.iter().map(|n| n.uri.clone()).collect(),
        }),
    }
}
