pub mod assigner;
pub mod locator;
pub mod orchestrator;

#[cfg(test)]
mod mock;

pub use assigner::RoleAssigner;
pub use locator::{locate_bootstrap, FallbackPolicy, Located, Selection};
pub use orchestrator::{Orchestrator, RunReport, RunState};

use kvcluster_client::ClientConfig;
use kvcluster_common::{Result, RoleName, TopologyError};
use serde::{Deserialize, Serialize};

pub const DEFAULT_ROLE: &str = "key-value";

/// Bootstrap run configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    /// Control-plane endpoint and timeouts
    pub client: ClientConfig,

    /// Roles to bind to the bootstrap node, in order
    pub roles: Vec<RoleName>,

    /// Behavior when the cluster's self uri is not among discovered servers
    pub fallback: FallbackPolicy,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            client: ClientConfig::default(),
            roles: vec![DEFAULT_ROLE.to_string()],
            fallback: FallbackPolicy::FirstNode,
        }
    }
}

impl BootstrapConfig {
    /// Reject configurations that can never lead to an assignment.
    pub fn validate(&self) -> Result<()> {
        self.client.validate()?;

        if self.roles.is_empty() {
            return Err(TopologyError::config("at least one role must be requested"));
        }
        if let Some(role) = self.roles.iter().find(|r| r.trim().is_empty()) {
            return Err(TopologyError::config(format!("invalid role name {:?}", role)));
        }

        Ok(())
    }
}
