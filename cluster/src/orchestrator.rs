use crate::assigner::RoleAssigner;
use crate::locator::{locate_bootstrap, Selection};
use crate::BootstrapConfig;
use kvcluster_client::{AdminApiClient, ControlPlane};
use kvcluster_common::{ClusterState, NodeDescription, Result, RoleAssignmentResult, TopologyError};
use std::fmt;
use tracing::{error, info, warn};

/// Phase of a bootstrap run. `Done` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Discovering,
    Located,
    Assigning,
    Done,
    Failed,
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Done | RunState::Failed)
    }

    /// Only forward transitions; any live state may fail.
    pub fn can_advance_to(&self, next: RunState) -> bool {
        use RunState::*;
        matches!(
            (self, next),
            (Idle, Discovering)
                | (Discovering, Located)
                | (Located, Assigning)
                | (Assigning, Done)
                | (Idle | Discovering | Located | Assigning, Failed)
        )
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Idle => write!(f, "Idle"),
            RunState::Discovering => write!(f, "Discovering"),
            RunState::Located => write!(f, "Located"),
            RunState::Assigning => write!(f, "Assigning"),
            RunState::Done => write!(f, "Done"),
            RunState::Failed => write!(f, "Failed"),
        }
    }
}

/// Everything one run learned, kept for outcome reporting.
#[derive(Debug)]
pub struct RunReport {
    pub state: RunState,
    pub servers: Vec<NodeDescription>,
    pub cluster_state: Option<ClusterState>,
    pub bootstrap: Option<NodeDescription>,
    pub selection: Option<Selection>,
    pub result: Option<RoleAssignmentResult>,
    pub error: Option<TopologyError>,
}

impl RunReport {
    pub fn new() -> Self {
        Self {
            state: RunState::Idle,
            servers: Vec::new(),
            cluster_state: None,
            bootstrap: None,
            selection: None,
            result: None,
            error: None,
        }
    }

    fn enter(&mut self, next: RunState) {
        if self.state.can_advance_to(next) {
            info!("Run state {} -> {}", self.state, next);
            self.state = next;
        } else {
            warn!("Ignoring run state transition {} -> {}", self.state, next);
        }
    }

    pub fn is_success(&self) -> bool {
        self.state == RunState::Done
    }

    pub fn exit_code(&self) -> i32 {
        if self.is_success() {
            0
        } else {
            1
        }
    }
}

impl Default for RunReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Sequences probe, discovery, bootstrap location and role assignment.
///
/// Calls are strictly sequential and never retried.
pub struct Orchestrator<C: ControlPlane> {
    client: C,
    config: BootstrapConfig,
}

impl Orchestrator<AdminApiClient> {
    pub fn connect(config: BootstrapConfig) -> Result<Self> {
        config.validate()?;
        let client = AdminApiClient::new(config.client.clone())?;
        Ok(Self::new(client, config))
    }
}

impl<C: ControlPlane> Orchestrator<C> {
    pub fn new(client: C, config: BootstrapConfig) -> Self {
        Self { client, config }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub async fn run(&self) -> RunReport {
        let mut report = RunReport::new();

        match self.drive(&mut report).await {
            Ok(()) => report.enter(RunState::Done),
            Err(e) => {
                error!("Bootstrap of {} failed in {}: {}", self.client.endpoint(), report.state, e);
                report.error = Some(e);
                report.enter(RunState::Failed);
            }
        }

        report
    }

    async fn drive(&self, report: &mut RunReport) -> Result<()> {
        self.config.validate()?;
        report.enter(RunState::Discovering);

        self.client.probe().await?;
        report.servers = self.client.get_servers().await?;
        let state = self.client.get_cluster_state().await?;

        let located = locate_bootstrap(&report.servers, &state, self.config.fallback)?;
        let node = located.node.clone();
        report.selection = Some(located.selection);
        report.bootstrap = Some(node.clone());
        report.cluster_state = Some(state.clone());
        report.enter(RunState::Located);

        report.enter(RunState::Assigning);
        let result = RoleAssigner::new(&self.client)
            .assign(&node, &self.config.roles, &state)
            .await?;
        report.result = Some(result);

        Ok(())
    }
}
