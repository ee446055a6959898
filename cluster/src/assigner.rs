use kvcluster_client::ControlPlane;
use kvcluster_common::{
    ClusterState, NodeDescription, Result, RoleAssignmentRequest, RoleAssignmentResult, RoleName,
    TopologyError,
};
use tracing::info;

/// Validates requested roles against the cluster and issues the assignment.
pub struct RoleAssigner<'a, C: ControlPlane + ?Sized> {
    client: &'a C,
}

impl<'a, C: ControlPlane + ?Sized> RoleAssigner<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    /// Every role must be in `known_roles`. No network call is made.
    pub fn validate(roles: &[RoleName], state: &ClusterState) -> Result<()> {
        match roles.iter().find(|role| !state.knows_role(role)) {
            Some(role) => Err(TopologyError::UnknownRole {
                role: role.clone(),
                known_roles: state.known_roles.iter().cloned().collect(),
            }),
            None => Ok(()),
        }
    }

    /// Assign `roles` to `node`.
    ///
    /// A response the control plane did not accept becomes
    /// `TopologyError::Assignment` carrying the raw envelope.
    pub async fn assign(
        &self,
        node: &NodeDescription,
        roles: &[RoleName],
        state: &ClusterState,
    ) -> Result<RoleAssignmentResult> {
        Self::validate(roles, state)?;
        let request = RoleAssignmentRequest::new(node.clone(), roles.to_vec())?;

        info!("Assigning {:?} to {}", roles, node.uri);
        let result = self.client.assign_role(&request).await?;

        if result.success {
            Ok(result)
        } else {
            Err(TopologyError::Assignment {
                roles: roles.to_vec(),
                node_uri: node.uri.clone(),
                payload: result.raw_response,
            })
        }
    }
}
