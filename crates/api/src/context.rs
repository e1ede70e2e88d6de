use pagecraft_auth::{PrincipalId, Role};
use pagecraft_core::NetworkId;

/// Network the bearer token is scoped to.
///
/// Immutable; present on every authenticated route.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct NetworkContext {
    network_id: NetworkId,
}

impl NetworkContext {
    pub fn new(network_id: NetworkId) -> Self {
        Self { network_id }
    }

    pub fn network_id(&self) -> NetworkId {
        self.network_id
    }
}

/// Principal context for a request (authenticated identity + roles).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    principal_id: PrincipalId,
    roles: Vec<Role>,
}

impl PrincipalContext {
    pub fn new(principal_id: PrincipalId, roles: Vec<Role>) -> Self {
        Self { principal_id, roles }
    }

    pub fn principal_id(&self) -> PrincipalId {
        self.principal_id
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }
}
