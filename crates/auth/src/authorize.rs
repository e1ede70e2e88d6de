use std::collections::HashSet;

use thiserror::Error;

use pagecraft_core::NetworkId;

use crate::{NetworkMembership, Permission, PrincipalId, Role};

/// A fully resolved principal for authorization decisions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub principal_id: PrincipalId,
    /// Network that owns the resource being touched.
    pub active_network_id: NetworkId,
    pub membership: NetworkMembership,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("network mismatch")]
    NetworkMismatch,

    #[error("forbidden: missing permission '{0}'")]
    Forbidden(String),
}

/// Role to permission mapping.
///
/// `admin` grants everything; `network_manager` grants page editing.
/// Unknown roles grant nothing.
pub fn permissions_for_roles(roles: &[Role]) -> Vec<Permission> {
    if roles.iter().any(|r| r.as_str() == Role::ADMIN) {
        return vec![Permission::WILDCARD];
    }
    if roles.iter().any(|r| r.as_str() == Role::NETWORK_MANAGER) {
        return vec![Permission::PAGES_EDIT];
    }
    Vec::new()
}

/// Authorize a principal for `required` on a resource of its active network.
///
/// Pure policy check: no IO, no panics.
pub fn authorize(principal: &Principal, required: &Permission) -> Result<(), AuthzError> {
    if principal.active_network_id != principal.membership.network_id {
        return Err(AuthzError::NetworkMismatch);
    }

    let perms: HashSet<&str> = principal
        .membership
        .permissions
        .iter()
        .map(|p| p.as_str())
        .collect();

    if perms.contains("*") || perms.contains(required.as_str()) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(required.as_str().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(roles: Vec<Role>, token_network: NetworkId, resource_network: NetworkId) -> Principal {
        Principal {
            principal_id: PrincipalId::new(),
            active_network_id: resource_network,
            membership: NetworkMembership::from_roles(token_network, roles),
        }
    }

    #[test]
    fn network_manager_can_edit_pages_of_its_network() {
        let network = NetworkId::new();
        let p = principal(vec![Role::network_manager()], network, network);
        assert_eq!(authorize(&p, &Permission::PAGES_EDIT), Ok(()));
        assert!(matches!(
            authorize(&p, &Permission::new("networks.admin")),
            Err(AuthzError::Forbidden(_))
        ));
    }

    #[test]
    fn admin_has_the_wildcard() {
        let network = NetworkId::new();
        let p = principal(vec![Role::admin()], network, network);
        assert_eq!(authorize(&p, &Permission::new("anything.at.all")), Ok(()));
    }

    #[test]
    fn foreign_network_is_rejected_even_for_admins() {
        let p = principal(vec![Role::admin()], NetworkId::new(), NetworkId::new());
        assert_eq!(authorize(&p, &Permission::PAGES_EDIT), Err(AuthzError::NetworkMismatch));
    }

    #[test]
    fn unknown_roles_grant_nothing() {
        assert!(permissions_for_roles(&[Role::new("viewer")]).is_empty());
    }
}
