//! API-side authorization guard for page reads and edits.
//!
//! Checks run after the target page is loaded, since the page decides which
//! network the request touches.

use pagecraft_auth::{AuthzError, NetworkMembership, Permission, Principal, authorize};
use pagecraft_core::NetworkId;

use crate::context::{NetworkContext, PrincipalContext};

fn principal_for(network: &NetworkContext, principal: &PrincipalContext, page_network: NetworkId) -> Principal {
    Principal {
        principal_id: principal.principal_id(),
        active_network_id: page_network,
        membership: NetworkMembership::from_roles(network.network_id(), principal.roles().to_vec()),
    }
}

/// Any authenticated member of the page's network may read it.
pub fn authorize_page_read(
    network: &NetworkContext,
    principal: &PrincipalContext,
    page_network: NetworkId,
) -> Result<(), AuthzError> {
    let principal = principal_for(network, principal, page_network);
    if principal.active_network_id != principal.membership.network_id {
        return Err(AuthzError::NetworkMismatch);
    }
    Ok(())
}

/// Editing requires `pages.edit` within the page's network.
pub fn authorize_page_edit(
    network: &NetworkContext,
    principal: &PrincipalContext,
    page_network: NetworkId,
) -> Result<(), AuthzError> {
    authorize(&principal_for(network, principal, page_network), &Permission::PAGES_EDIT)
}
