use axum::{Json, http::StatusCode, response::IntoResponse};

use pagecraft_core::{PageId, PartId};
use pagecraft_infra::{EditError, PageStore};
use pagecraft_pages::{EditDraft, EditMutation, Page};

use crate::app::dto::MutationResponse;
use crate::app::errors;
use crate::app::services::AppServices;
use crate::authz;
use crate::context::{NetworkContext, PrincipalContext};

/// Load a page and check the caller may edit it.
pub async fn page_for_edit(
    services: &AppServices,
    network: &NetworkContext,
    principal: &PrincipalContext,
    page_id: PageId,
) -> Result<Page, axum::response::Response> {
    let page = services
        .store()
        .get_page(page_id)
        .await
        .map_err(|e| errors::edit_error_to_response(e.into()))?;
    authz::authorize_page_edit(network, principal, page.network_id())
        .map_err(errors::authz_error_to_response)?;
    Ok(page)
}

/// Resolve the page owning `part_id`, then check edit rights on it.
pub async fn page_of_part_for_edit(
    services: &AppServices,
    network: &NetworkContext,
    principal: &PrincipalContext,
    part_id: PartId,
) -> Result<Page, axum::response::Response> {
    let part = services
        .store()
        .get_part(part_id)
        .await
        .map_err(|e| errors::edit_error_to_response(e.into()))?;
    page_for_edit(services, network, principal, part.page_id()).await
}

/// Commit one mutation and answer with `status` and the reloaded page.
///
/// A mutation that landed keeps its success status even if the reload failed.
pub async fn run_mutation(
    services: &AppServices,
    draft: EditDraft,
    mutation: EditMutation,
    status: StatusCode,
) -> axum::response::Response {
    match services.session().apply(&draft, mutation).await {
        Ok(outcome) => (status, Json(MutationResponse::from(outcome))).into_response(),
        Err(EditError::ReloadFailed { result, .. }) => {
            (status, Json(MutationResponse::committed_without_page(*result))).into_response()
        }
        Err(e) => errors::edit_error_to_response(e),
    }
}
