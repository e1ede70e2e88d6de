use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
};

use pagecraft_core::PageId;
use pagecraft_infra::PageStore;
use pagecraft_pages::{EditDraft, EditMutation};

use crate::app::dto::{self, LanguageQuery, VariableResponse};
use crate::app::errors;
use crate::app::routes::common;
use crate::app::services::AppServices;
use crate::authz;
use crate::context::{NetworkContext, PrincipalContext};

/// Raw variable (all four slots) plus its resolution in `?lang=`.
pub async fn get_variable(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(network): Extension<NetworkContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path((id, key)): Path<(String, String)>,
    Query(query): Query<LanguageQuery>,
) -> axum::response::Response {
    let page_id: PageId = match errors::parse_id(&id, "page") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let language = match query.language() {
        Ok(l) => l,
        Err(resp) => return resp,
    };

    let page = match services.store().get_page(page_id).await {
        Ok(page) => page,
        Err(e) => return errors::edit_error_to_response(e.into()),
    };
    if let Err(e) = authz::authorize_page_read(&network, &principal, page.network_id()) {
        return errors::authz_error_to_response(e);
    }

    let variable = match services.variables().get_variable(page_id, &key).await {
        Ok(v) => v,
        Err(e) => return errors::edit_error_to_response(e),
    };
    let resolved = variable.resolve(language);
    (
        StatusCode::OK,
        Json(VariableResponse {
            variable,
            language,
            resolved,
        }),
    )
        .into_response()
}

/// Insert or replace all four slots of a variable.
pub async fn save_variable(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(network): Extension<NetworkContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path((id, key)): Path<(String, String)>,
    Query(query): Query<LanguageQuery>,
    Json(body): Json<dto::SaveVariableRequest>,
) -> axum::response::Response {
    let page_id: PageId = match errors::parse_id(&id, "page") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let language = match query.language() {
        Ok(l) => l,
        Err(resp) => return resp,
    };
    if let Err(resp) = common::page_for_edit(&services, &network, &principal, page_id).await {
        return resp;
    }

    let draft = EditDraft::new(page_id).with_language(language);
    let mutation = EditMutation::SaveVariable {
        key,
        texts: body.into(),
    };
    common::run_mutation(&services, draft, mutation, StatusCode::OK).await
}
