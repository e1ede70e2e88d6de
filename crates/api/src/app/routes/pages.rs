use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path, Query},
    response::IntoResponse,
};

use pagecraft_core::PageId;
use pagecraft_infra::PageStore;

use crate::app::dto::LanguageQuery;
use crate::app::errors;
use crate::app::services::AppServices;
use crate::authz;
use crate::context::{NetworkContext, PrincipalContext};

/// Public page rendering by network slug + page slug.
pub async fn get_network_page(
    Extension(services): Extension<Arc<AppServices>>,
    Path((network_slug, page_slug)): Path<(String, String)>,
    Query(query): Query<LanguageQuery>,
) -> axum::response::Response {
    let language = match query.language() {
        Ok(l) => l,
        Err(resp) => return resp,
    };

    match services
        .assembler()
        .get_by_slug(&network_slug, &page_slug, language)
        .await
    {
        Ok(page) => Json(page).into_response(),
        Err(e) => errors::edit_error_to_response(e),
    }
}

pub async fn get_page(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(network): Extension<NetworkContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
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

    match services.assembler().assemble(&page, language).await {
        Ok(aggregate) => Json(aggregate).into_response(),
        Err(e) => errors::edit_error_to_response(e),
    }
}
