//! Part mutations. Each handler authorizes against the owning page, stages one
//! mutation on a fresh `EditDraft` and answers with the reloaded page.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path, Query},
    http::StatusCode,
};

use pagecraft_core::{PageId, PartId};
use pagecraft_pages::{EditDraft, EditMutation};

use crate::app::dto::{self, LanguageQuery};
use crate::app::errors;
use crate::app::routes::common;
use crate::app::services::AppServices;
use crate::context::{NetworkContext, PrincipalContext};

pub async fn insert_part(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(network): Extension<NetworkContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Query(query): Query<LanguageQuery>,
    Json(body): Json<dto::PartKindRequest>,
) -> axum::response::Response {
    let page_id: PageId = match errors::parse_id(&id, "page") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let (language, (kind, acceptable)) = match query.language().and_then(|l| Ok((l, body.parse()?))) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    if let Err(resp) = common::page_for_edit(&services, &network, &principal, page_id).await {
        return resp;
    }

    let draft = EditDraft::new(page_id)
        .with_language(language)
        .with_acceptable_kinds(acceptable);
    common::run_mutation(&services, draft, EditMutation::InsertPart { kind }, StatusCode::CREATED).await
}

pub async fn update_part(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(network): Extension<NetworkContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Query(query): Query<LanguageQuery>,
    Json(body): Json<dto::PartKindRequest>,
) -> axum::response::Response {
    let part_id: PartId = match errors::parse_id(&id, "part") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let (language, (kind, acceptable)) = match query.language().and_then(|l| Ok((l, body.parse()?))) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let page = match common::page_of_part_for_edit(&services, &network, &principal, part_id).await {
        Ok(page) => page,
        Err(resp) => return resp,
    };

    let draft = EditDraft::new(page.page_id())
        .with_language(language)
        .with_acceptable_kinds(acceptable);
    common::run_mutation(&services, draft, EditMutation::UpdatePart { part_id, kind }, StatusCode::OK).await
}

pub async fn delete_part(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(network): Extension<NetworkContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Query(query): Query<LanguageQuery>,
) -> axum::response::Response {
    positional(services, network, principal, id, query, |part_id| EditMutation::DeletePart { part_id }).await
}

pub async fn move_up(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(network): Extension<NetworkContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Query(query): Query<LanguageQuery>,
) -> axum::response::Response {
    positional(services, network, principal, id, query, |part_id| EditMutation::MovePartUp { part_id }).await
}

pub async fn move_down(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(network): Extension<NetworkContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Query(query): Query<LanguageQuery>,
) -> axum::response::Response {
    positional(services, network, principal, id, query, |part_id| EditMutation::MovePartDown { part_id }).await
}

/// Shared body of the mutations that carry only a part id.
async fn positional(
    services: Arc<AppServices>,
    network: NetworkContext,
    principal: PrincipalContext,
    id: String,
    query: LanguageQuery,
    mutation: impl FnOnce(PartId) -> EditMutation,
) -> axum::response::Response {
    let part_id: PartId = match errors::parse_id(&id, "part") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let language = match query.language() {
        Ok(l) => l,
        Err(resp) => return resp,
    };
    let page = match common::page_of_part_for_edit(&services, &network, &principal, part_id).await {
        Ok(page) => page,
        Err(resp) => return resp,
    };

    let draft = EditDraft::new(page.page_id()).with_language(language);
    common::run_mutation(&services, draft, mutation(part_id), StatusCode::OK).await
}
