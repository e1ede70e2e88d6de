use axum::{
    Router,
    routing::{get, post},
};

pub mod catalog;
pub mod common;
pub mod pages;
pub mod parts;
pub mod system;
pub mod variables;

/// Routes anyone may call.
pub fn public_router() -> Router {
    Router::new()
        .route("/networks/:network/pages/:slug", get(pages::get_network_page))
        .route("/catalog/parts", get(catalog::list_parts))
}

/// Routes that require a bearer token (network-scoped).
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .route("/pages/:id", get(pages::get_page))
        .route("/pages/:id/parts", post(parts::insert_part))
        .route(
            "/pages/:id/variables/:key",
            get(variables::get_variable).put(variables::save_variable),
        )
        .route("/parts/:id", axum::routing::put(parts::update_part).delete(parts::delete_part))
        .route("/parts/:id/move-up", post(parts::move_up))
        .route("/parts/:id/move-down", post(parts::move_down))
}
