use axum::Json;

use crate::app::dto::{self, CatalogEntry};

/// Every part kind with its wire string and display title.
pub async fn list_parts() -> Json<Vec<CatalogEntry>> {
    Json(dto::catalog_entries())
}
