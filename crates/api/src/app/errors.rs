use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use pagecraft_auth::AuthzError;
use pagecraft_infra::EditError;

pub fn edit_error_to_response(err: EditError) -> axum::response::Response {
    match err {
        EditError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        EditError::NotFound(msg) => json_error(StatusCode::NOT_FOUND, "not_found", msg),
        EditError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        EditError::Store(e) => {
            tracing::error!(error = %e, "page store failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", e.to_string())
        }
        err @ EditError::ReloadFailed { .. } => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "reload_failed", err.to_string())
        }
    }
}

pub fn authz_error_to_response(err: AuthzError) -> axum::response::Response {
    json_error(StatusCode::FORBIDDEN, "forbidden", err.to_string())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// Parse a path id, answering 400 `invalid_id` on garbage.
pub fn parse_id<T>(raw: &str, what: &str) -> Result<T, axum::response::Response>
where
    T: std::str::FromStr,
{
    raw.parse::<T>()
        .map_err(|_| json_error(StatusCode::BAD_REQUEST, "invalid_id", format!("invalid {what} id")))
}
