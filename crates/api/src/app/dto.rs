use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use pagecraft_pages::{
    AcceptablePartSet, EditOutcome, Language, LocalizedText, MutationResult, PageAggregate, PartCatalog,
    PartKind, Resolution, Variable,
};

use crate::app::errors;

// -------------------------
// Request DTOs
// -------------------------

/// `?lang=` on every page-returning route. Defaults to portuguese.
#[derive(Debug, Default, Deserialize)]
pub struct LanguageQuery {
    pub lang: Option<String>,
}

impl LanguageQuery {
    pub fn language(&self) -> Result<Language, axum::response::Response> {
        match self.lang.as_deref().map(str::trim) {
            None | Some("") => Ok(Language::default()),
            Some(raw) => raw
                .parse()
                .map_err(|e: pagecraft_core::DomainError| {
                    errors::json_error(StatusCode::BAD_REQUEST, "invalid_language", e.to_string())
                }),
        }
    }
}

/// Body of `POST /pages/:id/parts` and `PUT /parts/:id`.
#[derive(Debug, Deserialize)]
pub struct PartKindRequest {
    pub kind: String,
    /// Wire strings of the kinds the page slot accepts.
    #[serde(default)]
    pub acceptable_kinds: Vec<String>,
}

impl PartKindRequest {
    pub fn parse(&self) -> Result<(PartKind, AcceptablePartSet), axum::response::Response> {
        let invalid = |e: pagecraft_core::DomainError| {
            errors::json_error(StatusCode::BAD_REQUEST, "validation_error", e.to_string())
        };
        let kind = self.kind.parse::<PartKind>().map_err(invalid)?;
        let acceptable = AcceptablePartSet::from_wires(&self.acceptable_kinds).map_err(invalid)?;
        Ok((kind, acceptable))
    }
}

/// Body of `PUT /pages/:id/variables/:key`. Omitted slots are stored empty.
#[derive(Debug, Deserialize)]
pub struct SaveVariableRequest {
    #[serde(default)]
    pub english: String,
    #[serde(default)]
    pub french: String,
    #[serde(default)]
    pub spanish: String,
    #[serde(default)]
    pub portuguese: String,
}

impl From<SaveVariableRequest> for LocalizedText {
    fn from(value: SaveVariableRequest) -> Self {
        LocalizedText::new(value.english, value.french, value.spanish, value.portuguese)
    }
}

// -------------------------
// Response DTOs
// -------------------------

/// Every mutating route answers with what happened plus the reloaded page.
///
/// `page` is null when the change committed but the reload failed; the
/// client must refetch instead of retrying.
#[derive(Debug, Serialize)]
pub struct MutationResponse {
    pub result: MutationResult,
    pub page: Option<PageAggregate>,
}

impl MutationResponse {
    pub fn committed_without_page(result: MutationResult) -> Self {
        Self { result, page: None }
    }
}

impl From<EditOutcome> for MutationResponse {
    fn from(outcome: EditOutcome) -> Self {
        Self {
            result: outcome.result,
            page: Some(outcome.page),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VariableResponse {
    #[serde(flatten)]
    pub variable: Variable,
    pub language: Language,
    pub resolved: Resolution,
}

#[derive(Debug, Serialize)]
pub struct CatalogEntry {
    pub kind: PartKind,
    pub title: &'static str,
}

pub fn catalog_entries() -> Vec<CatalogEntry> {
    PartCatalog::entries()
        .iter()
        .map(|d| CatalogEntry {
            kind: d.kind,
            title: d.title,
        })
        .collect()
}
