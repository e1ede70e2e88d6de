use serde::{Deserialize, Serialize};

use pagecraft_core::{
    AggregateRoot, DomainError, DomainResult, Entity, NetworkId, PageId, PartId, TemplateId,
};

use crate::catalog::{AcceptablePartSet, PartKind};

const MAX_SLUG_LEN: usize = 96;
const MAX_TITLE_LEN: usize = 200;

/// Tenant scope that owns pages; page slugs are unique within a network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    network_id: NetworkId,
    slug: String,
    name: String,
}

impl Network {
    pub fn new(slug: impl Into<String>, name: impl Into<String>) -> DomainResult<Self> {
        Self::from_record(NetworkId::new(), slug, name)
    }

    pub fn from_record(
        network_id: NetworkId,
        slug: impl Into<String>,
        name: impl Into<String>,
    ) -> DomainResult<Self> {
        let slug = validate_slug("network slug", slug.into())?;
        let name = validate_title("network name", name.into())?;
        Ok(Self {
            network_id,
            slug,
            name,
        })
    }

    pub fn network_id(&self) -> NetworkId {
        self.network_id
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Page header. Parts and variables are loaded separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    page_id: PageId,
    network_id: NetworkId,
    template_id: TemplateId,
    slug: String,
    title: String,
    version: u64,
}

impl Page {
    /// Provision a new, empty page (version 0).
    pub fn new(
        network_id: NetworkId,
        template_id: TemplateId,
        slug: impl Into<String>,
        title: impl Into<String>,
    ) -> DomainResult<Self> {
        Self::from_record(PageId::new(), network_id, template_id, slug, title, 0)
    }

    /// Rehydrate a page from storage.
    pub fn from_record(
        page_id: PageId,
        network_id: NetworkId,
        template_id: TemplateId,
        slug: impl Into<String>,
        title: impl Into<String>,
        version: u64,
    ) -> DomainResult<Self> {
        Ok(Self {
            page_id,
            network_id,
            template_id,
            slug: validate_slug("page slug", slug.into())?,
            title: validate_title("page title", title.into())?,
            version,
        })
    }

    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    pub fn network_id(&self) -> NetworkId {
        self.network_id
    }

    pub fn template_id(&self) -> TemplateId {
        self.template_id
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Stores stamp the page with the version of its part list.
    pub fn with_version(&self, version: u64) -> Self {
        Self {
            version,
            ..self.clone()
        }
    }
}

impl AggregateRoot for Page {
    type Id = PageId;

    fn id(&self) -> &PageId {
        &self.page_id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// A typed, positioned content block owned by exactly one page.
///
/// `position` has no public setter: only the ordering planner in this crate
/// renumbers parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    part_id: PartId,
    page_id: PageId,
    kind: PartKind,
    position: u32,
}

impl Part {
    /// Rehydrate a part from storage.
    pub fn from_record(part_id: PartId, page_id: PageId, kind: PartKind, position: u32) -> Self {
        Self {
            part_id,
            page_id,
            kind,
            position,
        }
    }

    pub(crate) fn create(page_id: PageId, kind: PartKind, position: u32) -> Self {
        Self::from_record(PartId::new(), page_id, kind, position)
    }

    pub fn part_id(&self) -> PartId {
        self.part_id
    }

    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    pub fn kind(&self) -> PartKind {
        self.kind
    }

    pub fn position(&self) -> u32 {
        self.position
    }

    /// Same part with a different kind, validated against the slot's allow-list.
    pub fn with_kind(&self, kind: PartKind, acceptable: &AcceptablePartSet) -> DomainResult<Self> {
        acceptable.ensure_allows(kind)?;
        Ok(Self {
            kind,
            ..self.clone()
        })
    }

    pub(crate) fn at_position(&self, position: u32) -> Self {
        Self {
            position,
            ..self.clone()
        }
    }
}

impl Entity for Part {
    type Id = PartId;

    fn id(&self) -> PartId {
        self.part_id
    }
}

fn validate_slug(what: &str, slug: String) -> DomainResult<String> {
    let slug = slug.trim().to_string();
    if slug.is_empty() {
        return Err(DomainError::validation(format!("{what} must not be empty")));
    }
    if slug.len() > MAX_SLUG_LEN {
        return Err(DomainError::validation(format!(
            "{what} must be at most {MAX_SLUG_LEN} characters"
        )));
    }
    let valid = slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');
    if !valid || slug.starts_with('-') || slug.ends_with('-') {
        return Err(DomainError::validation(format!(
            "{what} '{slug}' may only contain lowercase letters, digits, '-' and '_'"
        )));
    }
    Ok(slug)
}

fn validate_title(what: &str, title: String) -> DomainResult<String> {
    let title = title.trim().to_string();
    if title.is_empty() {
        return Err(DomainError::validation(format!("{what} must not be empty")));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(DomainError::validation(format!(
            "{what} must be at most {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(title)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_page_starts_at_version_zero() {
        let page = Page::new(NetworkId::new(), TemplateId::new(), "home", "Home").unwrap();
        assert_eq!(page.version(), 0);
        assert_eq!(page.with_version(3).version(), 3);
    }

    #[test]
    fn slugs_are_restricted_to_url_safe_lowercase() {
        assert!(Page::new(NetworkId::new(), TemplateId::new(), "Home Page", "Home").is_err());
        assert!(Page::new(NetworkId::new(), TemplateId::new(), "-home", "Home").is_err());
        assert!(Page::new(NetworkId::new(), TemplateId::new(), "  ", "Home").is_err());
        let page = Page::new(NetworkId::new(), TemplateId::new(), " plans-2024 ", "Plans").unwrap();
        assert_eq!(page.slug(), "plans-2024");
    }

    #[test]
    fn network_requires_a_name() {
        match Network::new("acme", "   ") {
            Err(DomainError::Validation(msg)) => assert!(msg.contains("network name")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn with_kind_keeps_identity_and_position() {
        let part = Part::from_record(PartId::new(), PageId::new(), PartKind::Hero01, 2);
        let changed = part
            .with_kind(PartKind::Hero02, &AcceptablePartSet::all())
            .unwrap();
        assert_eq!(changed.part_id(), part.part_id());
        assert_eq!(changed.position(), 2);
        assert_eq!(changed.kind(), PartKind::Hero02);
    }

    #[test]
    fn with_kind_rejects_kinds_outside_the_slot() {
        let part = Part::from_record(PartId::new(), PageId::new(), PartKind::Hero01, 0);
        let slot = AcceptablePartSet::new([PartKind::Hero01]);
        assert!(matches!(
            part.with_kind(PartKind::Team3Cols, &slot),
            Err(DomainError::Validation(_))
        ));
    }
}
