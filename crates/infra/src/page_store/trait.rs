use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;

use pagecraft_core::{ExpectedVersion, PageId, PartId};
use pagecraft_pages::{Network, Page, Part, PartWrite, PartsSnapshot, Variable};

/// Page store operation error.
///
/// These are **infrastructure errors** (missing rows, stale versions,
/// constraint violations, backend failures) as opposed to domain errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("optimistic concurrency check failed: {0}")]
    Concurrency(String),

    #[error("duplicate: {0}")]
    Duplicate(String),

    /// A write batch would break page ownership or position uniqueness.
    #[error("invalid write: {0}")]
    InvalidWrite(String),

    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// Persistence of networks, pages, parts and variables.
///
/// ## Consistency
///
/// - Reads return point-in-time snapshots.
/// - `commit_parts` applies its whole batch or nothing, and only when the page
///   is still at the expected version. Every successful commit bumps the page
///   version by one.
/// - Variable upserts are atomic per record and do not touch the page version.
///
/// ## Implementation Requirements
///
/// Implementations must:
/// - reject part writes that target another page than the one committed
/// - reject batches that leave two parts of a page on the same position
/// - report a stale `ExpectedVersion::Exact` as `StoreError::Concurrency`
#[async_trait::async_trait]
pub trait PageStore: Send + Sync {
    /// Provisioning hook: register a network. Slugs are globally unique.
    async fn create_network(&self, network: Network) -> Result<Network, StoreError>;

    async fn find_network(&self, slug: &str) -> Result<Network, StoreError>;

    /// Provisioning hook: register an empty page. `(network, slug)` is unique.
    async fn create_page(&self, page: Page) -> Result<Page, StoreError>;

    async fn get_page(&self, page_id: PageId) -> Result<Page, StoreError>;

    /// Resolve a page by network slug + page slug.
    async fn find_page(&self, network_slug: &str, page_slug: &str) -> Result<Page, StoreError>;

    /// Parts of a page ordered by position, stamped with the page version.
    async fn get_parts(&self, page_id: PageId) -> Result<PartsSnapshot, StoreError>;

    async fn get_part(&self, part_id: PartId) -> Result<Part, StoreError>;

    /// Atomically apply a batch of part writes to one page; returns the new version.
    async fn commit_parts(
        &self,
        page_id: PageId,
        expected_version: ExpectedVersion,
        writes: Vec<PartWrite>,
    ) -> Result<u64, StoreError>;

    /// Raw single-record upsert. Does not renumber siblings.
    async fn put_part(&self, part: Part) -> Result<u64, StoreError> {
        self.commit_parts(part.page_id(), ExpectedVersion::Any, vec![PartWrite::Put(part)])
            .await
    }

    /// Raw single-record delete. Does not renumber siblings.
    async fn delete_part(&self, part_id: PartId) -> Result<u64, StoreError> {
        let part = self.get_part(part_id).await?;
        self.commit_parts(part.page_id(), ExpectedVersion::Any, vec![PartWrite::Delete(part_id)])
            .await
    }

    async fn get_variables(&self, page_id: PageId) -> Result<BTreeMap<String, Variable>, StoreError>;

    async fn get_variable(&self, page_id: PageId, key: &str) -> Result<Option<Variable>, StoreError>;

    /// Insert or replace the variable at `(page, key)`.
    async fn put_variable(&self, variable: Variable) -> Result<(), StoreError>;
}

#[async_trait::async_trait]
impl<S> PageStore for Arc<S>
where
    S: PageStore + ?Sized,
{
    async fn create_network(&self, network: Network) -> Result<Network, StoreError> {
        (**self).create_network(network).await
    }

    async fn find_network(&self, slug: &str) -> Result<Network, StoreError> {
        (**self).find_network(slug).await
    }

    async fn create_page(&self, page: Page) -> Result<Page, StoreError> {
        (**self).create_page(page).await
    }

    async fn get_page(&self, page_id: PageId) -> Result<Page, StoreError> {
        (**self).get_page(page_id).await
    }

    async fn find_page(&self, network_slug: &str, page_slug: &str) -> Result<Page, StoreError> {
        (**self).find_page(network_slug, page_slug).await
    }

    async fn get_parts(&self, page_id: PageId) -> Result<PartsSnapshot, StoreError> {
        (**self).get_parts(page_id).await
    }

    async fn get_part(&self, part_id: PartId) -> Result<Part, StoreError> {
        (**self).get_part(part_id).await
    }

    async fn commit_parts(
        &self,
        page_id: PageId,
        expected_version: ExpectedVersion,
        writes: Vec<PartWrite>,
    ) -> Result<u64, StoreError> {
        (**self).commit_parts(page_id, expected_version, writes).await
    }

    async fn put_part(&self, part: Part) -> Result<u64, StoreError> {
        (**self).put_part(part).await
    }

    async fn delete_part(&self, part_id: PartId) -> Result<u64, StoreError> {
        (**self).delete_part(part_id).await
    }

    async fn get_variables(&self, page_id: PageId) -> Result<BTreeMap<String, Variable>, StoreError> {
        (**self).get_variables(page_id).await
    }

    async fn get_variable(&self, page_id: PageId, key: &str) -> Result<Option<Variable>, StoreError> {
        (**self).get_variable(page_id, key).await
    }

    async fn put_variable(&self, variable: Variable) -> Result<(), StoreError> {
        (**self).put_variable(variable).await
    }
}
