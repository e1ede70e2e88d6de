//! Test store that can lose its page headers on demand.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use pagecraft_core::{ExpectedVersion, PageId, PartId};
use pagecraft_pages::{Network, Page, Part, PartWrite, PartsSnapshot, Variable};

use super::in_memory::InMemoryPageStore;
use super::r#trait::{PageStore, StoreError};

/// In-memory store whose page header reads (`get_page`, `find_page`) fail
/// with a backend error while `pages_down` is set.
#[derive(Debug, Default)]
pub struct HeaderOutageStore {
    inner: InMemoryPageStore,
    pub pages_down: AtomicBool,
}

impl HeaderOutageStore {
    fn check_pages(&self) -> Result<(), StoreError> {
        if self.pages_down.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("db down".into()));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl PageStore for HeaderOutageStore {
    async fn create_network(&self, network: Network) -> Result<Network, StoreError> {
        self.inner.create_network(network).await
    }

    async fn find_network(&self, slug: &str) -> Result<Network, StoreError> {
        self.inner.find_network(slug).await
    }

    async fn create_page(&self, page: Page) -> Result<Page, StoreError> {
        self.inner.create_page(page).await
    }

    async fn get_page(&self, page_id: PageId) -> Result<Page, StoreError> {
        self.check_pages()?;
        self.inner.get_page(page_id).await
    }

    async fn find_page(&self, network_slug: &str, page_slug: &str) -> Result<Page, StoreError> {
        self.check_pages()?;
        self.inner.find_page(network_slug, page_slug).await
    }

    async fn get_parts(&self, page_id: PageId) -> Result<PartsSnapshot, StoreError> {
        self.inner.get_parts(page_id).await
    }

    async fn get_part(&self, part_id: PartId) -> Result<Part, StoreError> {
        self.inner.get_part(part_id).await
    }

    async fn commit_parts(
        &self,
        page_id: PageId,
        expected_version: ExpectedVersion,
        writes: Vec<PartWrite>,
    ) -> Result<u64, StoreError> {
        self.inner.commit_parts(page_id, expected_version, writes).await
    }

    async fn get_variables(&self, page_id: PageId) -> Result<BTreeMap<String, Variable>, StoreError> {
        self.inner.get_variables(page_id).await
    }

    async fn get_variable(&self, page_id: PageId, key: &str) -> Result<Option<Variable>, StoreError> {
        self.inner.get_variable(page_id, key).await
    }

    async fn put_variable(&self, variable: Variable) -> Result<(), StoreError> {
        self.inner.put_variable(variable).await
    }
}
