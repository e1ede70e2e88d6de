use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use pagecraft_core::{AggregateRoot, ExpectedVersion, NetworkId, PageId, PartId};
use pagecraft_pages::{Network, Page, Part, PartWrite, PartsSnapshot, Variable};

use super::r#trait::{PageStore, StoreError};

#[derive(Debug, Default)]
struct State {
    networks: HashMap<NetworkId, Network>,
    pages: HashMap<PageId, Page>,
    parts: HashMap<PartId, Part>,
    variables: BTreeMap<(PageId, String), Variable>,
}

impl State {
    fn page(&self, page_id: PageId) -> Result<&Page, StoreError> {
        self.pages
            .get(&page_id)
            .ok_or_else(|| StoreError::NotFound(format!("page {page_id} not found")))
    }

    fn network_by_slug(&self, slug: &str) -> Result<&Network, StoreError> {
        self.networks
            .values()
            .find(|n| n.slug() == slug)
            .ok_or_else(|| StoreError::NotFound(format!("network '{slug}' not found")))
    }

    fn parts_of(&self, page_id: PageId) -> Vec<Part> {
        self.parts
            .values()
            .filter(|p| p.page_id() == page_id)
            .cloned()
            .collect()
    }
}

/// In-memory page store.
///
/// Intended for tests/dev. One lock guards all records, so every commit is
/// atomic and every read is a consistent snapshot.
#[derive(Debug, Default)]
pub struct InMemoryPageStore {
    state: RwLock<State>,
}

impl InMemoryPageStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>, StoreError> {
        self.state
            .read()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>, StoreError> {
        self.state
            .write()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))
    }
}

#[async_trait::async_trait]
impl PageStore for InMemoryPageStore {
    async fn create_network(&self, network: Network) -> Result<Network, StoreError> {
        let mut state = self.write()?;
        if state.networks.values().any(|n| n.slug() == network.slug()) {
            return Err(StoreError::Duplicate(format!(
                "network slug '{}' already exists",
                network.slug()
            )));
        }
        state.networks.insert(network.network_id(), network.clone());
        Ok(network)
    }

    async fn find_network(&self, slug: &str) -> Result<Network, StoreError> {
        self.read()?.network_by_slug(slug).cloned()
    }

    async fn create_page(&self, page: Page) -> Result<Page, StoreError> {
        let mut state = self.write()?;
        if !state.networks.contains_key(&page.network_id()) {
            return Err(StoreError::NotFound(format!(
                "network {} not found",
                page.network_id()
            )));
        }
        let taken = state
            .pages
            .values()
            .any(|p| p.network_id() == page.network_id() && p.slug() == page.slug());
        if taken || state.pages.contains_key(&page.page_id()) {
            return Err(StoreError::Duplicate(format!(
                "page slug '{}' already exists in network {}",
                page.slug(),
                page.network_id()
            )));
        }
        state.pages.insert(page.page_id(), page.clone());
        Ok(page)
    }

    async fn get_page(&self, page_id: PageId) -> Result<Page, StoreError> {
        self.read()?.page(page_id).cloned()
    }

    async fn find_page(&self, network_slug: &str, page_slug: &str) -> Result<Page, StoreError> {
        let state = self.read()?;
        let network_id = state.network_by_slug(network_slug)?.network_id();
        state
            .pages
            .values()
            .find(|p| p.network_id() == network_id && p.slug() == page_slug)
            .cloned()
            .ok_or_else(|| {
                StoreError::NotFound(format!(
                    "page '{page_slug}' not found in network '{network_slug}'"
                ))
            })
    }

    async fn get_parts(&self, page_id: PageId) -> Result<PartsSnapshot, StoreError> {
        let state = self.read()?;
        let version = state.page(page_id)?.version();
        Ok(PartsSnapshot::new(page_id, version, state.parts_of(page_id)))
    }

    async fn get_part(&self, part_id: PartId) -> Result<Part, StoreError> {
        self.read()?
            .parts
            .get(&part_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("part {part_id} not found")))
    }

    async fn commit_parts(
        &self,
        page_id: PageId,
        expected_version: ExpectedVersion,
        writes: Vec<PartWrite>,
    ) -> Result<u64, StoreError> {
        let mut state = self.write()?;
        let current = state.page(page_id)?.version();

        expected_version
            .check(current)
            .map_err(|e| StoreError::Concurrency(format!("page {page_id}: {e}")))?;

        // Stage on a copy of the page's parts; nothing is visible until the end.
        let mut staged: HashMap<PartId, Part> = state
            .parts_of(page_id)
            .into_iter()
            .map(|p| (p.part_id(), p))
            .collect();

        for write in &writes {
            match write {
                PartWrite::Put(part) => {
                    if part.page_id() != page_id {
                        return Err(StoreError::InvalidWrite(format!(
                            "part {} belongs to page {}, not {page_id}",
                            part.part_id(),
                            part.page_id()
                        )));
                    }
                    if let Some(other) = state.parts.get(&part.part_id()) {
                        if other.page_id() != page_id {
                            return Err(StoreError::InvalidWrite(format!(
                                "part {} already belongs to page {}",
                                part.part_id(),
                                other.page_id()
                            )));
                        }
                    }
                    staged.insert(part.part_id(), part.clone());
                }
                PartWrite::Delete(part_id) => {
                    if staged.remove(part_id).is_none() {
                        return Err(StoreError::NotFound(format!(
                            "part {part_id} not found on page {page_id}"
                        )));
                    }
                }
            }
        }

        let mut positions = BTreeSet::new();
        if let Some(dup) = staged.values().find(|p| !positions.insert(p.position())) {
            return Err(StoreError::InvalidWrite(format!(
                "position {} would be shared by two parts on page {page_id}",
                dup.position()
            )));
        }

        state.parts.retain(|_, p| p.page_id() != page_id);
        state.parts.extend(staged);

        let next = current + 1;
        if let Some(page) = state.pages.get_mut(&page_id) {
            *page = page.with_version(next);
        }
        Ok(next)
    }

    async fn get_variables(&self, page_id: PageId) -> Result<BTreeMap<String, Variable>, StoreError> {
        let state = self.read()?;
        Ok(state
            .variables
            .range((page_id, String::new())..)
            .take_while(|((owner, _), _)| *owner == page_id)
            .map(|((_, key), v)| (key.clone(), v.clone()))
            .collect())
    }

    async fn get_variable(&self, page_id: PageId, key: &str) -> Result<Option<Variable>, StoreError> {
        Ok(self
            .read()?
            .variables
            .get(&(page_id, key.to_string()))
            .cloned())
    }

    async fn put_variable(&self, variable: Variable) -> Result<(), StoreError> {
        let mut state = self.write()?;
        state.page(variable.page_id())?;
        state
            .variables
            .insert((variable.page_id(), variable.key().to_string()), variable);
        Ok(())
    }
}
