//! Provisioning helpers for networks and pages.
//!
//! Page creation is not part of the editing surface; these are used by the
//! binary at startup (`SEED_DEMO_PAGES`) and by tests.

use pagecraft_core::TemplateId;
use pagecraft_pages::{AcceptablePartSet, LocalizedText, Network, Page, PartKind};

use crate::error::EditError;
use crate::ordering_engine::PartOrderingEngine;
use crate::page_store::{PageStore, StoreError};
use crate::variable_resolver::VariableResolver;

pub const DEMO_NETWORK_SLUG: &str = "demo";
pub const DEMO_PAGE_SLUG: &str = "home";

/// Return the network with `slug`, creating it when missing.
pub async fn ensure_network<S>(store: &S, slug: &str, name: &str) -> Result<Network, EditError>
where
    S: PageStore,
{
    match store.find_network(slug).await {
        Ok(network) => Ok(network),
        Err(StoreError::NotFound(_)) => Ok(store.create_network(Network::new(slug, name)?).await?),
        Err(other) => Err(other.into()),
    }
}

/// Seed a demo network with one populated page. Idempotent.
pub async fn seed_demo<S>(store: &S) -> Result<Page, EditError>
where
    S: PageStore + Clone,
{
    let network = ensure_network(store, DEMO_NETWORK_SLUG, "Demo Network").await?;
    match store.find_page(DEMO_NETWORK_SLUG, DEMO_PAGE_SLUG).await {
        Ok(page) => return Ok(page),
        Err(StoreError::NotFound(_)) => {}
        Err(other) => return Err(other.into()),
    }

    let page = store
        .create_page(Page::new(network.network_id(), TemplateId::new(), DEMO_PAGE_SLUG, "Home")?)
        .await?;

    let engine = PartOrderingEngine::new(store.clone());
    let all = AcceptablePartSet::all();
    for kind in [PartKind::Hero01, PartKind::Plan4Cols, PartKind::Product01] {
        engine.insert(page.page_id(), kind, &all).await?;
    }

    let variables = VariableResolver::new(store.clone());
    variables
        .save_variable(
            page.page_id(),
            "HERO_TITLE",
            LocalizedText::new("Sell more", "Vendez plus", "Vende más", "Venda mais"),
        )
        .await?;
    variables
        .save_variable(page.page_id(), "HERO_SUBTITLE", LocalizedText::new("", "", "", "Comece hoje"))
        .await?;

    tracing::info!(page_id = %page.page_id(), network = DEMO_NETWORK_SLUG, "demo page seeded");
    Ok(store.get_page(page.page_id()).await?)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::page_store::InMemoryPageStore;
    use crate::page_store::outage::HeaderOutageStore;

    #[tokio::test]
    async fn backend_failure_on_lookup_aborts_seeding() {
        let store = Arc::new(HeaderOutageStore::default());
        store.pages_down.store(true, Ordering::SeqCst);

        let err = seed_demo(&store).await.unwrap_err();
        assert!(matches!(err, EditError::Store(StoreError::Backend(_))));

        store.pages_down.store(false, Ordering::SeqCst);
        assert!(matches!(
            store.find_page(DEMO_NETWORK_SLUG, DEMO_PAGE_SLUG).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn seeding_twice_keeps_one_page() {
        let store = Arc::new(InMemoryPageStore::new());
        let first = seed_demo(&store).await.unwrap();
        let second = seed_demo(&store).await.unwrap();
        assert_eq!(first.page_id(), second.page_id());

        let parts = store.get_parts(first.page_id()).await.unwrap();
        assert_eq!(parts.parts.len(), 3);
        assert!(parts.is_contiguous());
    }
}
