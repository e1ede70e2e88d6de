use std::sync::Arc;

use pagecraft_infra::config::{AppConfig, StoreBackend};
use pagecraft_infra::{
    EditError, EditSession, InMemoryPageStore, PageAssembler, PageStore, PostgresPageStore, VariableResolver,
    provisioning,
};

/// Type-erased store shared by every engine.
pub type SharedStore = Arc<dyn PageStore>;

/// Request-independent wiring: one store, one session over it.
#[derive(Clone)]
pub struct AppServices {
    store: SharedStore,
    session: EditSession<SharedStore>,
}

impl AppServices {
    pub fn new(store: SharedStore) -> Self {
        Self {
            session: EditSession::new(store.clone()),
            store,
        }
    }

    /// Empty in-memory store (dev/test).
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryPageStore::new()))
    }

    pub async fn from_config(config: &AppConfig) -> Result<Self, EditError> {
        let services = match &config.store {
            StoreBackend::InMemory => {
                tracing::info!("using in-memory page store");
                Self::in_memory()
            }
            StoreBackend::Postgres { database_url } => {
                let store = PostgresPageStore::connect(database_url).await?;
                store.migrate().await?;
                tracing::info!("using postgres page store");
                Self::new(Arc::new(store))
            }
        };

        if config.seed_demo_pages {
            let page = provisioning::seed_demo(&services.store).await?;
            tracing::info!(page_id = %page.page_id(), "demo pages available");
        }
        Ok(services)
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn session(&self) -> &EditSession<SharedStore> {
        &self.session
    }

    pub fn assembler(&self) -> &PageAssembler<SharedStore> {
        self.session.assembler()
    }

    pub fn variables(&self) -> &VariableResolver<SharedStore> {
        self.session.variables()
    }
}
