use tracing::instrument;

use pagecraft_core::PageId;
use pagecraft_pages::{Language, Page, PageAggregate};

use crate::error::EditError;
use crate::page_store::PageStore;
use crate::variable_resolver::VariableResolver;

/// Builds the read model of a page: header, ordered parts and resolved texts.
#[derive(Debug, Clone)]
pub struct PageAssembler<S> {
    store: S,
    variables: VariableResolver<S>,
}

impl<S> PageAssembler<S>
where
    S: PageStore + Clone,
{
    pub fn new(store: S) -> Self {
        Self {
            variables: VariableResolver::new(store.clone()),
            store,
        }
    }

    /// Public lookup by network slug + page slug.
    #[instrument(skip(self), fields(language = %language.as_str()), err)]
    pub async fn get_by_slug(
        &self,
        network_slug: &str,
        page_slug: &str,
        language: Language,
    ) -> Result<PageAggregate, EditError> {
        let page = self.store.find_page(network_slug, page_slug).await?;
        self.assemble(&page, language).await
    }

    #[instrument(skip(self), fields(page_id = %page_id, language = %language.as_str()), err)]
    pub async fn get_by_id(&self, page_id: PageId, language: Language) -> Result<PageAggregate, EditError> {
        let page = self.store.get_page(page_id).await?;
        self.assemble(&page, language).await
    }

    /// Assemble a header the caller already loaded (and authorized).
    pub async fn assemble(&self, page: &Page, language: Language) -> Result<PageAggregate, EditError> {
        let parts = self.store.get_parts(page.page_id()).await?;
        let variables = self.variables.resolve_all(page.page_id(), language).await?;
        Ok(PageAggregate::assemble(page, &parts, variables))
    }
}
