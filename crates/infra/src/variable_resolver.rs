use std::collections::BTreeMap;

use tracing::instrument;

use pagecraft_core::PageId;
use pagecraft_pages::{Language, LocalizedText, Resolution, Variable};

use crate::error::EditError;
use crate::page_store::PageStore;

/// Reads and writes localized page variables.
///
/// Resolution picks the requested language first, then the first non-blank
/// slot in [`pagecraft_pages::FALLBACK_ORDER`].
#[derive(Debug, Clone)]
pub struct VariableResolver<S> {
    store: S,
}

impl<S> VariableResolver<S>
where
    S: PageStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Resolve one key. A missing variable is `found = false`, not an error.
    #[instrument(skip(self), fields(page_id = %page_id, key = %key, language = %language.as_str()), err)]
    pub async fn resolve(
        &self,
        page_id: PageId,
        key: &str,
        language: Language,
    ) -> Result<Resolution, EditError> {
        let key = Variable::normalize_key(key);
        let resolution = match self.store.get_variable(page_id, key).await? {
            Some(variable) => variable.resolve(language),
            None => Resolution::missing(),
        };
        if !resolution.found {
            tracing::debug!("variable unresolved");
        }
        Ok(resolution)
    }

    /// Resolve every variable of a page. Keys with no usable text are omitted.
    #[instrument(skip(self), fields(page_id = %page_id, language = %language.as_str()), err)]
    pub async fn resolve_all(
        &self,
        page_id: PageId,
        language: Language,
    ) -> Result<BTreeMap<String, String>, EditError> {
        let variables = self.store.get_variables(page_id).await?;
        Ok(variables
            .into_iter()
            .filter_map(|(key, variable)| {
                let resolution = variable.resolve(language);
                resolution.found.then_some((key, resolution.text))
            })
            .collect())
    }

    /// Raw record with all four slots.
    pub async fn get_variable(&self, page_id: PageId, key: &str) -> Result<Variable, EditError> {
        self.store
            .get_variable(page_id, Variable::normalize_key(key))
            .await?
            .ok_or_else(|| EditError::not_found(format!("variable '{key}' not found on page {page_id}")))
    }

    /// Insert or replace all four slots of `(page, key)`.
    #[instrument(skip(self, texts), fields(page_id = %page_id, key = %key), err)]
    pub async fn save_variable(
        &self,
        page_id: PageId,
        key: &str,
        texts: LocalizedText,
    ) -> Result<Variable, EditError> {
        let variable = Variable::new(page_id, key, texts)?;
        self.store.get_page(page_id).await?;
        self.store.put_variable(variable.clone()).await?;
        tracing::info!("variable saved");
        Ok(variable)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::page_store::InMemoryPageStore;
    use pagecraft_core::TemplateId;
    use pagecraft_pages::{Network, Page};

    async fn setup() -> (VariableResolver<Arc<InMemoryPageStore>>, PageId) {
        let store = Arc::new(InMemoryPageStore::new());
        let network = store
            .create_network(Network::new("acme", "Acme").unwrap())
            .await
            .unwrap();
        let page = store
            .create_page(Page::new(network.network_id(), TemplateId::new(), "home", "Home").unwrap())
            .await
            .unwrap();
        (VariableResolver::new(store), page.page_id())
    }

    #[tokio::test]
    async fn empty_english_falls_back_to_portuguese() {
        let (resolver, page_id) = setup().await;
        resolver
            .save_variable(page_id, "HERO_TITLE", LocalizedText::new("", "", "", "Venda mais"))
            .await
            .unwrap();

        for language in [Language::English, Language::French] {
            let r = resolver.resolve(page_id, "HERO_TITLE", language).await.unwrap();
            assert!(r.found);
            assert_eq!(r.text, "Venda mais");
        }
    }

    #[tokio::test]
    async fn missing_key_is_not_found_but_not_an_error() {
        let (resolver, page_id) = setup().await;
        let r = resolver.resolve(page_id, "NOPE", Language::Spanish).await.unwrap();
        assert!(!r.found);
        assert_eq!(r.text_or("NOPE"), "NOPE");

        assert!(matches!(
            resolver.get_variable(page_id, "NOPE").await,
            Err(EditError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn resolve_all_skips_blank_variables() {
        let (resolver, page_id) = setup().await;
        resolver
            .save_variable(page_id, "HERO_TITLE", LocalizedText::new("Sell more", "", "", "Venda mais"))
            .await
            .unwrap();
        resolver
            .save_variable(page_id, "FOOTER", LocalizedText::new(" ", "", "", ""))
            .await
            .unwrap();

        let all = resolver.resolve_all(page_id, Language::English).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all["HERO_TITLE"], "Sell more");
    }

    #[tokio::test]
    async fn saving_replaces_every_slot() {
        let (resolver, page_id) = setup().await;
        resolver
            .save_variable(page_id, "CTA", LocalizedText::new("Buy", "Acheter", "Comprar", "Comprar"))
            .await
            .unwrap();
        resolver
            .save_variable(page_id, "CTA", LocalizedText::new("Order", "", "", ""))
            .await
            .unwrap();

        let stored = resolver.get_variable(page_id, "CTA").await.unwrap();
        assert_eq!(stored.texts(), &LocalizedText::new("Order", "", "", ""));
    }

    #[tokio::test]
    async fn padded_keys_read_back_what_they_saved() {
        let (resolver, page_id) = setup().await;
        let saved = resolver
            .save_variable(page_id, " CTA ", LocalizedText::new("Buy", "", "", ""))
            .await
            .unwrap();
        assert_eq!(saved.key(), "CTA");

        assert_eq!(resolver.get_variable(page_id, " CTA ").await.unwrap(), saved);
        assert_eq!(resolver.get_variable(page_id, "CTA").await.unwrap(), saved);
        let r = resolver.resolve(page_id, " CTA ", Language::English).await.unwrap();
        assert!(r.found);
        assert_eq!(r.text, "Buy");
    }

    #[tokio::test]
    async fn blank_key_and_unknown_page_are_rejected() {
        let (resolver, page_id) = setup().await;
        assert!(matches!(
            resolver.save_variable(PageId::new(), "CTA", LocalizedText::default()).await,
            Err(EditError::NotFound(_))
        ));
        assert!(matches!(
            resolver.save_variable(page_id, "  ", LocalizedText::default()).await,
            Err(EditError::Validation(_))
        ));
    }
}
