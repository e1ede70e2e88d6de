//! Request-scoped editing.
//!
//! `EditSession` is stateless: everything it needs comes in on the
//! [`EditDraft`]. A commit runs exactly one mutation and then reloads the page,
//! so the caller always renders what the store holds. On error nothing was
//! written and the caller keeps its last aggregate, except for
//! [`EditError::ReloadFailed`], which reports a write that did land.

use tracing::{Span, instrument};

use pagecraft_pages::{EditDraft, EditMutation, EditOutcome, MutationResult};

use crate::error::EditError;
use crate::ordering_engine::PartOrderingEngine;
use crate::page_assembler::PageAssembler;
use crate::page_store::PageStore;
use crate::variable_resolver::VariableResolver;

#[derive(Debug, Clone)]
pub struct EditSession<S> {
    store: S,
    ordering: PartOrderingEngine<S>,
    variables: VariableResolver<S>,
    assembler: PageAssembler<S>,
}

impl<S> EditSession<S>
where
    S: PageStore + Clone,
{
    pub fn new(store: S) -> Self {
        Self {
            ordering: PartOrderingEngine::new(store.clone()),
            variables: VariableResolver::new(store.clone()),
            assembler: PageAssembler::new(store.clone()),
            store,
        }
    }

    pub fn assembler(&self) -> &PageAssembler<S> {
        &self.assembler
    }

    pub fn variables(&self) -> &VariableResolver<S> {
        &self.variables
    }

    /// Stage `mutation` on `draft` and commit it.
    pub async fn apply(&self, draft: &EditDraft, mutation: EditMutation) -> Result<EditOutcome, EditError> {
        self.commit(&draft.with_staged(mutation)).await
    }

    /// Commit the mutation staged on `draft` and reload the page.
    #[instrument(
        skip(self, draft),
        fields(page_id = %draft.page_id(), action = tracing::field::Empty),
        err
    )]
    pub async fn commit(&self, draft: &EditDraft) -> Result<EditOutcome, EditError> {
        let (mutation, cleared) = draft.take_staged()?;
        Span::current().record("action", mutation.name());

        if let Some(part_id) = mutation.part_id() {
            let part = self.store.get_part(part_id).await?;
            if part.page_id() != draft.page_id() {
                return Err(EditError::validation(format!(
                    "part {part_id} does not belong to page {}",
                    draft.page_id()
                )));
            }
        }

        let result = match mutation {
            EditMutation::InsertPart { kind } => {
                let part = self
                    .ordering
                    .insert(draft.page_id(), kind, draft.acceptable_kinds())
                    .await?;
                MutationResult::Inserted { part }
            }
            EditMutation::UpdatePart { part_id, kind } => {
                let part = self
                    .ordering
                    .update(part_id, kind, draft.acceptable_kinds())
                    .await?;
                MutationResult::Updated { part }
            }
            EditMutation::DeletePart { part_id } => {
                self.ordering.delete(part_id).await?;
                MutationResult::Deleted { part_id }
            }
            EditMutation::MovePartUp { part_id } => MutationResult::Moved {
                part_id,
                changed: self.ordering.move_up(part_id).await?,
            },
            EditMutation::MovePartDown { part_id } => MutationResult::Moved {
                part_id,
                changed: self.ordering.move_down(part_id).await?,
            },
            EditMutation::SaveVariable { key, texts } => {
                let variable = self
                    .variables
                    .save_variable(draft.page_id(), &key, texts)
                    .await?;
                MutationResult::VariableSaved { variable }
            }
        };

        let page = match self.assembler.get_by_id(draft.page_id(), draft.language()).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(error = %e, "mutation committed but page reload failed");
                return Err(EditError::ReloadFailed {
                    result: Box::new(result),
                    reason: e.to_string(),
                });
            }
        };

        Ok(EditOutcome {
            draft: cleared,
            result,
            page,
        })
    }
}
