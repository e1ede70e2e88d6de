//! Part ordering engine.
//!
//! Every operation follows the same pipeline:
//!
//! 1. read a [`PartsSnapshot`] of the page (parts + version)
//! 2. plan the writes with the pure planner in `pagecraft_pages::ordering`
//! 3. commit them in one batch with `ExpectedVersion::Exact(snapshot.version)`
//!
//! A concurrent change between 1 and 3 surfaces as [`EditError::Conflict`].
//! The engine never retries; the caller re-reads and decides.

use tracing::instrument;

use pagecraft_core::{ExpectedVersion, PageId, PartId};
use pagecraft_pages::{AcceptablePartSet, MoveDirection, Part, PartKind, PartWrite, PartsSnapshot};

use crate::error::EditError;
use crate::page_store::PageStore;

#[derive(Debug, Clone)]
pub struct PartOrderingEngine<S> {
    store: S,
}

impl<S> PartOrderingEngine<S>
where
    S: PageStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Append a part of `kind` at the end of the page.
    #[instrument(skip(self, acceptable), fields(page_id = %page_id, kind = %kind), err)]
    pub async fn insert(
        &self,
        page_id: PageId,
        kind: PartKind,
        acceptable: &AcceptablePartSet,
    ) -> Result<Part, EditError> {
        // Validate before touching the store so a rejected kind costs no read.
        acceptable.ensure_allows(kind)?;
        let snapshot = self.store.get_parts(page_id).await?;
        let (part, writes) = snapshot.plan_insert(kind, acceptable)?;
        self.commit(&snapshot, writes, "insert").await?;
        tracing::info!(part_id = %part.part_id(), position = part.position(), "part inserted");
        Ok(part)
    }

    /// Change the kind of an existing part; its position is untouched.
    #[instrument(skip(self, acceptable), fields(part_id = %part_id, kind = %kind), err)]
    pub async fn update(
        &self,
        part_id: PartId,
        kind: PartKind,
        acceptable: &AcceptablePartSet,
    ) -> Result<Part, EditError> {
        let snapshot = self.snapshot_of(part_id).await?;
        let (part, writes) = snapshot.plan_update(part_id, kind, acceptable)?;
        self.commit(&snapshot, writes, "update").await?;
        tracing::info!(page_id = %part.page_id(), "part updated");
        Ok(part)
    }

    /// Swap with the previous sibling. Returns `false` when already first.
    pub async fn move_up(&self, part_id: PartId) -> Result<bool, EditError> {
        self.shift(part_id, MoveDirection::Up).await
    }

    /// Swap with the next sibling. Returns `false` when already last.
    pub async fn move_down(&self, part_id: PartId) -> Result<bool, EditError> {
        self.shift(part_id, MoveDirection::Down).await
    }

    /// Remove a part and close the gap behind it.
    #[instrument(skip(self), fields(part_id = %part_id), err)]
    pub async fn delete(&self, part_id: PartId) -> Result<(), EditError> {
        let snapshot = self.snapshot_of(part_id).await?;
        let writes = snapshot.plan_delete(part_id)?;
        let renumbered = writes.len() - 1;
        self.commit(&snapshot, writes, "delete").await?;
        tracing::info!(page_id = %snapshot.page_id, renumbered, "part deleted");
        Ok(())
    }

    #[instrument(skip(self), fields(part_id = %part_id, direction = ?direction), err)]
    async fn shift(&self, part_id: PartId, direction: MoveDirection) -> Result<bool, EditError> {
        let snapshot = self.snapshot_of(part_id).await?;
        let writes = snapshot.plan_move(part_id, direction)?;
        if writes.is_empty() {
            tracing::debug!("part already at the boundary");
            return Ok(false);
        }
        self.commit(&snapshot, writes, "move").await?;
        tracing::info!(page_id = %snapshot.page_id, "part moved");
        Ok(true)
    }

    async fn snapshot_of(&self, part_id: PartId) -> Result<PartsSnapshot, EditError> {
        let part = self.store.get_part(part_id).await?;
        Ok(self.store.get_parts(part.page_id()).await?)
    }

    async fn commit(
        &self,
        snapshot: &PartsSnapshot,
        writes: Vec<PartWrite>,
        operation: &'static str,
    ) -> Result<u64, EditError> {
        self.store
            .commit_parts(snapshot.page_id, ExpectedVersion::Exact(snapshot.version), writes)
            .await
            .map_err(|err| {
                let err = EditError::from(err);
                if let EditError::Conflict(msg) = &err {
                    tracing::warn!(
                        page_id = %snapshot.page_id,
                        operation,
                        read_version = snapshot.version,
                        conflict = %msg,
                        "page changed concurrently"
                    );
                }
                err
            })
    }
}
