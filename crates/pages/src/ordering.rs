//! Part ordering planner (pure).
//!
//! Each planning function takes a point-in-time [`PartsSnapshot`] and returns
//! the batch of [`PartWrite`]s that moves the page to its next state. The
//! caller commits the batch atomically against `snapshot.version`, so two
//! editors planning from the same snapshot cannot both win.
//!
//! Positions are re-derived from snapshot order when a delete or move is
//! planned: the result is always `0..n-1`, even when the snapshot had gaps.

use serde::{Deserialize, Serialize};

use pagecraft_core::{DomainError, DomainResult, PageId, PartId};

use crate::catalog::{AcceptablePartSet, PartKind};
use crate::page::Part;

/// Ordered parts of one page at one version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartsSnapshot {
    pub page_id: PageId,
    pub version: u64,
    /// Sorted by position (ties broken by part id).
    pub parts: Vec<Part>,
}

/// One record-level write inside an atomic batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartWrite {
    Put(Part),
    Delete(PartId),
}

impl PartWrite {
    pub fn part_id(&self) -> PartId {
        match self {
            PartWrite::Put(part) => part.part_id(),
            PartWrite::Delete(id) => *id,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    Up,
    Down,
}

impl PartsSnapshot {
    pub fn new(page_id: PageId, version: u64, mut parts: Vec<Part>) -> Self {
        parts.sort_by_key(|p| (p.position(), p.part_id()));
        Self {
            page_id,
            version,
            parts,
        }
    }

    pub fn find(&self, part_id: PartId) -> Option<&Part> {
        self.parts.iter().find(|p| p.part_id() == part_id)
    }

    fn index_of(&self, part_id: PartId) -> DomainResult<usize> {
        self.parts
            .iter()
            .position(|p| p.part_id() == part_id)
            .ok_or_else(|| {
                DomainError::not_found(format!("part {part_id} not found on page {}", self.page_id))
            })
    }

    /// `true` when positions are exactly `0..n-1`.
    pub fn is_contiguous(&self) -> bool {
        self.parts
            .iter()
            .enumerate()
            .all(|(idx, p)| p.position() as usize == idx)
    }

    /// Plan appending a new part of `kind`.
    ///
    /// The new position is one past the current maximum, or 0 on an empty page.
    pub fn plan_insert(
        &self,
        kind: PartKind,
        acceptable: &AcceptablePartSet,
    ) -> DomainResult<(Part, Vec<PartWrite>)> {
        acceptable.ensure_allows(kind)?;
        let position = match self.parts.iter().map(Part::position).max() {
            Some(max) => max
                .checked_add(1)
                .ok_or_else(|| DomainError::invariant("part position overflow"))?,
            None => 0,
        };
        let part = Part::create(self.page_id, kind, position);
        Ok((part.clone(), vec![PartWrite::Put(part)]))
    }

    /// Plan changing a part's kind; its position is untouched.
    pub fn plan_update(
        &self,
        part_id: PartId,
        kind: PartKind,
        acceptable: &AcceptablePartSet,
    ) -> DomainResult<(Part, Vec<PartWrite>)> {
        let idx = self.index_of(part_id)?;
        let updated = self.parts[idx].with_kind(kind, acceptable)?;
        Ok((updated.clone(), vec![PartWrite::Put(updated)]))
    }

    /// Plan swapping a part with its neighbour.
    ///
    /// Returns an empty batch when the part is already first (up) or last
    /// (down): that is a no-op, not an error.
    pub fn plan_move(&self, part_id: PartId, direction: MoveDirection) -> DomainResult<Vec<PartWrite>> {
        let idx = self.index_of(part_id)?;
        let neighbour = match direction {
            MoveDirection::Up if idx == 0 => return Ok(Vec::new()),
            MoveDirection::Up => idx - 1,
            MoveDirection::Down if idx + 1 == self.parts.len() => return Ok(Vec::new()),
            MoveDirection::Down => idx + 1,
        };

        let mut order: Vec<&Part> = self.parts.iter().collect();
        order.swap(idx, neighbour);
        renumber(order)
    }

    /// Plan removing a part and closing the gap it leaves.
    pub fn plan_delete(&self, part_id: PartId) -> DomainResult<Vec<PartWrite>> {
        let idx = self.index_of(part_id)?;
        let remaining: Vec<&Part> = self
            .parts
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != idx)
            .map(|(_, p)| p)
            .collect();

        let mut writes = vec![PartWrite::Delete(part_id)];
        writes.extend(renumber(remaining)?);
        Ok(writes)
    }

    /// Apply a batch to this snapshot (what a store does on commit).
    pub fn apply(&self, writes: &[PartWrite]) -> PartsSnapshot {
        let mut parts = self.parts.clone();
        for write in writes {
            match write {
                PartWrite::Put(part) => match parts.iter_mut().find(|p| p.part_id() == part.part_id()) {
                    Some(existing) => *existing = part.clone(),
                    None => parts.push(part.clone()),
                },
                PartWrite::Delete(id) => parts.retain(|p| p.part_id() != *id),
            }
        }
        PartsSnapshot::new(self.page_id, self.version + 1, parts)
    }
}

/// Put every part whose position differs from its index in `order`.
fn renumber(order: Vec<&Part>) -> DomainResult<Vec<PartWrite>> {
    order
        .into_iter()
        .enumerate()
        .filter(|(idx, p)| p.position() as usize != *idx)
        .map(|(idx, p)| {
            let position = u32::try_from(idx)
                .map_err(|_| DomainError::invariant("part position overflow"))?;
            Ok(PartWrite::Put(p.at_position(position)))
        })
        .collect()
}
