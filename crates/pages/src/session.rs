//! Edit-session contract between an editing UI and the engine.
//!
//! The editor keeps no shared state on the server. Each user action builds an
//! [`EditDraft`], stages exactly one [`EditMutation`] on it and sends it. On
//! success the caller receives a fresh draft and the reloaded page; on failure
//! it keeps whatever it loaded last.

use serde::{Deserialize, Serialize};

use pagecraft_core::{DomainError, DomainResult, PageId, PartId};

use crate::assembled::PageAggregate;
use crate::catalog::{AcceptablePartSet, PartKind};
use crate::page::Part;
use crate::variable::{Language, LocalizedText, Variable};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum EditMutation {
    InsertPart { kind: PartKind },
    UpdatePart { part_id: PartId, kind: PartKind },
    DeletePart { part_id: PartId },
    MovePartUp { part_id: PartId },
    MovePartDown { part_id: PartId },
    SaveVariable { key: String, texts: LocalizedText },
}

impl EditMutation {
    pub fn name(&self) -> &'static str {
        match self {
            EditMutation::InsertPart { .. } => "insert_part",
            EditMutation::UpdatePart { .. } => "update_part",
            EditMutation::DeletePart { .. } => "delete_part",
            EditMutation::MovePartUp { .. } => "move_part_up",
            EditMutation::MovePartDown { .. } => "move_part_down",
            EditMutation::SaveVariable { .. } => "save_variable",
        }
    }

    pub fn part_id(&self) -> Option<PartId> {
        match self {
            EditMutation::UpdatePart { part_id, .. }
            | EditMutation::DeletePart { part_id }
            | EditMutation::MovePartUp { part_id }
            | EditMutation::MovePartDown { part_id } => Some(*part_id),
            EditMutation::InsertPart { .. } | EditMutation::SaveVariable { .. } => None,
        }
    }
}

/// Request-scoped editing context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditDraft {
    page_id: PageId,
    #[serde(default)]
    language: Language,
    #[serde(default)]
    acceptable_kinds: AcceptablePartSet,
    #[serde(default)]
    staged: Option<EditMutation>,
}

impl EditDraft {
    pub fn new(page_id: PageId) -> Self {
        Self {
            page_id,
            language: Language::default(),
            acceptable_kinds: AcceptablePartSet::default(),
            staged: None,
        }
    }

    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn acceptable_kinds(&self) -> &AcceptablePartSet {
        &self.acceptable_kinds
    }

    pub fn staged(&self) -> Option<&EditMutation> {
        self.staged.as_ref()
    }

    pub fn with_language(&self, language: Language) -> Self {
        Self {
            language,
            ..self.clone()
        }
    }

    pub fn with_acceptable_kinds(&self, acceptable_kinds: AcceptablePartSet) -> Self {
        Self {
            acceptable_kinds,
            ..self.clone()
        }
    }

    /// Stage a mutation, replacing any previously staged one.
    pub fn with_staged(&self, mutation: EditMutation) -> Self {
        Self {
            staged: Some(mutation),
            ..self.clone()
        }
    }

    /// Split into the mutation to commit and the draft to hand back afterwards.
    pub fn take_staged(&self) -> DomainResult<(EditMutation, EditDraft)> {
        let mutation = self
            .staged
            .clone()
            .ok_or_else(|| DomainError::validation("no mutation staged on the edit draft"))?;
        let cleared = Self {
            staged: None,
            ..self.clone()
        };
        Ok((mutation, cleared))
    }
}

/// What a committed mutation did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MutationResult {
    Inserted { part: Part },
    Updated { part: Part },
    Deleted { part_id: PartId },
    /// `changed` is false when the part was already at the boundary.
    Moved { part_id: PartId, changed: bool },
    VariableSaved { variable: Variable },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditOutcome {
    pub draft: EditDraft,
    pub result: MutationResult,
    pub page: PageAggregate,
}
