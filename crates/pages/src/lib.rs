//! Page composition domain module.
//!
//! This crate contains the rules for composing storefront pages from typed parts
//! and localized variables, implemented purely as deterministic domain logic
//! (no IO, no HTTP, no storage).

pub mod assembled;
pub mod catalog;
pub mod ordering;
pub mod page;
pub mod session;
pub mod variable;

pub use assembled::{AssembledPart, PageAggregate};
pub use catalog::{AcceptablePartSet, PartCatalog, PartDescriptor, PartKind};
pub use ordering::{MoveDirection, PartWrite, PartsSnapshot};
pub use page::{Network, Page, Part};
pub use session::{EditDraft, EditMutation, EditOutcome, MutationResult};
pub use variable::{FALLBACK_ORDER, Language, LocalizedText, Resolution, Variable};
