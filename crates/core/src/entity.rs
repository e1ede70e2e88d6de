//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Parts and variables are entities: a part keeps its id while its kind and
/// position change; a variable keeps its `(page, key)` identity across edits.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> Self::Id;
}
