//! Part catalog: the closed set of part kinds and their display metadata.
//!
//! Every mapping between a [`PartKind`], its wire identifier and its display
//! title goes through the single [`CATALOG`] table. [`PartCatalog::validate`]
//! is run at startup to prove the table covers every kind exactly once.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use pagecraft_core::{DomainError, DomainResult, ValueObject};

/// Kind of a content block. The renderer maps each kind to a UI template.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PartKind {
    Hero01,
    Hero02,
    Profile01,
    Plan3Cols,
    Plan4Cols,
    ProductList3Cols,
    Team3Cols,
    Product01,
}

impl ValueObject for PartKind {}

/// Display metadata for one part kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PartDescriptor {
    pub kind: PartKind,
    pub wire: &'static str,
    pub title: &'static str,
}

/// Indexed by `PartKind as usize`; `PartCatalog::validate` checks the layout.
static CATALOG: [PartDescriptor; 8] = [
    PartDescriptor {
        kind: PartKind::Hero01,
        wire: "HERO01",
        title: "Hero banner (full background)",
    },
    PartDescriptor {
        kind: PartKind::Hero02,
        wire: "HERO02",
        title: "Hero banner (split image)",
    },
    PartDescriptor {
        kind: PartKind::Profile01,
        wire: "PROFILE01",
        title: "Profile card",
    },
    PartDescriptor {
        kind: PartKind::Plan3Cols,
        wire: "PLAN_3_COLS",
        title: "Pricing plans, 3 columns",
    },
    PartDescriptor {
        kind: PartKind::Plan4Cols,
        wire: "PLAN_4_COLS",
        title: "Pricing plans, 4 columns",
    },
    PartDescriptor {
        kind: PartKind::ProductList3Cols,
        wire: "PRODUCT_LIST_3_COLS",
        title: "Product list, 3 columns",
    },
    PartDescriptor {
        kind: PartKind::Team3Cols,
        wire: "TEAM_3_COLS",
        title: "Team roster, 3 columns",
    },
    PartDescriptor {
        kind: PartKind::Product01,
        wire: "PRODUCT01",
        title: "Product detail",
    },
];

impl PartKind {
    pub const ALL: [PartKind; 8] = [
        PartKind::Hero01,
        PartKind::Hero02,
        PartKind::Profile01,
        PartKind::Plan3Cols,
        PartKind::Plan4Cols,
        PartKind::ProductList3Cols,
        PartKind::Team3Cols,
        PartKind::Product01,
    ];

    pub fn descriptor(self) -> &'static PartDescriptor {
        &CATALOG[self as usize]
    }

    /// Canonical wire identifier (e.g. `PLAN_3_COLS`).
    pub fn wire(self) -> &'static str {
        self.descriptor().wire
    }

    pub fn title(self) -> &'static str {
        self.descriptor().title
    }
}

impl fmt::Display for PartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire())
    }
}

impl FromStr for PartKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        CATALOG
            .iter()
            .find(|d| d.wire.eq_ignore_ascii_case(wanted))
            .map(|d| d.kind)
            .ok_or_else(|| DomainError::validation(format!("unknown part kind '{wanted}'")))
    }
}

impl TryFrom<String> for PartKind {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PartKind> for String {
    fn from(value: PartKind) -> Self {
        value.wire().to_string()
    }
}

/// Read-only access to the part catalog.
pub struct PartCatalog;

impl PartCatalog {
    /// All descriptors in catalog order (the editor palette order).
    pub fn entries() -> &'static [PartDescriptor] {
        &CATALOG
    }

    /// Verify the table is complete and unambiguous.
    ///
    /// Every kind must appear exactly once, at its own index, with a non-empty
    /// wire string and title; wire strings and titles must be unique.
    pub fn validate() -> DomainResult<()> {
        if CATALOG.len() != PartKind::ALL.len() {
            return Err(DomainError::invariant(format!(
                "part catalog has {} entries for {} kinds",
                CATALOG.len(),
                PartKind::ALL.len()
            )));
        }

        let mut wires = BTreeSet::new();
        let mut titles = BTreeSet::new();
        for (idx, kind) in PartKind::ALL.iter().enumerate() {
            let entry = &CATALOG[idx];
            if entry.kind != *kind || *kind as usize != idx {
                return Err(DomainError::invariant(format!(
                    "part catalog entry {idx} is {:?}, expected {kind:?}",
                    entry.kind
                )));
            }
            if entry.wire.trim().is_empty() || entry.title.trim().is_empty() {
                return Err(DomainError::invariant(format!(
                    "part catalog entry for {kind:?} has an empty wire string or title"
                )));
            }
            if !wires.insert(entry.wire.to_ascii_uppercase()) {
                return Err(DomainError::invariant(format!(
                    "duplicate wire string '{}'",
                    entry.wire
                )));
            }
            if !titles.insert(entry.title) {
                return Err(DomainError::invariant(format!(
                    "duplicate title '{}'",
                    entry.title
                )));
            }
        }

        Ok(())
    }
}

/// Caller-declared allow-list of part kinds for one page slot.
///
/// Not persisted: the editing surface sends it with each mutation that
/// introduces a kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AcceptablePartSet(BTreeSet<PartKind>);

impl AcceptablePartSet {
    pub fn new(kinds: impl IntoIterator<Item = PartKind>) -> Self {
        Self(kinds.into_iter().collect())
    }

    pub fn all() -> Self {
        Self::new(PartKind::ALL)
    }

    /// Parse a list of wire strings; any unknown kind fails the whole list.
    pub fn from_wires<I, S>(wires: I) -> DomainResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        wires
            .into_iter()
            .map(|w| w.as_ref().parse::<PartKind>())
            .collect::<DomainResult<BTreeSet<_>>>()
            .map(Self)
    }

    pub fn contains(&self, kind: PartKind) -> bool {
        self.0.contains(&kind)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = PartKind> + '_ {
        self.0.iter().copied()
    }

    pub fn ensure_allows(&self, kind: PartKind) -> DomainResult<()> {
        if self.contains(kind) {
            return Ok(());
        }
        let allowed = self.iter().map(PartKind::wire).collect::<Vec<_>>().join(", ");
        Err(DomainError::validation(format!(
            "part kind {kind} is not acceptable for this page slot (allowed: [{allowed}])"
        )))
    }
}

impl FromIterator<PartKind> for AcceptablePartSet {
    fn from_iter<T: IntoIterator<Item = PartKind>>(iter: T) -> Self {
        Self::new(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_is_complete_and_unambiguous() {
        PartCatalog::validate().unwrap();
        assert_eq!(PartCatalog::entries().len(), PartKind::ALL.len());
    }

    #[test]
    fn every_kind_parses_back_from_its_wire_string() {
        for kind in PartKind::ALL {
            assert_eq!(kind.wire().parse::<PartKind>().unwrap(), kind);
        }
        assert_eq!("plan_3_cols".parse::<PartKind>().unwrap(), PartKind::Plan3Cols);
    }

    #[test]
    fn unknown_wire_string_is_a_validation_error() {
        match "CAROUSEL".parse::<PartKind>() {
            Err(DomainError::Validation(msg)) => assert!(msg.contains("CAROUSEL")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn serde_uses_wire_strings() {
        let json = serde_json::to_string(&PartKind::ProductList3Cols).unwrap();
        assert_eq!(json, "\"PRODUCT_LIST_3_COLS\"");
        let kind: PartKind = serde_json::from_str("\"TEAM_3_COLS\"").unwrap();
        assert_eq!(kind, PartKind::Team3Cols);
        assert!(serde_json::from_str::<PartKind>("\"NOPE\"").is_err());
    }

    #[test]
    fn acceptable_set_rejects_kinds_outside_the_slot() {
        let set = AcceptablePartSet::new([PartKind::Product01]);
        assert!(set.ensure_allows(PartKind::Product01).is_ok());
        match set.ensure_allows(PartKind::Team3Cols) {
            Err(DomainError::Validation(msg)) => {
                assert!(msg.contains("TEAM_3_COLS"));
                assert!(msg.contains("PRODUCT01"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn empty_acceptable_set_allows_nothing() {
        let set = AcceptablePartSet::default();
        assert!(PartKind::ALL.iter().all(|k| set.ensure_allows(*k).is_err()));
    }

    #[test]
    fn from_wires_fails_on_any_unknown_kind() {
        assert!(AcceptablePartSet::from_wires(["HERO01", "BOGUS"]).is_err());
        let set = AcceptablePartSet::from_wires(["HERO01", "hero02"]).unwrap();
        assert!(set.contains(PartKind::Hero02));
    }
}
