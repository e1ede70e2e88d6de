//! Renderable page aggregate handed to the presentation layer.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use pagecraft_core::{AggregateRoot, NetworkId, PageId, PartId, TemplateId};

use crate::catalog::PartKind;
use crate::ordering::PartsSnapshot;
use crate::page::Page;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssembledPart {
    pub part_id: PartId,
    pub kind: PartKind,
    /// Catalog title of `kind`, for editor chrome.
    pub title: String,
    pub position: u32,
}

/// Everything a renderer needs for one page: ordered parts plus resolved text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageAggregate {
    pub page_id: PageId,
    pub network_id: NetworkId,
    pub template_id: TemplateId,
    pub slug: String,
    pub title: String,
    pub version: u64,
    pub parts: Vec<AssembledPart>,
    pub variables: BTreeMap<String, String>,
}

impl PageAggregate {
    /// Combine a page header, a parts snapshot and resolved variables.
    ///
    /// The snapshot version wins over the header's, since both are read
    /// separately and parts are what the version stamps.
    pub fn assemble(page: &Page, parts: &PartsSnapshot, variables: BTreeMap<String, String>) -> Self {
        Self {
            page_id: page.page_id(),
            network_id: page.network_id(),
            template_id: page.template_id(),
            slug: page.slug().to_string(),
            title: page.title().to_string(),
            version: parts.version.max(page.version()),
            parts: parts
                .parts
                .iter()
                .map(|p| AssembledPart {
                    part_id: p.part_id(),
                    kind: p.kind(),
                    title: p.kind().title().to_string(),
                    position: p.position(),
                })
                .collect(),
            variables,
        }
    }

    /// Resolved text for `key`, or the key itself as the default label.
    pub fn text<'a>(&'a self, key: &'a str) -> &'a str {
        self.variables.get(key).map(String::as_str).unwrap_or(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::Part;

    #[test]
    fn assemble_keeps_part_order_and_titles() {
        let page = Page::new(NetworkId::new(), TemplateId::new(), "home", "Home").unwrap();
        let parts = PartsSnapshot::new(
            page.page_id(),
            5,
            vec![
                Part::from_record(PartId::new(), page.page_id(), PartKind::Team3Cols, 1),
                Part::from_record(PartId::new(), page.page_id(), PartKind::Hero01, 0),
            ],
        );
        let mut vars = BTreeMap::new();
        vars.insert("HERO_TITLE".to_string(), "Venda mais".to_string());

        let agg = PageAggregate::assemble(&page, &parts, vars);
        assert_eq!(agg.version, 5);
        assert_eq!(agg.parts[0].kind, PartKind::Hero01);
        assert_eq!(agg.parts[1].title, PartKind::Team3Cols.title());
        assert_eq!(agg.text("HERO_TITLE"), "Venda mais");
        assert_eq!(agg.text("UNSET_KEY"), "UNSET_KEY");
    }
}
