use ego_tree::{NodeId, NodeRef};
use scraper::{Html, Node, Selector};

use crate::config::CompiledSelectors;
use crate::RegionKind;

/// A fetched payload parsed into a detached document, with the regions the
/// patcher cares about located inside it.
///
/// A missing region is a meaningful answer from the server, not an error.
pub struct ExtractedFragments {
    document: Html,
    content: Option<NodeId>,
    pagination: Option<NodeId>,
    banner: Option<NodeId>,
}

impl ExtractedFragments {
    pub fn region(&self, kind: RegionKind) -> Option<NodeRef<'_, Node>> {
        let id = match kind {
            RegionKind::Content => self.content,
            RegionKind::Pagination => self.pagination,
            RegionKind::Banner => self.banner,
        }?;
        self.document.tree.get(id)
    }

    pub fn has(&self, kind: RegionKind) -> bool {
        self.region(kind).is_some()
    }

    /// The element wrapping `kind`, mirroring `parentElement`.
    pub fn region_parent(&self, kind: RegionKind) -> Option<NodeRef<'_, Node>> {
        self.region(kind)?
            .parent()
            .filter(|parent| parent.value().is_element())
    }
}

pub trait FragmentExtractor {
    fn extract(&self, body: &str) -> ExtractedFragments;
}

/// Locates the first content, pagination and banner match in document order.
pub struct SelectorExtractor {
    selectors: CompiledSelectors,
}

impl SelectorExtractor {
    pub fn new(selectors: CompiledSelectors) -> Self {
        Self { selectors }
    }
}

impl FragmentExtractor for SelectorExtractor {
    fn extract(&self, body: &str) -> ExtractedFragments {
        let document = Html::parse_document(body);
        let first = |selector: &Selector| {
            document
                .select(selector)
                .next()
                .map(|element| element.id())
        };

        let content = first(&self.selectors.content);
        let pagination = first(&self.selectors.pagination);
        let banner = first(&self.selectors.banner);

        ExtractedFragments {
            document,
            content,
            pagination,
            banner,
        }
    }
}
