use sync_logging::sync_debug;

use crate::config::CompiledSelectors;
use crate::dom::LiveDocument;
use crate::extract::ExtractedFragments;
use crate::RegionKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionChange {
    /// Live contents were replaced with the fetched ones.
    Replaced,
    /// The live region's container was removed.
    Removed,
    /// The live region exists and was left as it was.
    Untouched,
    /// The response has the region but the live page never had it.
    InsertSkipped,
    /// Neither side has the region.
    Absent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchReport {
    pub content: RegionChange,
    pub pagination: RegionChange,
    pub banner: RegionChange,
}

impl PatchReport {
    pub fn change(&self, kind: RegionKind) -> RegionChange {
        match kind {
            RegionKind::Content => self.content,
            RegionKind::Pagination => self.pagination,
            RegionKind::Banner => self.banner,
        }
    }
}

/// Splices fetched regions into the live document.
///
/// Per-region policy:
/// - content: inner contents replaced when both sides have it.
/// - pagination: the wrapping container's contents are replaced when both
///   sides have it, and the live container is removed when the response
///   has none.
/// - banner: inner contents replaced when both sides have it; a response
///   without a banner leaves the live one alone.
///
/// A region that appears in the response but not on the live page is never
/// inserted.
pub struct DomPatcher {
    selectors: CompiledSelectors,
}

impl DomPatcher {
    pub fn new(selectors: CompiledSelectors) -> Self {
        Self { selectors }
    }

    pub fn apply(&self, live: &mut LiveDocument, fragments: &ExtractedFragments) -> PatchReport {
        // Order matters: pagination is looked up after content was replaced.
        let content = self.patch_content(live, fragments);
        let pagination = self.patch_pagination(live, fragments);
        let banner = self.patch_banner(live, fragments);
        let report = PatchReport {
            content,
            pagination,
            banner,
        };
        sync_debug!("patched document: {:?}", report);
        report
    }

    fn patch_content(&self, live: &mut LiveDocument, fragments: &ExtractedFragments) -> RegionChange {
        let live_region = live.select_first(&self.selectors.content);
        match (live_region, fragments.region(RegionKind::Content)) {
            (Some(target), Some(source)) => {
                live.replace_children(target, source);
                RegionChange::Replaced
            }
            (Some(_), None) => RegionChange::Untouched,
            (None, Some(_)) => RegionChange::InsertSkipped,
            (None, None) => RegionChange::Absent,
        }
    }

    fn patch_pagination(
        &self,
        live: &mut LiveDocument,
        fragments: &ExtractedFragments,
    ) -> RegionChange {
        let live_container = live
            .select_first(&self.selectors.pagination)
            .map(|region| live.parent_element(region));
        let fetched = fragments.region(RegionKind::Pagination);

        match (live_container, fetched) {
            (Some(Some(target)), Some(_)) => match fragments.region_parent(RegionKind::Pagination) {
                Some(source) => {
                    live.replace_children(target, source);
                    RegionChange::Replaced
                }
                None => RegionChange::Untouched,
            },
            (Some(Some(target)), None) => {
                live.remove(target);
                RegionChange::Removed
            }
            // A pagination element without a parent element is the document root.
            (Some(None), _) => RegionChange::Untouched,
            (None, Some(_)) => RegionChange::InsertSkipped,
            (None, None) => RegionChange::Absent,
        }
    }

    fn patch_banner(&self, live: &mut LiveDocument, fragments: &ExtractedFragments) -> RegionChange {
        let live_region = live.select_first(&self.selectors.banner);
        match (live_region, fragments.region(RegionKind::Banner)) {
            (Some(target), Some(source)) => {
                live.replace_children(target, source);
                RegionChange::Replaced
            }
            (Some(_), None) => RegionChange::Untouched,
            (None, Some(_)) => RegionChange::InsertSkipped,
            (None, None) => RegionChange::Absent,
        }
    }
}
