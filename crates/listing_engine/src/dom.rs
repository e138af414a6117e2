//! The live page: a parsed HTML tree plus the chrome state that lives outside
//! any replaceable region.

use ego_tree::{NodeId, NodeMut, NodeRef};
use listing_core::{LoadingVisual, PointerEvents};
use scraper::{ElementRef, Html, Node, Selector};

use crate::config::CompiledSelectors;

/// Inline style of the content region that the loading cue touches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContentStyle {
    pub opacity: f32,
    pub pointer_events: PointerEvents,
}

impl Default for ContentStyle {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            pointer_events: PointerEvents::Auto,
        }
    }
}

/// Visual state of elements that patches never replace.
///
/// `None` means the page has no such element and the cue is skipped.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PageChrome {
    pub overlay_active: Option<bool>,
    pub content_style: Option<ContentStyle>,
}

impl PageChrome {
    pub fn detect(document: &LiveDocument, selectors: &CompiledSelectors) -> Self {
        Self {
            overlay_active: document
                .select_first(&selectors.loading_overlay)
                .map(|_| false),
            content_style: document
                .select_first(&selectors.content)
                .map(|_| ContentStyle::default()),
        }
    }

    pub fn apply(&mut self, visual: LoadingVisual) {
        if let Some(active) = self.overlay_active.as_mut() {
            *active = visual.overlay_active;
        }
        if let Some(style) = self.content_style.as_mut() {
            style.opacity = visual.content_opacity;
            if let Some(pointer_events) = visual.pointer_events {
                style.pointer_events = pointer_events;
            }
        }
    }
}

pub struct LiveDocument {
    html: Html,
}

impl LiveDocument {
    pub fn parse(markup: &str) -> Self {
        Self {
            html: Html::parse_document(markup),
        }
    }

    /// Elements reachable from the document root, in document order.
    ///
    /// `Html::select` walks the whole arena, detached subtrees included, so
    /// every query on the live page goes through here instead.
    fn attached_elements(&self) -> impl Iterator<Item = ElementRef<'_>> {
        self.html.tree.root().descendants().filter_map(ElementRef::wrap)
    }

    pub fn select_first(&self, selector: &Selector) -> Option<NodeId> {
        self.attached_elements()
            .find(|element| selector.matches(element))
            .map(|element| element.id())
    }

    pub fn select_all(&self, selector: &Selector) -> Vec<NodeId> {
        self.attached_elements()
            .filter(|element| selector.matches(element))
            .map(|element| element.id())
            .collect()
    }

    /// First match of `selector` among the descendants of `scope`.
    pub fn select_within(&self, scope: NodeId, selector: &Selector) -> Option<NodeId> {
        self.element(scope)?
            .select(selector)
            .next()
            .map(|element| element.id())
    }

    pub fn element(&self, node: NodeId) -> Option<ElementRef<'_>> {
        self.html.tree.get(node).and_then(ElementRef::wrap)
    }

    pub fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node)?.value().attr(name)
    }

    pub fn inner_html(&self, node: NodeId) -> Option<String> {
        self.element(node).map(|element| element.inner_html())
    }

    /// Inner HTML of the first match, the usual way tests look at a region.
    pub fn inner_html_of(&self, selector: &Selector) -> Option<String> {
        self.select_first(selector)
            .and_then(|node| self.inner_html(node))
    }

    pub fn text_of(&self, node: NodeId) -> Option<String> {
        self.element(node)
            .map(|element| element.text().collect::<String>().trim().to_string())
    }

    /// Closest element ancestor, like `parentElement`.
    pub fn parent_element(&self, node: NodeId) -> Option<NodeId> {
        self.html
            .tree
            .get(node)?
            .parent()
            .filter(|parent| parent.value().is_element())
            .map(|parent| parent.id())
    }

    /// Whether `node` is still reachable from the document root.
    pub fn is_attached(&self, node: NodeId) -> bool {
        let root = self.html.tree.root().id();
        match self.html.tree.get(node) {
            Some(node_ref) if node_ref.id() == root => true,
            Some(node_ref) => node_ref.ancestors().any(|ancestor| ancestor.id() == root),
            None => false,
        }
    }

    /// Replaces every child of `target` with a deep copy of `source`'s children.
    pub(crate) fn replace_children(&mut self, target: NodeId, source: NodeRef<'_, Node>) -> bool {
        let Some(mut target) = self.html.tree.get_mut(target) else {
            return false;
        };
        while let Some(mut child) = target.first_child() {
            child.detach();
        }
        copy_children(source, &mut target);
        true
    }

    pub(crate) fn remove(&mut self, node: NodeId) -> bool {
        match self.html.tree.get_mut(node) {
            Some(mut node) => {
                node.detach();
                true
            }
            None => false,
        }
    }

    /// Serializes the attached document.
    pub fn html(&self) -> String {
        self.html.html()
    }
}

fn copy_children(source: NodeRef<'_, Node>, target: &mut NodeMut<'_, Node>) {
    for child in source.children() {
        let mut copy = target.append(child.value().clone());
        copy_children(child, &mut copy);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sel(raw: &str) -> Selector {
        Selector::parse(raw).unwrap()
    }

    #[test]
    fn replace_children_copies_nested_markup() {
        let mut live = LiveDocument::parse(r#"<div id="a"><p>old</p></div>"#);
        let source = Html::parse_document(r#"<section id="b"><p>new <b>bold</b></p></section>"#);
        let source_id = source.select(&sel("#b")).next().unwrap().id();
        let target = live.select_first(&sel("#a")).unwrap();

        assert!(live.replace_children(target, source.tree.get(source_id).unwrap()));
        assert_eq!(
            live.inner_html(target).as_deref(),
            Some("<p>new <b>bold</b></p>")
        );
    }

    #[test]
    fn removed_nodes_are_detached() {
        let mut live = LiveDocument::parse(r#"<nav><ul class="pagination"><li><a href="?page=2">2</a></li></ul></nav>"#);
        let link = live.select_first(&sel("a")).unwrap();
        let nav = live.select_first(&sel("nav")).unwrap();
        assert!(live.is_attached(link));

        assert!(live.remove(nav));
        assert!(!live.is_attached(link));
        assert!(live.select_first(&sel(".pagination")).is_none());
    }

    #[test]
    fn queries_skip_descendants_of_replaced_children() {
        let mut live = LiveDocument::parse(
            r#"<nav id="pager"><ul class="pagination"><li><a href="?page=2">2</a></li></ul></nav>"#,
        );
        let source = Html::parse_document(
            r#"<nav id="src"><ul class="pagination"><li><a href="?page=3">3</a></li><li><a href="?page=4">4</a></li></ul></nav>"#,
        );
        let source_id = source.select(&sel("#src")).next().unwrap().id();
        let pager = live.select_first(&sel("#pager")).unwrap();
        let old_list = live.select_first(&sel(".pagination")).unwrap();

        live.replace_children(pager, source.tree.get(source_id).unwrap());

        let lists = live.select_all(&sel(".pagination"));
        assert_eq!(lists.len(), 1);
        assert_ne!(lists[0], old_list);
        let links = live.select_all(&sel(".pagination a"));
        assert_eq!(links.len(), 2);
        assert!(links.iter().all(|link| live.is_attached(*link)));
        assert_eq!(live.attr(links[0], "href"), Some("?page=3"));
    }

    #[test]
    fn chrome_skips_missing_elements() {
        let selectors = crate::config::PageSelectors::default().compile().unwrap();
        let live = LiveDocument::parse(r#"<div class="row"></div>"#);
        let mut chrome = PageChrome::detect(&live, &selectors);
        chrome.apply(LoadingVisual::loading(0.7));
        assert_eq!(chrome.overlay_active, None);
        assert_eq!(chrome.content_style.map(|style| style.opacity), Some(0.7));
    }
}
