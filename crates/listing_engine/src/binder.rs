use std::collections::HashMap;

use ego_tree::NodeId;
use listing_core::Msg;
use sync_logging::sync_debug;

use crate::config::CompiledSelectors;
use crate::dom::LiveDocument;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Input,
    Submit,
    Click,
}

/// A DOM event delivered to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomEvent {
    /// `value` is the field's live value when the event fired.
    Input { target: NodeId, value: String },
    Submit { target: NodeId },
    Click { target: NodeId },
}

impl DomEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            DomEvent::Input { .. } => EventKind::Input,
            DomEvent::Submit { .. } => EventKind::Submit,
            DomEvent::Click { .. } => EventKind::Click,
        }
    }

    pub fn target(&self) -> NodeId {
        match self {
            DomEvent::Input { target, .. }
            | DomEvent::Submit { target }
            | DomEvent::Click { target } => *target,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Listener {
    SearchInput,
    SearchSubmit,
    CategoryLink { index: usize },
    PaginationLink,
}

/// What happened to a dispatched event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventOutcome {
    pub handled: bool,
    pub default_prevented: bool,
}

impl EventOutcome {
    pub const IGNORED: EventOutcome = EventOutcome {
        handled: false,
        default_prevented: false,
    };
}

/// Listener attachments keyed by element identity and event kind.
///
/// At most one listener exists per (element, kind), so rebinding an element
/// that survived a patch never doubles its handler.
#[derive(Debug, Default)]
pub struct BoundListeners {
    by_target: HashMap<(NodeId, EventKind), Listener>,
}

impl BoundListeners {
    pub fn get(&self, target: NodeId, kind: EventKind) -> Option<Listener> {
        self.by_target.get(&(target, kind)).copied()
    }

    pub fn len(&self) -> usize {
        self.by_target.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_target.is_empty()
    }

    pub fn count(&self, wanted: impl Fn(&Listener) -> bool) -> usize {
        self.by_target.values().filter(|listener| wanted(*listener)).count()
    }

    fn attach(&mut self, target: NodeId, kind: EventKind, listener: Listener) {
        self.by_target.insert((target, kind), listener);
    }

    /// Forgets listeners whose element is no longer part of the document.
    fn prune_detached(&mut self, document: &LiveDocument) {
        self.by_target
            .retain(|(target, _), _| document.is_attached(*target));
    }
}

pub struct EventBinder {
    selectors: CompiledSelectors,
}

impl EventBinder {
    pub fn new(selectors: CompiledSelectors) -> Self {
        Self { selectors }
    }

    pub fn search_form(&self, document: &LiveDocument) -> Option<NodeId> {
        document.select_first(&self.selectors.search_form)
    }

    pub fn search_input(&self, document: &LiveDocument) -> Option<NodeId> {
        let form = self.search_form(document)?;
        document.select_within(form, &self.selectors.search_input)
    }

    pub fn category_links(&self, document: &LiveDocument) -> Vec<NodeId> {
        document.select_all(&self.selectors.category_links)
    }

    pub fn pagination_links(&self, document: &LiveDocument) -> Vec<NodeId> {
        document.select_all(&self.selectors.pagination_links)
    }

    /// Page-load binding. Missing anchors just mean the feature is absent.
    pub fn bind_all(&self, document: &LiveDocument) -> BoundListeners {
        let mut listeners = BoundListeners::default();

        if let Some(input) = self.search_input(document) {
            listeners.attach(input, EventKind::Input, Listener::SearchInput);
            if let Some(form) = self.search_form(document) {
                listeners.attach(form, EventKind::Submit, Listener::SearchSubmit);
            }
        }

        for (index, link) in self.category_links(document).into_iter().enumerate() {
            listeners.attach(link, EventKind::Click, Listener::CategoryLink { index });
        }

        self.rebind_pagination(document, &mut listeners);
        sync_debug!("bound {} listeners", listeners.len());
        listeners
    }

    /// Attaches click listeners to the current pagination links.
    ///
    /// Links replaced by a patch are gone from the document, and so are their
    /// listeners; only the new links need attaching.
    pub fn rebind_pagination(&self, document: &LiveDocument, listeners: &mut BoundListeners) -> usize {
        listeners.prune_detached(document);
        let links = self.pagination_links(document);
        for link in &links {
            listeners.attach(*link, EventKind::Click, Listener::PaginationLink);
        }
        links.len()
    }

    /// Maps an event to the message its listener produces.
    ///
    /// Returns `None` when nothing is listening on the target for that kind
    /// of event, including targets that a patch removed from the document.
    pub fn translate(
        &self,
        document: &LiveDocument,
        listeners: &BoundListeners,
        event: DomEvent,
    ) -> Option<(Msg, EventOutcome)> {
        let target = event.target();
        if !document.is_attached(target) {
            return None;
        }
        let listener = listeners.get(target, event.kind())?;
        let prevented = EventOutcome {
            handled: true,
            default_prevented: true,
        };
        let href = || document.attr(target, "href").map(str::to_string);

        match (listener, event) {
            (Listener::SearchInput, DomEvent::Input { value, .. }) => Some((
                Msg::SearchEdited(value),
                EventOutcome {
                    handled: true,
                    default_prevented: false,
                },
            )),
            (Listener::SearchSubmit, DomEvent::Submit { .. }) => {
                Some((Msg::SearchSubmitted, prevented))
            }
            (Listener::CategoryLink { index }, DomEvent::Click { .. }) => {
                Some((Msg::CategoryClicked { index, href: href() }, prevented))
            }
            (Listener::PaginationLink, DomEvent::Click { .. }) => {
                Some((Msg::PageLinkClicked { href: href() }, prevented))
            }
            _ => None,
        }
    }
}
