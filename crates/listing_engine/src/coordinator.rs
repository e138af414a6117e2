//! Request coordination: runs the pure `update` loop and executes its effects
//! against the live document, the network and browser history.
//!
//! Everything runs on one thread inside a `tokio::task::LocalSet`, the same
//! shape as a browser event loop: work is either a synchronous event handler
//! or a continuation after a timer or a fetch completes.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::sync::Arc;

use ego_tree::NodeId;
use listing_core::{
    update, Effect, FetchLifecycle, Msg, NavigableLocation, RequestGeneration, SyncState,
    SyncViewModel,
};
use sync_logging::{set_request_generation, sync_debug, sync_error, sync_info, sync_warn};

use crate::binder::{BoundListeners, DomEvent, EventBinder, EventOutcome};
use crate::config::{ConfigError, SyncConfig};
use crate::debounce::Debouncer;
use crate::decode::{response_text, strict_response_text};
use crate::dom::{LiveDocument, PageChrome};
use crate::extract::{FragmentExtractor, SelectorExtractor};
use crate::fetch::Fetcher;
use crate::history::{HistorySink, ScrollBehavior, Viewport};
use crate::patch::{DomPatcher, PatchReport};

/// The outside world the engine talks to.
pub struct EnginePorts {
    pub fetcher: Arc<dyn Fetcher>,
    pub history: Rc<dyn HistorySink>,
    pub viewport: Rc<dyn Viewport>,
}

struct Session {
    state: SyncState,
    document: LiveDocument,
    chrome: PageChrome,
    listeners: BoundListeners,
    last_patch: Option<PatchReport>,
}

struct EngineInner {
    session: RefCell<Session>,
    ports: EnginePorts,
    extractor: Box<dyn FragmentExtractor>,
    patcher: DomPatcher,
    binder: EventBinder,
    debouncer: Debouncer,
    strict_decoding: bool,
    in_flight: Cell<usize>,
}

/// Keeps a listing page in sync with filter, search and pagination input.
///
/// Cloning yields another handle to the same engine.
#[derive(Clone)]
pub struct SyncEngine {
    inner: Rc<EngineInner>,
}

impl SyncEngine {
    /// Binds listeners on `document`, which is showing `location`.
    pub fn new(
        config: &SyncConfig,
        document: LiveDocument,
        location: NavigableLocation,
        ports: EnginePorts,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let selectors = config.selectors.compile()?;
        let binder = EventBinder::new(selectors.clone());
        let listeners = binder.bind_all(&document);
        let chrome = PageChrome::detect(&document, &selectors);
        let initial_search = binder
            .search_input(&document)
            .and_then(|input| document.attr(input, "value"))
            .unwrap_or_default()
            .to_string();
        let state = SyncState::with_lifecycle(
            location,
            initial_search,
            FetchLifecycle::new(config.loading_opacity),
        );
        let delay = config.debounce_delay();
        let strict_decoding = config.fetch.strict_responses;

        let inner = Rc::new_cyclic(|weak: &Weak<EngineInner>| {
            let weak = weak.clone();
            EngineInner {
                session: RefCell::new(Session {
                    state,
                    document,
                    chrome,
                    listeners,
                    last_patch: None,
                }),
                ports,
                extractor: Box::new(SelectorExtractor::new(selectors.clone())),
                patcher: DomPatcher::new(selectors),
                binder,
                debouncer: Debouncer::wrap(
                    move || {
                        if let Some(inner) = weak.upgrade() {
                            handle(&inner, Msg::SearchDebounceElapsed);
                        }
                    },
                    delay,
                ),
                strict_decoding,
                in_flight: Cell::new(0),
            }
        });

        Ok(Self { inner })
    }

    /// Delivers a DOM event to whatever listener is bound to its target.
    ///
    /// # Panics
    ///
    /// Panics if a fetch or timer has to start outside a `tokio::task::LocalSet`.
    pub fn dispatch(&self, event: DomEvent) -> EventOutcome {
        let translated = {
            let session = self.inner.session.borrow();
            self.inner
                .binder
                .translate(&session.document, &session.listeners, event)
        };
        match translated {
            Some((msg, outcome)) => {
                handle(&self.inner, msg);
                outcome
            }
            None => EventOutcome::IGNORED,
        }
    }

    /// Sets the search field to `value` and fires its `input` event.
    ///
    /// # Panics
    ///
    /// Panics if a fetch or timer has to start outside a `tokio::task::LocalSet`.
    pub fn type_search(&self, value: &str) -> EventOutcome {
        match self.search_input() {
            Some(target) => self.dispatch(DomEvent::Input {
                target,
                value: value.to_string(),
            }),
            None => EventOutcome::IGNORED,
        }
    }

    /// Fires the search form's `submit` event.
    ///
    /// # Panics
    ///
    /// Panics if a fetch or timer has to start outside a `tokio::task::LocalSet`.
    pub fn submit_search(&self) -> EventOutcome {
        match self.search_form() {
            Some(target) => self.dispatch(DomEvent::Submit { target }),
            None => EventOutcome::IGNORED,
        }
    }

    /// Fires a `click` on `target`.
    ///
    /// # Panics
    ///
    /// Panics if a fetch or timer has to start outside a `tokio::task::LocalSet`.
    pub fn click(&self, target: NodeId) -> EventOutcome {
        self.dispatch(DomEvent::Click { target })
    }

    /// Fetches `location` and splices the result into the page.
    ///
    /// # Panics
    ///
    /// Panics if a fetch or timer has to start outside a `tokio::task::LocalSet`.
    pub fn perform_filter(&self, location: NavigableLocation) {
        handle(&self.inner, Msg::FilterRequested(location));
    }

    /// Browser back/forward: the page is reloaded in full.
    pub fn pop_state(&self) {
        handle(&self.inner, Msg::HistoryPopped);
    }

    /// Moves a settled lifecycle back to idle.
    pub fn acknowledge_settled(&self) {
        handle(&self.inner, Msg::SettleAcknowledged);
    }

    pub fn view(&self) -> SyncViewModel {
        self.inner.session.borrow().state.view()
    }

    pub fn chrome(&self) -> PageChrome {
        self.inner.session.borrow().chrome
    }

    pub fn last_patch(&self) -> Option<PatchReport> {
        self.inner.session.borrow().last_patch
    }

    pub fn with_document<R>(&self, f: impl FnOnce(&LiveDocument) -> R) -> R {
        f(&self.inner.session.borrow().document)
    }

    pub fn with_listeners<R>(&self, f: impl FnOnce(&BoundListeners) -> R) -> R {
        f(&self.inner.session.borrow().listeners)
    }

    pub fn search_input(&self) -> Option<NodeId> {
        self.with_document(|document| self.inner.binder.search_input(document))
    }

    pub fn search_form(&self) -> Option<NodeId> {
        self.with_document(|document| self.inner.binder.search_form(document))
    }

    pub fn category_links(&self) -> Vec<NodeId> {
        self.with_document(|document| self.inner.binder.category_links(document))
    }

    pub fn pagination_links(&self) -> Vec<NodeId> {
        self.with_document(|document| self.inner.binder.pagination_links(document))
    }

    /// Number of fetches started and not yet finished, stale ones included.
    pub fn in_flight(&self) -> usize {
        self.inner.in_flight.get()
    }

    pub fn search_pending(&self) -> bool {
        self.inner.debouncer.is_pending()
    }
}

fn handle(inner: &Rc<EngineInner>, msg: Msg) {
    let effects = {
        let mut session = inner.session.borrow_mut();
        let (next, effects) = update(session.state.clone(), msg);
        session.state = next;
        effects
    };
    for effect in effects {
        run_effect(inner, effect);
    }
}

fn run_effect(inner: &Rc<EngineInner>, effect: Effect) {
    match effect {
        Effect::ScheduleSearch => inner.debouncer.call(),
        Effect::CancelScheduledSearch => {
            if inner.debouncer.cancel() {
                sync_debug!("pending search cancelled");
            }
        }
        Effect::RenderLoading(visual) => inner.session.borrow_mut().chrome.apply(visual),
        Effect::Fetch {
            generation,
            location,
        } => {
            set_request_generation(generation);
            inner.in_flight.set(inner.in_flight.get() + 1);
            tokio::task::spawn_local(run_request(Rc::clone(inner), generation, location));
        }
        Effect::ApplyFragments { generation, body } => {
            let fragments = inner.extractor.extract(&body);
            let mut session = inner.session.borrow_mut();
            let report = inner.patcher.apply(&mut session.document, &fragments);
            session.last_patch = Some(report);
            sync_info!("applied response of request {}", generation);
        }
        Effect::PushHistory { location } => inner.ports.history.push(&location),
        Effect::RebindPagination => {
            let mut session = inner.session.borrow_mut();
            let Session {
                document,
                listeners,
                ..
            } = &mut *session;
            let bound = inner.binder.rebind_pagination(document, listeners);
            sync_debug!("rebound {} pagination links", bound);
        }
        Effect::ScrollToTop => inner.ports.viewport.scroll_to_top(ScrollBehavior::Smooth),
        Effect::ReportError { message } => sync_error!("{}", message),
        Effect::DiscardStale { generation } => {
            sync_warn!("discarding response of superseded request {}", generation);
        }
        Effect::ReloadPage => {
            sync_info!("history navigation, reloading page");
            inner.ports.history.reload();
        }
    }
}

async fn run_request(
    inner: Rc<EngineInner>,
    generation: RequestGeneration,
    location: NavigableLocation,
) {
    set_request_generation(generation);
    sync_info!("GET {}", location);

    let result = match inner.ports.fetcher.fetch(&location).await {
        Ok(output) if inner.strict_decoding => strict_response_text(&output),
        Ok(output) => Ok(response_text(&output)),
        Err(err) => Err(err),
    };

    set_request_generation(generation);
    let msg = match result {
        Ok(body) => Msg::FetchSucceeded {
            generation,
            location,
            body,
        },
        Err(err) => Msg::FetchFailed {
            generation,
            location,
            message: err.to_string(),
        },
    };
    inner.in_flight.set(inner.in_flight.get().saturating_sub(1));
    handle(&inner, msg);
}
