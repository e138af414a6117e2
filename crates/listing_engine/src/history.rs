use std::cell::{Cell, RefCell};

use listing_core::NavigableLocation;

/// Browser history as seen by the engine.
pub trait HistorySink {
    /// Records `location` as the current entry without navigating. The entry
    /// carries no state payload.
    fn push(&self, location: &NavigableLocation);
    /// Full reload of whatever entry is current.
    fn reload(&self);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub url: String,
}

/// In-memory history, for hosts without a real browser and for tests.
#[derive(Debug, Default)]
pub struct MemoryHistory {
    entries: RefCell<Vec<HistoryEntry>>,
    reloads: Cell<usize>,
}

impl MemoryHistory {
    pub fn new(initial: &NavigableLocation) -> Self {
        Self {
            entries: RefCell::new(vec![HistoryEntry {
                url: initial.to_string(),
            }]),
            reloads: Cell::new(0),
        }
    }

    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.entries.borrow().clone()
    }

    pub fn current(&self) -> Option<String> {
        self.entries.borrow().last().map(|entry| entry.url.clone())
    }

    pub fn reloads(&self) -> usize {
        self.reloads.get()
    }
}

impl HistorySink for MemoryHistory {
    fn push(&self, location: &NavigableLocation) {
        self.entries.borrow_mut().push(HistoryEntry {
            url: location.to_string(),
        });
    }

    fn reload(&self) {
        self.reloads.set(self.reloads.get() + 1);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    Smooth,
}

pub trait Viewport {
    fn scroll_to_top(&self, behavior: ScrollBehavior);
}

/// Viewport that only remembers how it was scrolled.
#[derive(Debug, Default)]
pub struct RecordingViewport {
    scrolls: RefCell<Vec<ScrollBehavior>>,
}

impl RecordingViewport {
    pub fn scrolls(&self) -> Vec<ScrollBehavior> {
        self.scrolls.borrow().clone()
    }
}

impl Viewport for RecordingViewport {
    fn scroll_to_top(&self, behavior: ScrollBehavior) {
        self.scrolls.borrow_mut().push(behavior);
    }
}
