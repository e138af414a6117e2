use crate::view_model::SyncViewModel;
use crate::{FetchLifecycle, NavigableLocation};

#[derive(Debug, Clone, PartialEq)]
pub struct SyncState {
    location: NavigableLocation,
    search_value: String,
    active_category: Option<usize>,
    lifecycle: FetchLifecycle,
    search_scheduled: bool,
}

impl SyncState {
    pub fn new(location: NavigableLocation, search_value: impl Into<String>) -> Self {
        Self::with_lifecycle(location, search_value, FetchLifecycle::default())
    }

    pub fn with_lifecycle(
        location: NavigableLocation,
        search_value: impl Into<String>,
        lifecycle: FetchLifecycle,
    ) -> Self {
        Self {
            location,
            search_value: search_value.into(),
            active_category: None,
            lifecycle,
            search_scheduled: false,
        }
    }

    pub fn view(&self) -> SyncViewModel {
        SyncViewModel {
            location: self.location.to_string(),
            search_value: self.search_value.clone(),
            active_category: self.active_category,
            lifecycle: self.lifecycle.state(),
            latest_generation: self.lifecycle.latest_generation(),
            visual: self.lifecycle.visual(),
            search_scheduled: self.search_scheduled,
        }
    }

    pub fn location(&self) -> &NavigableLocation {
        &self.location
    }

    pub fn search_value(&self) -> &str {
        &self.search_value
    }

    pub fn active_category(&self) -> Option<usize> {
        self.active_category
    }

    pub fn lifecycle(&self) -> &FetchLifecycle {
        &self.lifecycle
    }

    pub(crate) fn lifecycle_mut(&mut self) -> &mut FetchLifecycle {
        &mut self.lifecycle
    }

    pub(crate) fn set_location(&mut self, location: NavigableLocation) {
        self.location = location;
    }

    pub(crate) fn set_search_value(&mut self, value: String) {
        self.search_value = value;
    }

    pub(crate) fn set_active_category(&mut self, index: usize) {
        self.active_category = Some(index);
    }

    pub(crate) fn schedule_search(&mut self) {
        self.search_scheduled = true;
    }

    /// Clears the scheduled flag, returning whether a search was pending.
    pub(crate) fn take_scheduled_search(&mut self) -> bool {
        std::mem::replace(&mut self.search_scheduled, false)
    }
}
