use crate::{LoadingVisual, NavigableLocation, RequestGeneration};

/// Side effects requested by `update`, executed in order by the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// (Re)start the search debounce timer.
    ScheduleSearch,
    /// Drop a pending debounced search.
    CancelScheduledSearch,
    RenderLoading(LoadingVisual),
    Fetch {
        generation: RequestGeneration,
        location: NavigableLocation,
    },
    /// Extract regions from `body` and patch them into the live document.
    ApplyFragments {
        generation: RequestGeneration,
        body: String,
    },
    PushHistory { location: NavigableLocation },
    RebindPagination,
    ScrollToTop,
    ReportError { message: String },
    /// A response arrived for a superseded request and was dropped.
    DiscardStale { generation: RequestGeneration },
    ReloadPage,
}
