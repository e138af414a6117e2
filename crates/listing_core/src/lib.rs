//! Listing core: pure state machine for in-place listing synchronisation.
mod effect;
mod lifecycle;
mod location;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use lifecycle::{
    FetchLifecycle, FetchLifecycleState, LoadingVisual, PointerEvents, RequestGeneration,
    DEFAULT_LOADING_OPACITY,
};
pub use location::{
    build_search_location, FilterIntent, LocationError, NavigableLocation, PAGE_PARAM,
    SEARCH_PARAM,
};
pub use msg::Msg;
pub use state::SyncState;
pub use update::update;
pub use view_model::SyncViewModel;
