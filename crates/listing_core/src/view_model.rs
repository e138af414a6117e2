use crate::{FetchLifecycleState, LoadingVisual, RequestGeneration};

#[derive(Debug, Clone, PartialEq)]
pub struct SyncViewModel {
    pub location: String,
    pub search_value: String,
    pub active_category: Option<usize>,
    pub lifecycle: FetchLifecycleState,
    pub latest_generation: RequestGeneration,
    pub visual: LoadingVisual,
    pub search_scheduled: bool,
}
