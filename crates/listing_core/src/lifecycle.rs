/// Monotonic tag of an issued fetch. Zero means "nothing issued yet".
pub type RequestGeneration = u64;

/// Opacity of the content region while a fetch is pending.
pub const DEFAULT_LOADING_OPACITY: f32 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchLifecycleState {
    #[default]
    Idle,
    Loading,
    Settled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvents {
    Auto,
    None,
}

/// Visual cues derived from the lifecycle.
///
/// `pointer_events: None` leaves the content region's current value alone;
/// only settling writes it back to `Auto`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadingVisual {
    pub overlay_active: bool,
    pub content_opacity: f32,
    pub pointer_events: Option<PointerEvents>,
}

impl LoadingVisual {
    pub const SETTLED: LoadingVisual = LoadingVisual {
        overlay_active: false,
        content_opacity: 1.0,
        pointer_events: Some(PointerEvents::Auto),
    };

    pub fn loading(content_opacity: f32) -> Self {
        Self {
            overlay_active: true,
            content_opacity,
            pointer_events: None,
        }
    }
}

/// The single, page-wide fetch lifecycle.
///
/// Every `begin` issues a new generation; only the latest generation may
/// settle, so an older response finishing late cannot clear the loading cue
/// of a newer request.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchLifecycle {
    state: FetchLifecycleState,
    latest: RequestGeneration,
    loading_opacity: f32,
}

impl FetchLifecycle {
    pub fn new(loading_opacity: f32) -> Self {
        Self {
            state: FetchLifecycleState::Idle,
            latest: 0,
            loading_opacity,
        }
    }

    pub fn state(&self) -> FetchLifecycleState {
        self.state
    }

    pub fn latest_generation(&self) -> RequestGeneration {
        self.latest
    }

    pub fn is_current(&self, generation: RequestGeneration) -> bool {
        generation != 0 && generation == self.latest
    }

    /// Starts a request, superseding any request still in flight.
    pub fn begin(&mut self) -> RequestGeneration {
        self.latest += 1;
        self.state = FetchLifecycleState::Loading;
        self.latest
    }

    /// Settles `generation`. Returns `false` for stale generations.
    pub fn settle(&mut self, generation: RequestGeneration) -> bool {
        if !self.is_current(generation) || self.state != FetchLifecycleState::Loading {
            return false;
        }
        self.state = FetchLifecycleState::Settled;
        true
    }

    pub fn acknowledge(&mut self) {
        if self.state == FetchLifecycleState::Settled {
            self.state = FetchLifecycleState::Idle;
        }
    }

    /// Orphans every in-flight request without settling any of them.
    pub fn invalidate(&mut self) {
        self.latest += 1;
        self.state = FetchLifecycleState::Idle;
    }

    pub fn visual(&self) -> LoadingVisual {
        match self.state {
            FetchLifecycleState::Loading => LoadingVisual::loading(self.loading_opacity),
            FetchLifecycleState::Idle | FetchLifecycleState::Settled => LoadingVisual::SETTLED,
        }
    }
}

impl Default for FetchLifecycle {
    fn default() -> Self {
        Self::new(DEFAULT_LOADING_OPACITY)
    }
}
