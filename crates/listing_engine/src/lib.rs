//! Listing engine: fetches listing fragments and keeps the live page in sync.
mod binder;
mod config;
mod coordinator;
mod debounce;
mod decode;
mod dom;
mod extract;
mod fetch;
mod history;
mod patch;
mod types;

pub use binder::{BoundListeners, DomEvent, EventBinder, EventKind, EventOutcome, Listener};
pub use config::{CompiledSelectors, ConfigError, FetchConfig, PageSelectors, SyncConfig};
pub use coordinator::{EnginePorts, SyncEngine};
pub use debounce::Debouncer;
pub use decode::{
    decode_body, decode_body_lossy, response_text, strict_response_text, DecodeError, DecodedBody,
};
pub use dom::{ContentStyle, LiveDocument, PageChrome};
pub use extract::{ExtractedFragments, FragmentExtractor, SelectorExtractor};
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher, FRAGMENT_HEADER, FRAGMENT_HEADER_VALUE};
pub use history::{
    HistoryEntry, HistorySink, MemoryHistory, RecordingViewport, ScrollBehavior, Viewport,
};
pub use patch::{DomPatcher, PatchReport, RegionChange};
pub use types::{FailureKind, FetchError, FetchMetadata, FetchOutput, RegionKind};

pub use ego_tree::NodeId;
