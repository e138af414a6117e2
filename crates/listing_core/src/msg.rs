use crate::{NavigableLocation, RequestGeneration};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// The search field's live value changed (`input` event).
    SearchEdited(String),
    /// The quiet period after the last search edit elapsed.
    SearchDebounceElapsed,
    /// The search form was submitted.
    SearchSubmitted,
    /// A category link was clicked.
    CategoryClicked { index: usize, href: Option<String> },
    /// A pagination link was clicked.
    PageLinkClicked { href: Option<String> },
    /// A host asked for `location` directly.
    FilterRequested(NavigableLocation),
    /// A fetch completed and its body was decoded.
    FetchSucceeded {
        generation: RequestGeneration,
        location: NavigableLocation,
        body: String,
    },
    /// A fetch failed before a body could be read.
    FetchFailed {
        generation: RequestGeneration,
        location: NavigableLocation,
        message: String,
    },
    /// Browser back/forward.
    HistoryPopped,
    /// The settled cue has been observed; return to idle.
    SettleAcknowledged,
}
