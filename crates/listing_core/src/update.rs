use crate::{build_search_location, Effect, FilterIntent, LoadingVisual, Msg, NavigableLocation, SyncState};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: SyncState, msg: Msg) -> (SyncState, Vec<Effect>) {
    let effects = match msg {
        Msg::SearchEdited(value) => {
            state.set_search_value(value);
            state.schedule_search();
            vec![Effect::ScheduleSearch]
        }
        Msg::SearchDebounceElapsed => {
            // A submit may have consumed the pending search already.
            if !state.take_scheduled_search() {
                return (state, Vec::new());
            }
            let location = build_search_location(state.location(), state.search_value());
            begin_request(&mut state, location)
        }
        Msg::SearchSubmitted => {
            let mut effects = Vec::with_capacity(3);
            if state.take_scheduled_search() {
                effects.push(Effect::CancelScheduledSearch);
            }
            let location = build_search_location(state.location(), state.search_value());
            effects.extend(begin_request(&mut state, location));
            effects
        }
        Msg::CategoryClicked { index, href } => {
            state.set_active_category(index);
            match href {
                Some(href) => resolve_and_begin(&mut state, FilterIntent::Category(href)),
                None => Vec::new(),
            }
        }
        Msg::PageLinkClicked { href } => match href.filter(|href| !href.trim().is_empty()) {
            Some(href) => resolve_and_begin(&mut state, FilterIntent::Page(href)),
            None => Vec::new(),
        },
        Msg::FilterRequested(location) => begin_request(&mut state, location),
        Msg::FetchSucceeded {
            generation,
            location,
            body,
        } => {
            if !state.lifecycle_mut().settle(generation) {
                return (state, vec![Effect::DiscardStale { generation }]);
            }
            state.set_location(location.clone());
            vec![
                Effect::ApplyFragments { generation, body },
                Effect::PushHistory { location },
                Effect::RebindPagination,
                Effect::ScrollToTop,
                Effect::RenderLoading(LoadingVisual::SETTLED),
            ]
        }
        Msg::FetchFailed {
            generation,
            location,
            message,
        } => {
            if !state.lifecycle_mut().settle(generation) {
                return (state, vec![Effect::DiscardStale { generation }]);
            }
            vec![
                Effect::ReportError {
                    message: format!("filter request to {location} failed: {message}"),
                },
                Effect::RenderLoading(LoadingVisual::SETTLED),
            ]
        }
        Msg::HistoryPopped => {
            state.lifecycle_mut().invalidate();
            let mut effects = Vec::with_capacity(2);
            if state.take_scheduled_search() {
                effects.push(Effect::CancelScheduledSearch);
            }
            effects.push(Effect::ReloadPage);
            effects
        }
        Msg::SettleAcknowledged => {
            state.lifecycle_mut().acknowledge();
            Vec::new()
        }
    };

    (state, effects)
}

fn resolve_and_begin(state: &mut SyncState, intent: FilterIntent) -> Vec<Effect> {
    match intent.into_location(state.location()) {
        Ok(location) => begin_request(state, location),
        Err(err) => vec![Effect::ReportError {
            message: err.to_string(),
        }],
    }
}

fn begin_request(state: &mut SyncState, location: NavigableLocation) -> Vec<Effect> {
    let generation = state.lifecycle_mut().begin();
    vec![
        Effect::RenderLoading(state.lifecycle().visual()),
        Effect::Fetch {
            generation,
            location,
        },
    ]
}
