use leptos::prelude::*;

use crate::models::vote::{HookId, Vote, VoteState};
use crate::statistics::client::{
    dispatch, HttpStatisticsService, StatisticsConfig, StatisticsRequest,
};

/// Vote state machine behind one rendered widget.
///
/// Kept free of any view or network code so the click semantics can be
/// tested directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteController {
    hook_id: HookId,
    state: VoteState,
}

impl VoteController {
    pub fn new(hook_id: HookId) -> Self {
        Self {
            hook_id,
            state: VoteState::None,
        }
    }

    pub fn hook_id(&self) -> HookId {
        self.hook_id
    }

    pub fn state(&self) -> VoteState {
        self.state
    }

    /// Select `vote` and return the single request the click must issue.
    pub fn register(&mut self, vote: Vote) -> StatisticsRequest {
        self.state = self.state.select(vote);
        StatisticsRequest::new(vote, self.hook_id)
    }

    pub fn register_useful(&mut self) -> StatisticsRequest {
        self.register(Vote::Useful)
    }

    pub fn register_useless(&mut self) -> StatisticsRequest {
        self.register(Vote::Useless)
    }
}

/// Two-button "useful / useless" feedback control for one hook article.
///
/// `site_url` is the base URL of the statistics API. Each click selects its
/// vote right away, then fires one request without waiting for it.
#[component]
pub fn HookStatistics(hook_id: HookId, #[prop(into)] site_url: String) -> impl IntoView {
    let controller = RwSignal::new(VoteController::new(hook_id));
    let service = HttpStatisticsService::new(StatisticsConfig::new(site_url));

    let on_vote = move |vote: Vote| {
        let Some(request) = controller.try_update(|c| c.register(vote)) else {
            return;
        };
        let service = service.clone();
        leptos::task::spawn_local(async move {
            dispatch(&service, &request).await;
        });
    };
    let on_useful = on_vote.clone();
    let on_useless = on_vote;

    let is_disabled = move |vote: Vote| controller.with(|c| c.state().is_disabled(vote));
    let pressed = move |vote: Vote| {
        controller.with(|c| c.state().is_selected(vote).to_string())
    };

    view! {
        <div class="hook-statistics">
            <button
                class="hook-statistics-button"
                aria-label="Useful"
                aria-pressed=move || pressed(Vote::Useful)
                disabled=move || is_disabled(Vote::Useful)
                on:click=move |_| on_useful(Vote::Useful)
            >
                <span class="icon icon-thumbs-up" aria-hidden="true"></span>
            </button>
            <button
                class="hook-statistics-button"
                aria-label="Useless"
                aria-pressed=move || pressed(Vote::Useless)
                disabled=move || is_disabled(Vote::Useless)
                on:click=move |_| on_useless(Vote::Useless)
            >
                <span class="icon icon-thumbs-down" aria-hidden="true"></span>
            </button>
        </div>
    }
}
