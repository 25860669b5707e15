//! Debounced user search with stale-response suppression.

use std::time::Duration;

use shared::domain::User;
use tracing::{debug, warn};

use crate::{
    backend::BotBackend,
    error::{ClientError, FetchScope},
    events::{EventSender, SessionEvent},
    timer::CancelableTimer,
};

pub const MIN_QUERY_CHARS: usize = 2;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SearchResults {
    #[default]
    Idle,
    NotConnected,
    Loading,
    Found(Vec<User>),
    Failed(String),
}

/// A search that must be sent to the backend, tagged with the token it was issued under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub token: u64,
    pub query: String,
}

#[derive(Debug)]
pub struct UserSearch {
    query: String,
    pending: Option<String>,
    token: u64,
    debounce: Duration,
    timer: CancelableTimer,
    results: SearchResults,
}

impl UserSearch {
    pub fn new(debounce: Duration) -> Self {
        Self {
            query: String::new(),
            pending: None,
            token: 0,
            debounce,
            timer: CancelableTimer::new(),
            results: SearchResults::Idle,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn results(&self) -> &SearchResults {
        &self.results
    }

    pub fn latest_token(&self) -> u64 {
        self.token
    }

    pub fn has_pending(&self) -> bool {
        self.timer.is_armed()
    }

    /// Returns `true` when a search was (re)scheduled.
    pub fn on_query_changed(&mut self, query: &str, events: &EventSender) -> bool {
        let query = query.trim();
        self.query = query.to_string();

        if query.chars().count() < MIN_QUERY_CHARS {
            self.timer.cancel();
            self.pending = None;
            // A response still in flight must not refill a cleared panel.
            self.token += 1;
            self.results = SearchResults::Idle;
            return false;
        }

        self.pending = Some(query.to_string());
        self.timer.schedule(self.debounce, events, |ticket| {
            SessionEvent::SearchDebounceElapsed { ticket }
        });
        true
    }

    /// The query to run when `ticket` is the live debounce tick.
    pub fn on_debounce_elapsed(&mut self, ticket: u64) -> Option<String> {
        if self.timer.fire(ticket) {
            self.pending.take()
        } else {
            debug!(ticket, "ignoring superseded search debounce tick");
            None
        }
    }

    pub fn execute(&mut self, query: String, connected: bool) -> Option<SearchRequest> {
        self.token += 1;
        if !connected {
            self.results = SearchResults::NotConnected;
            return None;
        }
        self.results = SearchResults::Loading;
        Some(SearchRequest {
            token: self.token,
            query,
        })
    }

    /// Applies a response when its token is still the latest. Returns whether it was applied.
    pub fn apply(&mut self, token: u64, result: Result<Vec<User>, ClientError>) -> bool {
        if token != self.token {
            debug!(token, latest = self.token, "discarding stale search response");
            return false;
        }
        self.results = match result {
            Ok(users) => SearchResults::Found(users),
            Err(err) => {
                warn!(query = %self.query, "user search failed: {err}");
                SearchResults::Failed(err.to_string())
            }
        };
        true
    }
}

pub async fn run_search(backend: &dyn BotBackend, query: &str) -> Result<Vec<User>, ClientError> {
    backend
        .search_users(query)
        .await
        .map_err(|err| ClientError::scoped(FetchScope::UserSearch, err))
}

#[cfg(test)]
#[path = "tests/search_tests.rs"]
mod tests;
