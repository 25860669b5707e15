//! The session context: one instance of every component plus the injected collaborators,
//! driven by a single event router.

use std::{future::Future, sync::Arc};

use chrono::Utc;
use shared::domain::{Server, ServerId};
use tracing::{debug, info, warn};

use crate::{
    backend::BotBackend,
    composer::{self, Composer},
    config::ControllerSettings,
    connection::{self, ConnectionManager, Credentials},
    error::ClientError,
    events::{EventSender, SessionEvent},
    navigation::{self, ChannelFetch, ExpandOutcome, NavigationState},
    notifications::{NotificationKind, Notifications},
    search::{self, SearchRequest, UserSearch},
    settings_store::CredentialStore,
    target::TargetSelector,
};

pub const CONNECTED_MESSAGE: &str = "Connected successfully!";
pub const MESSAGE_SENT: &str = "Message sent successfully!";
pub const EMBED_SENT: &str = "Embed message sent successfully!";

pub struct Session {
    backend: Arc<dyn BotBackend>,
    store: Arc<dyn CredentialStore>,
    events: EventSender,
    connection: ConnectionManager,
    navigation: NavigationState,
    target: TargetSelector,
    search: UserSearch,
    composer: Composer,
    notifications: Notifications,
    should_quit: bool,
}

impl Session {
    /// Builds a session and pre-fills the connection form from `store`.
    pub fn new(
        backend: Arc<dyn BotBackend>,
        store: Arc<dyn CredentialStore>,
        settings: &ControllerSettings,
        events: EventSender,
    ) -> Self {
        let mut connection = ConnectionManager::new();
        match store.load() {
            Ok(stored) => connection.prefill(stored),
            Err(err) => warn!("could not load saved credentials: {err:#}"),
        }

        Self {
            backend,
            store,
            events,
            connection,
            navigation: NavigationState::new(),
            target: TargetSelector::new(),
            search: UserSearch::new(settings.search_debounce),
            composer: Composer::new(),
            notifications: Notifications::new(
                settings.notification_display,
                settings.notification_exit,
            ),
            should_quit: false,
        }
    }

    pub fn connection(&self) -> &ConnectionManager {
        &self.connection
    }

    pub fn navigation(&self) -> &NavigationState {
        &self.navigation
    }

    pub fn target(&self) -> &TargetSelector {
        &self.target
    }

    pub fn search(&self) -> &UserSearch {
        &self.search
    }

    pub fn composer(&self) -> &Composer {
        &self.composer
    }

    pub fn notifications(&self) -> &Notifications {
        &self.notifications
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn handle(&mut self, event: SessionEvent) {
        debug!(event = event.name(), "handling session event");
        match event {
            SessionEvent::ConnectRequested {
                server_url,
                api_secret,
            } => self.connect(&server_url, &api_secret),
            SessionEvent::ConnectFinished {
                credentials,
                result,
            } => self.finish_connect(credentials, result),
            SessionEvent::ServerToggled(server_id) => self.toggle_server(&server_id),
            SessionEvent::ChannelsLoaded { fetch, result } => {
                self.navigation.apply_channels(fetch, result);
            }
            SessionEvent::ChannelSelected {
                server_id,
                channel_id,
                channel_name,
            } => {
                if let Err(err) = self
                    .target
                    .select_channel(server_id, channel_id, channel_name)
                {
                    self.report(err.into());
                }
            }
            SessionEvent::UserSelected {
                user_id,
                username,
                display_name,
            } => {
                if let Err(err) = self.target.select_user(user_id, username, display_name) {
                    self.report(err.into());
                }
            }
            SessionEvent::SearchQueryChanged(query) => {
                self.search.on_query_changed(&query, &self.events);
            }
            SessionEvent::SearchDebounceElapsed { ticket } => {
                if let Some(query) = self.search.on_debounce_elapsed(ticket) {
                    let connected = self.connection.is_connected();
                    if let Some(request) = self.search.execute(query, connected) {
                        self.start_search(request);
                    }
                }
            }
            SessionEvent::SearchFinished { token, result } => {
                self.search.apply(token, result);
            }
            SessionEvent::ComposerTabSelected(tab) => self.composer.select_tab(tab),
            SessionEvent::SimpleTextChanged(text) => self.composer.set_simple_text(text),
            SessionEvent::EmbedInputChanged { input, value } => {
                self.composer.set_embed_input(input, value)
            }
            SessionEvent::EmbedFieldAdded {
                name,
                value,
                inline,
            } => self.composer.add_embed_field(name, value, inline),
            SessionEvent::EmbedFieldsCleared => self.composer.clear_embed_fields(),
            SessionEvent::EmbedColorSelected(color) => self.composer.select_color(color),
            SessionEvent::SendSimpleRequested => self.send_simple(),
            SessionEvent::SimpleSendFinished(result) => {
                let outcome = self.composer.finish_simple(result);
                self.announce(outcome.map(|_| MESSAGE_SENT));
            }
            SessionEvent::SendEmbedRequested => self.send_embed(),
            SessionEvent::EmbedSendFinished(result) => {
                let outcome = self.composer.finish_embed(result);
                self.announce(outcome.map(|_| EMBED_SENT));
            }
            SessionEvent::NotificationTimer { ticket } => {
                self.notifications.on_timer(ticket, &self.events);
            }
            SessionEvent::Quit => {
                info!("session shutting down");
                self.should_quit = true;
            }
        }
    }

    fn connect(&mut self, server_url: &str, api_secret: &str) {
        let credentials = match self.connection.begin_connect(server_url, api_secret) {
            Ok(credentials) => credentials,
            Err(err) => return self.report(err),
        };
        let backend = Arc::clone(&self.backend);
        self.spawn_completion(async move {
            let result = connection::handshake(backend.as_ref(), &credentials).await;
            SessionEvent::ConnectFinished {
                credentials,
                result,
            }
        });
    }

    fn finish_connect(
        &mut self,
        credentials: Credentials,
        result: Result<Vec<Server>, ClientError>,
    ) {
        let attempted = credentials.clone();
        match self.connection.finish_connect(credentials, result) {
            Ok(servers) => {
                self.navigation.replace_servers(servers);
                if let Err(err) = self.store.save(&attempted) {
                    warn!("failed to persist credentials: {err:#}");
                }
                self.notify(NotificationKind::Success, CONNECTED_MESSAGE);
            }
            Err(err) => self.report(err),
        }
    }

    fn toggle_server(&mut self, server_id: &ServerId) {
        if !self.connection.is_connected() {
            warn!(%server_id, "ignoring server toggle while not connected");
            return;
        }
        match self.navigation.expand(server_id) {
            Ok(ExpandOutcome::Expanded { fetch: Some(fetch) }) => self.start_channel_fetch(fetch),
            Ok(ExpandOutcome::Expanded { fetch: None }) | Ok(ExpandOutcome::Collapsed) => {}
            Err(err) => debug!(%server_id, "server toggle rejected: {err}"),
        }
    }

    fn start_channel_fetch(&self, fetch: ChannelFetch) {
        let backend = Arc::clone(&self.backend);
        self.spawn_completion(async move {
            let result = navigation::fetch_channels(backend.as_ref(), &fetch.server_id).await;
            SessionEvent::ChannelsLoaded { fetch, result }
        });
    }

    fn start_search(&self, request: SearchRequest) {
        let backend = Arc::clone(&self.backend);
        self.spawn_completion(async move {
            let result = search::run_search(backend.as_ref(), &request.query).await;
            SessionEvent::SearchFinished {
                token: request.token,
                result,
            }
        });
    }

    fn send_simple(&mut self) {
        let connected = self.connection.is_connected();
        let message = match self.composer.begin_simple(connected, self.target.current()) {
            Ok(message) => message,
            Err(err) => return self.report(err),
        };
        let backend = Arc::clone(&self.backend);
        self.spawn_completion(async move {
            SessionEvent::SimpleSendFinished(
                composer::dispatch_simple(backend.as_ref(), &message).await,
            )
        });
    }

    fn send_embed(&mut self) {
        let connected = self.connection.is_connected();
        let message = match self
            .composer
            .begin_embed(connected, self.target.current(), Utc::now())
        {
            Ok(message) => message,
            Err(err) => return self.report(err),
        };
        let backend = Arc::clone(&self.backend);
        self.spawn_completion(async move {
            SessionEvent::EmbedSendFinished(
                composer::dispatch_embed(backend.as_ref(), &message).await,
            )
        });
    }

    fn announce(&mut self, outcome: Result<&'static str, ClientError>) {
        match outcome {
            Ok(message) => self.notify(NotificationKind::Success, message),
            Err(err) => self.report(err),
        }
    }

    /// Surfaces a failure as an error notification. Validation failures never reached the backend.
    fn report(&mut self, err: ClientError) {
        if err.is_validation() {
            debug!("rejected user action: {err}");
        } else {
            warn!("operation failed: {err}");
        }
        self.notify(NotificationKind::Error, err.to_string());
    }

    fn notify(&mut self, kind: NotificationKind, message: impl Into<String>) {
        self.notifications.show(kind, message, &self.events);
    }

    fn spawn_completion<F>(&self, work: F)
    where
        F: Future<Output = SessionEvent> + Send + 'static,
    {
        let events = self.events.clone();
        tokio::spawn(async move {
            let event = work.await;
            if events.send(event).is_err() {
                debug!("session closed before a backend call completed");
            }
        });
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
