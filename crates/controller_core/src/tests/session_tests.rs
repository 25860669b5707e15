use std::time::Duration;

use shared::{
    domain::{ChannelId, ServerId, UserId},
    protocol::SimpleMessage,
};
use tokio::sync::mpsc;

use super::*;
use crate::{
    composer::{EmbedColor, EmbedDraft, EmbedInput},
    connection::ConnectionState,
    events::EventReceiver,
    navigation::ChannelPanel,
    notifications::Notification,
    search::SearchResults,
    settings_store::{MemoryCredentialStore, StoredCredentials},
    target::Target,
    test_support::{channel, server, user, BackendCall, FakeBackend},
};

struct Harness {
    session: Session,
    rx: EventReceiver,
    backend: Arc<FakeBackend>,
    store: Arc<MemoryCredentialStore>,
}

impl Harness {
    fn new(backend: Arc<FakeBackend>) -> Self {
        Self::with_store(backend, MemoryCredentialStore::default())
    }

    fn with_store(backend: Arc<FakeBackend>, store: MemoryCredentialStore) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let store = Arc::new(store);
        let session = Session::new(
            backend.clone(),
            store.clone(),
            &ControllerSettings::default(),
            tx,
        );
        Self {
            session,
            rx,
            backend,
            store,
        }
    }

    async fn next(&mut self) -> SessionEvent {
        tokio::time::timeout(Duration::from_secs(30), self.rx.recv())
            .await
            .expect("event before timeout")
            .expect("session channel open")
    }

    /// Handles queued events until one matching `done` has been handled.
    async fn settle_until(&mut self, done: impl Fn(&SessionEvent) -> bool) {
        loop {
            let event = self.next().await;
            let finished = done(&event);
            self.session.handle(event);
            if finished {
                return;
            }
        }
    }

    async fn connect(&mut self) {
        self.session.handle(SessionEvent::ConnectRequested {
            server_url: "http://bot.local/".into(),
            api_secret: "secret".into(),
        });
        self.settle_until(|event| matches!(event, SessionEvent::ConnectFinished { .. }))
            .await;
    }

    fn notification(&self) -> Option<Notification> {
        self.session.notifications().current().cloned()
    }

    fn notification_text(&self) -> Option<String> {
        self.notification().map(|notification| notification.message)
    }
}

fn two_guilds() -> Arc<FakeBackend> {
    FakeBackend::new()
        .with_guilds(vec![server("gA", "Alpha"), server("gB", "Beta")])
        .with_channels("gA", vec![channel("chan1", "general"), channel("chan2", "dev")])
}

fn is_channels_loaded(event: &SessionEvent) -> bool {
    matches!(event, SessionEvent::ChannelsLoaded { .. })
}

fn is_search_finished(event: &SessionEvent) -> bool {
    matches!(event, SessionEvent::SearchFinished { .. })
}

#[tokio::test]
async fn form_is_prefilled_from_saved_credentials() {
    let harness = Harness::with_store(
        FakeBackend::new(),
        MemoryCredentialStore::with("http://saved", "s3cret"),
    );
    let form = harness.session.connection().form();
    assert_eq!(form.server_url, "http://saved");
    assert_eq!(form.api_secret, "s3cret");
}

#[tokio::test]
async fn connect_stores_guilds_and_persists_credentials() {
    let mut harness = Harness::new(two_guilds());
    harness.session.handle(SessionEvent::ConnectRequested {
        server_url: "  http://bot.local/ ".into(),
        api_secret: " secret ".into(),
    });

    assert_eq!(harness.session.connection().state(), ConnectionState::Connecting);
    assert!(!harness.session.connection().connect_enabled());

    harness
        .settle_until(|event| matches!(event, SessionEvent::ConnectFinished { .. }))
        .await;

    assert_eq!(harness.session.connection().state(), ConnectionState::Connected);
    assert!(harness.session.connection().connect_enabled());
    assert_eq!(harness.session.navigation().servers().len(), 2);
    assert_eq!(harness.notification_text().as_deref(), Some(CONNECTED_MESSAGE));
    assert_eq!(
        harness.backend.calls()[..2],
        [
            BackendCall::SetApiConfig {
                server_url: "http://bot.local".into(),
                api_secret: "secret".into(),
            },
            BackendCall::ListGuilds,
        ]
    );
    assert_eq!(
        harness.store.snapshot(),
        StoredCredentials {
            server_url: Some("http://bot.local".into()),
            api_secret: Some("secret".into()),
        }
    );
}

#[tokio::test]
async fn empty_credentials_never_reach_connecting() {
    let pairs = [("", "secret"), ("http://bot.local", ""), ("  ", "  "), ("/", "x")];
    for (server_url, api_secret) in pairs {
        let mut harness = Harness::new(two_guilds());
        harness.session.handle(SessionEvent::ConnectRequested {
            server_url: server_url.into(),
            api_secret: api_secret.into(),
        });

        assert_eq!(
            harness.session.connection().state(),
            ConnectionState::Disconnected,
            "pair ({server_url:?}, {api_secret:?})"
        );
        assert!(harness.backend.calls().is_empty());
        assert_eq!(
            harness.notification_text().as_deref(),
            Some("Please enter a server URL and an API secret")
        );
    }
}

#[tokio::test]
async fn failed_connect_returns_to_disconnected() {
    let mut harness = Harness::new(FakeBackend::new().failing_guilds("HTTP 401: Unauthorized"));
    harness.connect().await;

    assert_eq!(harness.session.connection().state(), ConnectionState::Disconnected);
    assert!(harness.session.connection().connect_enabled());
    assert_eq!(
        harness.notification_text().as_deref(),
        Some("Connection error: HTTP 401: Unauthorized")
    );
    assert_eq!(harness.store.snapshot(), StoredCredentials::default());
}

#[tokio::test]
async fn missing_guild_collection_is_a_connection_error() {
    let mut harness = Harness::new(FakeBackend::new());
    harness.connect().await;

    assert_eq!(harness.session.connection().state(), ConnectionState::Disconnected);
    assert_eq!(
        harness.notification_text().as_deref(),
        Some("Connection error: Invalid server response")
    );
}

#[tokio::test]
async fn second_connect_while_connecting_is_rejected() {
    let mut harness = Harness::new(two_guilds());
    let request = SessionEvent::ConnectRequested {
        server_url: "http://bot.local".into(),
        api_secret: "secret".into(),
    };
    harness.session.handle(request.clone());
    harness.session.handle(request);

    assert_eq!(
        harness.notification_text().as_deref(),
        Some("A connection attempt is already in progress")
    );
    harness
        .settle_until(|event| matches!(event, SessionEvent::ConnectFinished { .. }))
        .await;
    assert_eq!(
        harness
            .backend
            .count(|call| matches!(call, BackendCall::SetApiConfig { .. })),
        1
    );
}

#[tokio::test]
async fn connect_expand_select_and_send_scenario() {
    let mut harness = Harness::new(two_guilds());
    harness.connect().await;
    assert_eq!(harness.session.connection().state(), ConnectionState::Connected);

    let alpha = ServerId::new("gA");
    harness.session.handle(SessionEvent::ServerToggled(alpha.clone()));
    assert_eq!(
        harness.session.navigation().channels(&alpha),
        Some(&ChannelPanel::Loading)
    );
    harness.settle_until(is_channels_loaded).await;
    assert!(matches!(
        harness.session.navigation().channels(&alpha),
        Some(ChannelPanel::Loaded(channels)) if channels.len() == 2
    ));

    harness.session.handle(SessionEvent::ServerToggled(alpha.clone()));
    assert_eq!(harness.session.navigation().expanded(), None);
    assert_eq!(
        harness
            .backend
            .count(|call| matches!(call, BackendCall::ListChannels(_))),
        1
    );

    harness.session.handle(SessionEvent::ChannelSelected {
        server_id: alpha.clone(),
        channel_id: ChannelId::new("chan1"),
        channel_name: "general".into(),
    });
    harness.session.handle(SessionEvent::UserSelected {
        user_id: UserId::new("u1"),
        username: "alice".into(),
        display_name: "Alice".into(),
    });
    assert_eq!(
        harness.session.target().current(),
        &Target::User {
            user_id: UserId::new("u1"),
            username: "alice".into(),
            display_name: "Alice".into(),
        }
    );

    harness
        .session
        .handle(SessionEvent::SimpleTextChanged("hello".into()));
    harness.session.handle(SessionEvent::SendSimpleRequested);
    assert!(!harness.session.composer().simple_send_enabled());
    harness
        .settle_until(|event| matches!(event, SessionEvent::SimpleSendFinished(_)))
        .await;

    let sent = harness
        .backend
        .calls()
        .into_iter()
        .find_map(|call| match call {
            BackendCall::SendSimple(message) => Some(message),
            _ => None,
        })
        .expect("simple send issued");
    assert_eq!(
        sent,
        SimpleMessage {
            channel_id: None,
            user_id: Some(UserId::new("u1")),
            message: "hello".into(),
        }
    );
    assert_eq!(harness.session.composer().simple_text(), "");
    assert!(harness.session.composer().simple_send_enabled());
    assert_eq!(harness.notification_text().as_deref(), Some(MESSAGE_SENT));
}

#[tokio::test]
async fn empty_messages_never_call_the_backend() {
    let mut harness = Harness::new(two_guilds());
    harness.connect().await;
    harness.session.handle(SessionEvent::ChannelSelected {
        server_id: ServerId::new("gA"),
        channel_id: ChannelId::new("chan1"),
        channel_name: "general".into(),
    });

    harness.session.handle(SessionEvent::SimpleTextChanged(String::new()));
    harness.session.handle(SessionEvent::SendSimpleRequested);
    assert_eq!(
        harness.notification_text().as_deref(),
        Some("Please enter a message")
    );

    harness.session.handle(SessionEvent::EmbedInputChanged {
        input: EmbedInput::Title,
        value: String::new(),
    });
    harness.session.handle(SessionEvent::SendEmbedRequested);

    assert_eq!(
        harness.backend.count(|call| matches!(
            call,
            BackendCall::SendSimple(_) | BackendCall::SendEmbed(_)
        )),
        0
    );
}

#[tokio::test]
async fn footer_only_embed_is_rejected_and_draft_kept() {
    let mut harness = Harness::new(two_guilds());
    harness.connect().await;
    harness.session.handle(SessionEvent::UserSelected {
        user_id: UserId::new("u1"),
        username: "alice".into(),
        display_name: String::new(),
    });
    harness.session.handle(SessionEvent::EmbedInputChanged {
        input: EmbedInput::FooterText,
        value: "footer only".into(),
    });
    let before = harness.session.composer().draft().clone();

    harness.session.handle(SessionEvent::SendEmbedRequested);

    assert_eq!(harness.session.composer().draft(), &before);
    assert_eq!(
        harness.notification_text().as_deref(),
        Some("Please enter at least a title or a description")
    );
    assert_eq!(
        harness
            .backend
            .count(|call| matches!(call, BackendCall::SendEmbed(_))),
        0
    );
}

#[tokio::test]
async fn sending_without_target_or_connection_is_rejected() {
    let mut harness = Harness::new(two_guilds());
    harness
        .session
        .handle(SessionEvent::SimpleTextChanged("hi".into()));
    harness.session.handle(SessionEvent::SendSimpleRequested);
    assert_eq!(
        harness.notification_text().as_deref(),
        Some("Please select a channel or a user")
    );

    harness.session.handle(SessionEvent::ChannelSelected {
        server_id: ServerId::new("gA"),
        channel_id: ChannelId::new("chan1"),
        channel_name: "general".into(),
    });
    harness.session.handle(SessionEvent::SendSimpleRequested);
    assert_eq!(
        harness.notification_text().as_deref(),
        Some("Not connected to the bot server")
    );
    assert!(harness.backend.calls().is_empty());
}

#[tokio::test]
async fn successful_embed_clears_draft_and_keeps_color() {
    let mut harness = Harness::new(two_guilds());
    harness.connect().await;
    harness.session.handle(SessionEvent::ChannelSelected {
        server_id: ServerId::new("gA"),
        channel_id: ChannelId::new("chan1"),
        channel_name: "general".into(),
    });
    harness
        .session
        .handle(SessionEvent::EmbedColorSelected(EmbedColor::Red));
    harness.session.handle(SessionEvent::EmbedInputChanged {
        input: EmbedInput::Title,
        value: "Deploy".into(),
    });
    harness.session.handle(SessionEvent::EmbedFieldAdded {
        name: "Env".into(),
        value: "prod".into(),
        inline: true,
    });
    harness.session.handle(SessionEvent::SendEmbedRequested);
    harness
        .settle_until(|event| matches!(event, SessionEvent::EmbedSendFinished(_)))
        .await;

    let sent = harness
        .backend
        .calls()
        .into_iter()
        .find_map(|call| match call {
            BackendCall::SendEmbed(message) => Some(message),
            _ => None,
        })
        .expect("embed send issued");
    assert_eq!(sent.channel_id, Some(ChannelId::new("chan1")));
    assert_eq!(sent.embed_data.color, "#ED4245");
    assert_eq!(sent.embed_data.fields.len(), 1);

    assert_eq!(harness.session.composer().draft(), &EmbedDraft::default());
    assert_eq!(harness.session.composer().color(), EmbedColor::Red);
    assert_eq!(harness.notification_text().as_deref(), Some(EMBED_SENT));
}

#[tokio::test]
async fn failed_send_keeps_input_and_reports_backend_error() {
    let mut harness = Harness::new(two_guilds());
    harness.connect().await;
    harness.backend.set_send_failure(Some("HTTP 500: boom"));
    harness.session.handle(SessionEvent::ChannelSelected {
        server_id: ServerId::new("gA"),
        channel_id: ChannelId::new("chan1"),
        channel_name: "general".into(),
    });
    harness
        .session
        .handle(SessionEvent::SimpleTextChanged("retry me".into()));
    harness.session.handle(SessionEvent::SendSimpleRequested);
    harness
        .settle_until(|event| matches!(event, SessionEvent::SimpleSendFinished(_)))
        .await;

    assert_eq!(harness.session.composer().simple_text(), "retry me");
    assert!(harness.session.composer().simple_send_enabled());
    assert_eq!(
        harness.notification_text().as_deref(),
        Some("Failed to send: HTTP 500: boom")
    );
}

#[tokio::test]
async fn server_toggle_is_ignored_while_disconnected() {
    let mut harness = Harness::new(two_guilds());
    harness
        .session
        .handle(SessionEvent::ServerToggled(ServerId::new("gA")));

    assert_eq!(harness.session.navigation().expanded(), None);
    assert!(harness.backend.calls().is_empty());
}

#[tokio::test]
async fn failed_channel_fetch_is_scoped_and_refetched() {
    let backend = FakeBackend::new()
        .with_guilds(vec![server("gA", "Alpha")])
        .failing_channels("gA", "HTTP 404: Unknown guild");
    let mut harness = Harness::new(backend);
    harness.connect().await;
    let alpha = ServerId::new("gA");

    harness.session.handle(SessionEvent::ServerToggled(alpha.clone()));
    harness.settle_until(is_channels_loaded).await;
    assert_eq!(
        harness.session.navigation().channels(&alpha),
        Some(&ChannelPanel::Failed(
            "Failed to load channels: HTTP 404: Unknown guild".into()
        ))
    );

    harness.session.handle(SessionEvent::ServerToggled(alpha.clone()));
    harness.session.handle(SessionEvent::ServerToggled(alpha));
    harness.settle_until(is_channels_loaded).await;
    assert_eq!(
        harness
            .backend
            .count(|call| matches!(call, BackendCall::ListChannels(_))),
        2
    );
}

#[tokio::test]
async fn reconnect_discards_channel_response_from_previous_connection() {
    let mut harness = Harness::new(two_guilds());
    harness.connect().await;
    let alpha = ServerId::new("gA");

    harness.session.handle(SessionEvent::ServerToggled(alpha.clone()));
    let late = harness.next().await;
    assert!(is_channels_loaded(&late));

    harness.connect().await;
    assert_eq!(harness.session.navigation().expanded(), None);

    harness.session.handle(late);
    assert_eq!(harness.session.navigation().channels(&alpha), None);
}

#[tokio::test(start_paused = true)]
async fn burst_of_queries_issues_one_search_for_the_last_query() {
    let backend = two_guilds().with_users("alice", vec![user("u1", "alice", Some("Alice"))]);
    let mut harness = Harness::new(backend);
    harness.connect().await;

    for query in ["al", "ali", "alic", "alice"] {
        harness
            .session
            .handle(SessionEvent::SearchQueryChanged(query.into()));
        tokio::time::advance(Duration::from_millis(50)).await;
    }
    harness.settle_until(is_search_finished).await;

    let searches: Vec<_> = harness
        .backend
        .calls()
        .into_iter()
        .filter(|call| matches!(call, BackendCall::SearchUsers(_)))
        .collect();
    assert_eq!(searches, vec![BackendCall::SearchUsers("alice".into())]);
    assert!(matches!(
        harness.session.search().results(),
        SearchResults::Found(users) if users.len() == 1
    ));
}

#[tokio::test(start_paused = true)]
async fn stale_search_response_is_discarded() {
    let backend = two_guilds()
        .with_users("ali", vec![user("u9", "alison", None)])
        .delay_search("ali", Duration::from_secs(1))
        .with_users("alice", vec![user("u1", "alice", Some("Alice"))]);
    let mut harness = Harness::new(backend);
    harness.connect().await;

    harness
        .session
        .handle(SessionEvent::SearchQueryChanged("ali".into()));
    harness
        .settle_until(|event| matches!(event, SessionEvent::SearchDebounceElapsed { .. }))
        .await;
    harness
        .session
        .handle(SessionEvent::SearchQueryChanged("alice".into()));

    harness.settle_until(is_search_finished).await;
    let expected = SearchResults::Found(vec![user("u1", "alice", Some("Alice"))]);
    assert_eq!(harness.session.search().results(), &expected);

    harness.settle_until(is_search_finished).await;
    assert_eq!(harness.session.search().results(), &expected);
}

#[tokio::test(start_paused = true)]
async fn short_query_while_in_flight_never_repopulates_results() {
    let backend = two_guilds()
        .with_users("bob", vec![user("u2", "bob", None)])
        .delay_search("bob", Duration::from_secs(1));
    let mut harness = Harness::new(backend);
    harness.connect().await;

    harness
        .session
        .handle(SessionEvent::SearchQueryChanged("bob".into()));
    harness
        .settle_until(|event| matches!(event, SessionEvent::SearchDebounceElapsed { .. }))
        .await;
    assert_eq!(harness.session.search().results(), &SearchResults::Loading);

    harness
        .session
        .handle(SessionEvent::SearchQueryChanged("b".into()));
    harness.settle_until(is_search_finished).await;

    assert_eq!(harness.session.search().results(), &SearchResults::Idle);
}

#[tokio::test(start_paused = true)]
async fn search_while_disconnected_shows_not_connected() {
    let mut harness = Harness::new(two_guilds());
    harness
        .session
        .handle(SessionEvent::SearchQueryChanged("alice".into()));
    harness
        .settle_until(|event| matches!(event, SessionEvent::SearchDebounceElapsed { .. }))
        .await;

    assert_eq!(harness.session.search().results(), &SearchResults::NotConnected);
    assert!(harness.backend.calls().is_empty());
}

#[tokio::test]
async fn quit_marks_the_session_finished() {
    let mut harness = Harness::new(FakeBackend::new());
    assert!(!harness.session.should_quit());
    harness.session.handle(SessionEvent::Quit);
    assert!(harness.session.should_quit());
}
