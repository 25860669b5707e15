//! Pure projection of the session into a view-model for presenters.
//!
//! Nothing here escapes or formats for a particular surface; presenters decide how text is shown.

use shared::domain::{Channel, ServerId, UserId};

use crate::{
    composer::{ComposerTab, EmbedColor, EmbedDraft, EmbedPreview},
    connection::ConnectionState,
    navigation::ChannelPanel,
    notifications::{NotificationKind, NotificationPhase},
    search::SearchResults,
    session::Session,
    target::Target,
};

pub const NO_CHANNELS: &str = "No channels found";
pub const NO_USERS: &str = "No users found";
pub const UNKNOWN_SERVER: &str = "Unknown server";
pub const NO_TARGET_TITLE: &str = "No target selected";
pub const NO_TARGET_HINT: &str = "Select a channel or a user to send messages";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    pub connection: ConnectionView,
    pub servers: Vec<ServerRow>,
    pub target: TargetHeader,
    pub search: SearchPanel,
    pub composer: ComposerView,
    pub notification: Option<NotificationView>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionView {
    pub state: ConnectionState,
    pub status: &'static str,
    pub connect_enabled: bool,
    pub server_url: String,
    pub api_secret: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerIcon {
    Image(String),
    Initial(char),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerRow {
    pub id: ServerId,
    pub name: String,
    pub icon: ServerIcon,
    pub expanded: bool,
    /// Present only for the expanded server.
    pub channels: Option<ChannelListView>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelListView {
    Loading,
    Empty,
    Channels(Vec<Channel>),
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetHeader {
    pub selected: bool,
    pub title: String,
    pub subtitle: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRow {
    pub id: UserId,
    pub username: String,
    pub label: String,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchPanel {
    Hidden,
    NotConnected,
    Loading,
    NoUsers,
    Users(Vec<UserRow>),
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposerView {
    pub tab: ComposerTab,
    pub simple_text: String,
    pub simple_send_enabled: bool,
    pub embed_send_enabled: bool,
    pub draft: EmbedDraft,
    pub color: EmbedColor,
    pub preview: EmbedPreview,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationView {
    pub kind: NotificationKind,
    pub title: &'static str,
    pub message: String,
    pub exiting: bool,
}

pub fn render(session: &Session) -> SessionView {
    SessionView {
        connection: connection_view(session),
        servers: server_rows(session),
        target: target_header(session),
        search: search_panel(session.search().results()),
        composer: composer_view(session),
        notification: session
            .notifications()
            .current()
            .map(|notification| NotificationView {
                kind: notification.kind,
                title: notification.kind.title(),
                message: notification.message.clone(),
                exiting: notification.phase == NotificationPhase::Exiting,
            }),
    }
}

fn connection_view(session: &Session) -> ConnectionView {
    let connection = session.connection();
    let form = connection.form();
    ConnectionView {
        state: connection.state(),
        status: connection.state().label(),
        connect_enabled: connection.connect_enabled(),
        server_url: form.server_url.clone(),
        api_secret: form.api_secret.clone(),
    }
}

fn server_icon(icon: Option<&str>, name: &str) -> ServerIcon {
    match icon.filter(|url| !url.trim().is_empty()) {
        Some(url) => ServerIcon::Image(url.to_string()),
        None => ServerIcon::Initial(
            name.trim()
                .chars()
                .next()
                .map(|initial| initial.to_uppercase().next().unwrap_or(initial))
                .unwrap_or('?'),
        ),
    }
}

fn server_rows(session: &Session) -> Vec<ServerRow> {
    let navigation = session.navigation();
    navigation
        .servers()
        .iter()
        .map(|server| {
            let expanded = navigation.is_expanded(&server.id);
            let channels = expanded.then(|| match navigation.channels(&server.id) {
                None | Some(ChannelPanel::Loading) => ChannelListView::Loading,
                Some(ChannelPanel::Loaded(channels)) if channels.is_empty() => {
                    ChannelListView::Empty
                }
                Some(ChannelPanel::Loaded(channels)) => ChannelListView::Channels(channels.clone()),
                Some(ChannelPanel::Failed(message)) => ChannelListView::Error(message.clone()),
            });
            ServerRow {
                id: server.id.clone(),
                name: server.name.clone(),
                icon: server_icon(server.icon.as_deref(), &server.name),
                expanded,
                channels,
            }
        })
        .collect()
}

fn target_header(session: &Session) -> TargetHeader {
    match session.target().current() {
        Target::None => TargetHeader {
            selected: false,
            title: NO_TARGET_TITLE.to_string(),
            subtitle: NO_TARGET_HINT.to_string(),
        },
        Target::Channel {
            server_id,
            channel_name,
            ..
        } => TargetHeader {
            selected: true,
            title: format!("# {channel_name}"),
            subtitle: session
                .navigation()
                .server(server_id)
                .map(|server| server.name.clone())
                .unwrap_or_else(|| UNKNOWN_SERVER.to_string()),
        },
        Target::User {
            username,
            display_name,
            ..
        } => TargetHeader {
            selected: true,
            title: display_name.clone(),
            subtitle: format!("Direct message to @{username}"),
        },
    }
}

fn search_panel(results: &SearchResults) -> SearchPanel {
    match results {
        SearchResults::Idle => SearchPanel::Hidden,
        SearchResults::NotConnected => SearchPanel::NotConnected,
        SearchResults::Loading => SearchPanel::Loading,
        SearchResults::Found(users) if users.is_empty() => SearchPanel::NoUsers,
        SearchResults::Found(users) => SearchPanel::Users(
            users
                .iter()
                .map(|user| UserRow {
                    id: user.id.clone(),
                    username: user.username.clone(),
                    label: user.label().to_string(),
                    avatar: user.avatar.clone(),
                })
                .collect(),
        ),
        SearchResults::Failed(message) => SearchPanel::Error(message.clone()),
    }
}

fn composer_view(session: &Session) -> ComposerView {
    let composer = session.composer();
    ComposerView {
        tab: composer.tab(),
        simple_text: composer.simple_text().to_string(),
        simple_send_enabled: composer.simple_send_enabled(),
        embed_send_enabled: composer.embed_send_enabled(),
        draft: composer.draft().clone(),
        color: composer.color(),
        preview: composer.preview(),
    }
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
