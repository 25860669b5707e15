//! Everything the session reacts to: user intents, backend completions and timer ticks.

use shared::{
    domain::{ChannelId, Server, ServerId, User, UserId},
    protocol::{ApiAck, ChannelListResponse},
};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

use crate::{
    composer::{ComposerTab, EmbedColor, EmbedInput},
    connection::Credentials,
    error::ClientError,
    navigation::ChannelFetch,
};

pub type EventSender = UnboundedSender<SessionEvent>;
pub type EventReceiver = UnboundedReceiver<SessionEvent>;

#[derive(Debug, Clone)]
pub enum SessionEvent {
    ConnectRequested {
        server_url: String,
        api_secret: String,
    },
    ServerToggled(ServerId),
    ChannelSelected {
        server_id: ServerId,
        channel_id: ChannelId,
        channel_name: String,
    },
    UserSelected {
        user_id: UserId,
        username: String,
        display_name: String,
    },
    SearchQueryChanged(String),
    ComposerTabSelected(ComposerTab),
    SimpleTextChanged(String),
    SendSimpleRequested,
    EmbedInputChanged {
        input: EmbedInput,
        value: String,
    },
    EmbedFieldAdded {
        name: String,
        value: String,
        inline: bool,
    },
    EmbedFieldsCleared,
    EmbedColorSelected(EmbedColor),
    SendEmbedRequested,
    Quit,

    ConnectFinished {
        credentials: Credentials,
        result: Result<Vec<Server>, ClientError>,
    },
    ChannelsLoaded {
        fetch: ChannelFetch,
        result: Result<ChannelListResponse, ClientError>,
    },
    SearchDebounceElapsed {
        ticket: u64,
    },
    SearchFinished {
        token: u64,
        result: Result<Vec<User>, ClientError>,
    },
    SimpleSendFinished(Result<ApiAck, ClientError>),
    EmbedSendFinished(Result<ApiAck, ClientError>),
    NotificationTimer {
        ticket: u64,
    },
}

impl SessionEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ConnectRequested { .. } => "connect_requested",
            Self::ServerToggled(_) => "server_toggled",
            Self::ChannelSelected { .. } => "channel_selected",
            Self::UserSelected { .. } => "user_selected",
            Self::SearchQueryChanged(_) => "search_query_changed",
            Self::ComposerTabSelected(_) => "composer_tab_selected",
            Self::SimpleTextChanged(_) => "simple_text_changed",
            Self::SendSimpleRequested => "send_simple_requested",
            Self::EmbedInputChanged { .. } => "embed_input_changed",
            Self::EmbedFieldAdded { .. } => "embed_field_added",
            Self::EmbedFieldsCleared => "embed_fields_cleared",
            Self::EmbedColorSelected(_) => "embed_color_selected",
            Self::SendEmbedRequested => "send_embed_requested",
            Self::Quit => "quit",
            Self::ConnectFinished { .. } => "connect_finished",
            Self::ChannelsLoaded { .. } => "channels_loaded",
            Self::SearchDebounceElapsed { .. } => "search_debounce_elapsed",
            Self::SearchFinished { .. } => "search_finished",
            Self::SimpleSendFinished(_) => "simple_send_finished",
            Self::EmbedSendFinished(_) => "embed_send_finished",
            Self::NotificationTimer { .. } => "notification_timer",
        }
    }
}
