//! In-memory backend for component and session tests.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use shared::{
    domain::{Channel, ChannelId, Server, ServerId, User, UserId},
    protocol::{ApiAck, ChannelListResponse, EmbedMessage, GuildListResponse, SimpleMessage},
};

use crate::backend::BotBackend;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum BackendCall {
    SetApiConfig { server_url: String, api_secret: String },
    ListGuilds,
    ListChannels(ServerId),
    SearchUsers(String),
    SendSimple(SimpleMessage),
    SendEmbed(EmbedMessage),
}

#[derive(Default)]
pub(crate) struct FakeBackend {
    guilds: Mutex<Option<Result<GuildListResponse, String>>>,
    config_failure: Mutex<Option<String>>,
    channels: Mutex<HashMap<ServerId, Result<ChannelListResponse, String>>>,
    users: Mutex<HashMap<String, Result<Vec<User>, String>>>,
    search_delays: Mutex<HashMap<String, Duration>>,
    send_failure: Mutex<Option<String>>,
    calls: Mutex<Vec<BackendCall>>,
}

pub(crate) fn server(id: &str, name: &str) -> Server {
    Server {
        id: ServerId::new(id),
        name: name.to_string(),
        icon: None,
    }
}

pub(crate) fn channel(id: &str, name: &str) -> Channel {
    Channel {
        id: ChannelId::new(id),
        name: name.to_string(),
    }
}

pub(crate) fn user(id: &str, username: &str, display_name: Option<&str>) -> User {
    User {
        id: UserId::new(id),
        username: username.to_string(),
        display_name: display_name.map(str::to_string),
        avatar: None,
    }
}

impl FakeBackend {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn with_guilds(self: Arc<Self>, guilds: Vec<Server>) -> Arc<Self> {
        *self.guilds.lock().expect("lock") = Some(Ok(GuildListResponse {
            guilds: Some(guilds),
        }));
        self
    }

    pub(crate) fn with_guild_response(self: Arc<Self>, response: GuildListResponse) -> Arc<Self> {
        *self.guilds.lock().expect("lock") = Some(Ok(response));
        self
    }

    pub(crate) fn failing_guilds(self: Arc<Self>, message: &str) -> Arc<Self> {
        *self.guilds.lock().expect("lock") = Some(Err(message.to_string()));
        self
    }

    pub(crate) fn failing_config(self: Arc<Self>, message: &str) -> Arc<Self> {
        *self.config_failure.lock().expect("lock") = Some(message.to_string());
        self
    }

    pub(crate) fn with_channels(self: Arc<Self>, server_id: &str, channels: Vec<Channel>) -> Arc<Self> {
        self.channels.lock().expect("lock").insert(
            ServerId::new(server_id),
            Ok(ChannelListResponse {
                channels: Some(channels),
            }),
        );
        self
    }

    pub(crate) fn failing_channels(self: Arc<Self>, server_id: &str, message: &str) -> Arc<Self> {
        self.channels
            .lock()
            .expect("lock")
            .insert(ServerId::new(server_id), Err(message.to_string()));
        self
    }

    pub(crate) fn with_users(self: Arc<Self>, query: &str, users: Vec<User>) -> Arc<Self> {
        self.users
            .lock()
            .expect("lock")
            .insert(query.to_string(), Ok(users));
        self
    }

    pub(crate) fn failing_search(self: Arc<Self>, query: &str, message: &str) -> Arc<Self> {
        self.users
            .lock()
            .expect("lock")
            .insert(query.to_string(), Err(message.to_string()));
        self
    }

    pub(crate) fn delay_search(self: Arc<Self>, query: &str, delay: Duration) -> Arc<Self> {
        self.search_delays
            .lock()
            .expect("lock")
            .insert(query.to_string(), delay);
        self
    }

    pub(crate) fn set_send_failure(&self, message: Option<&str>) {
        *self.send_failure.lock().expect("lock") = message.map(str::to_string);
    }

    pub(crate) fn calls(&self) -> Vec<BackendCall> {
        self.calls.lock().expect("lock").clone()
    }

    pub(crate) fn count(&self, predicate: impl Fn(&BackendCall) -> bool) -> usize {
        self.calls
            .lock()
            .expect("lock")
            .iter()
            .filter(|call| predicate(call))
            .count()
    }

    fn record(&self, call: BackendCall) {
        self.calls.lock().expect("lock").push(call);
    }
}

#[async_trait]
impl BotBackend for FakeBackend {
    async fn set_api_config(&self, server_url: &str, api_secret: &str) -> Result<ApiAck> {
        self.record(BackendCall::SetApiConfig {
            server_url: server_url.to_string(),
            api_secret: api_secret.to_string(),
        });
        if let Some(message) = self.config_failure.lock().expect("lock").clone() {
            return Err(anyhow!(message));
        }
        Ok(ApiAck::ok("API configuration set successfully", None))
    }

    async fn list_guilds(&self) -> Result<GuildListResponse> {
        self.record(BackendCall::ListGuilds);
        match self.guilds.lock().expect("lock").clone() {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(anyhow!(message)),
            None => Ok(GuildListResponse { guilds: None }),
        }
    }

    async fn list_channels(&self, server_id: &ServerId) -> Result<ChannelListResponse> {
        self.record(BackendCall::ListChannels(server_id.clone()));
        match self.channels.lock().expect("lock").get(server_id).cloned() {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(anyhow!(message)),
            None => Ok(ChannelListResponse { channels: None }),
        }
    }

    async fn search_users(&self, query: &str) -> Result<Vec<User>> {
        self.record(BackendCall::SearchUsers(query.to_string()));
        let delay = self.search_delays.lock().expect("lock").get(query).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match self.users.lock().expect("lock").get(query).cloned() {
            Some(Ok(users)) => Ok(users),
            Some(Err(message)) => Err(anyhow!(message)),
            None => Ok(Vec::new()),
        }
    }

    async fn send_simple_message(&self, message: &SimpleMessage) -> Result<ApiAck> {
        self.record(BackendCall::SendSimple(message.clone()));
        if let Some(failure) = self.send_failure.lock().expect("lock").clone() {
            return Err(anyhow!(failure));
        }
        Ok(ApiAck::ok("Message sent successfully", None))
    }

    async fn send_embed_message(&self, message: &EmbedMessage) -> Result<ApiAck> {
        self.record(BackendCall::SendEmbed(message.clone()));
        if let Some(failure) = self.send_failure.lock().expect("lock").clone() {
            return Err(anyhow!(failure));
        }
        Ok(ApiAck::ok("Embed message sent successfully", None))
    }
}
