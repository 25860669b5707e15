//! Server list with a single expanded server and lazily loaded, per-server channel lists.

use std::collections::HashMap;

use shared::{
    domain::{Channel, Server, ServerId},
    protocol::ChannelListResponse,
};
use tracing::{debug, warn};

use crate::{
    backend::BotBackend,
    error::{ClientError, FetchScope, ValidationError},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelPanel {
    Loading,
    Loaded(Vec<Channel>),
    Failed(String),
}

/// A channel request that must be issued, tagged with the server list it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelFetch {
    pub server_id: ServerId,
    pub generation: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpandOutcome {
    Collapsed,
    Expanded { fetch: Option<ChannelFetch> },
}

#[derive(Debug, Default)]
pub struct NavigationState {
    servers: Vec<Server>,
    expanded: Option<ServerId>,
    channels: HashMap<ServerId, ChannelPanel>,
    generation: u64,
}

impl NavigationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the server list of a fresh connection; expansion and channel cache start over.
    pub fn replace_servers(&mut self, servers: Vec<Server>) {
        self.servers = servers;
        self.expanded = None;
        self.channels.clear();
        self.generation += 1;
    }

    pub fn servers(&self) -> &[Server] {
        &self.servers
    }

    pub fn server(&self, server_id: &ServerId) -> Option<&Server> {
        self.servers.iter().find(|server| &server.id == server_id)
    }

    pub fn expanded(&self) -> Option<&ServerId> {
        self.expanded.as_ref()
    }

    pub fn is_expanded(&self, server_id: &ServerId) -> bool {
        self.expanded.as_ref() == Some(server_id)
    }

    pub fn channels(&self, server_id: &ServerId) -> Option<&ChannelPanel> {
        self.channels.get(server_id)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Toggles `server_id`. Expanding replaces the previously expanded server in one step.
    pub fn expand(&mut self, server_id: &ServerId) -> Result<ExpandOutcome, ValidationError> {
        if server_id.is_empty() {
            return Err(ValidationError::EmptyId("server id"));
        }
        if self.server(server_id).is_none() {
            return Err(ValidationError::UnknownServer(server_id.to_string()));
        }

        if self.is_expanded(server_id) {
            self.expanded = None;
            return Ok(ExpandOutcome::Collapsed);
        }
        self.expanded = Some(server_id.clone());

        if matches!(self.channels.get(server_id), Some(ChannelPanel::Loaded(_))) {
            debug!(%server_id, "channel list served from cache");
            return Ok(ExpandOutcome::Expanded { fetch: None });
        }

        self.channels
            .insert(server_id.clone(), ChannelPanel::Loading);
        Ok(ExpandOutcome::Expanded {
            fetch: Some(ChannelFetch {
                server_id: server_id.clone(),
                generation: self.generation,
            }),
        })
    }

    /// Stores a channel response. Responses for an older server list are dropped.
    pub fn apply_channels(
        &mut self,
        fetch: ChannelFetch,
        result: Result<ChannelListResponse, ClientError>,
    ) -> bool {
        if fetch.generation != self.generation {
            debug!(
                server_id = %fetch.server_id,
                stale_generation = fetch.generation,
                "discarding channel list from previous connection"
            );
            return false;
        }

        let panel = match result {
            Ok(response) => ChannelPanel::Loaded(response.channels.unwrap_or_default()),
            Err(err) => {
                warn!(server_id = %fetch.server_id, "channel list failed: {err}");
                ChannelPanel::Failed(err.to_string())
            }
        };
        self.channels.insert(fetch.server_id, panel);
        true
    }
}

pub async fn fetch_channels(
    backend: &dyn BotBackend,
    server_id: &ServerId,
) -> Result<ChannelListResponse, ClientError> {
    backend
        .list_channels(server_id)
        .await
        .map_err(|err| ClientError::scoped(FetchScope::Channels, err))
}

#[cfg(test)]
#[path = "tests/navigation_tests.rs"]
mod tests;
