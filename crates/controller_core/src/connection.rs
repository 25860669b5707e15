//! Connection lifecycle: Disconnected -> Connecting -> Connected, back to Disconnected on failure.

use shared::domain::Server;
use tracing::{info, warn};

use crate::{
    backend::BotBackend,
    error::{ClientError, ValidationError},
    settings_store::StoredCredentials,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    server_url: String,
    api_secret: String,
}

impl Credentials {
    /// Trims both inputs and strips one trailing `/` from the URL.
    pub fn new(server_url: &str, api_secret: &str) -> Result<Self, ValidationError> {
        let server_url = server_url.trim();
        let api_secret = api_secret.trim();
        let server_url = server_url.strip_suffix('/').unwrap_or(server_url);
        if server_url.is_empty() || api_secret.is_empty() {
            return Err(ValidationError::MissingCredentials);
        }
        Ok(Self {
            server_url: server_url.to_string(),
            api_secret: api_secret.to_string(),
        })
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    pub fn api_secret(&self) -> &str {
        &self.api_secret
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl ConnectionState {
    pub fn label(self) -> &'static str {
        match self {
            Self::Disconnected => "Not connected",
            Self::Connecting => "Connecting...",
            Self::Connected => "Connected",
        }
    }
}

/// Raw values of the connection form, as last typed or restored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionForm {
    pub server_url: String,
    pub api_secret: String,
}

#[derive(Debug, Default)]
pub struct ConnectionManager {
    state: ConnectionState,
    credentials: Option<Credentials>,
    form: ConnectionForm,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prefill(&mut self, stored: StoredCredentials) {
        if let Some(server_url) = stored.server_url {
            self.form.server_url = server_url;
        }
        if let Some(api_secret) = stored.api_secret {
            self.form.api_secret = api_secret;
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    pub fn connect_enabled(&self) -> bool {
        self.state != ConnectionState::Connecting
    }

    pub fn form(&self) -> &ConnectionForm {
        &self.form
    }

    /// Credentials of the last successful connection.
    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    /// Validates the form and moves to Connecting. Validation failures leave the state untouched.
    pub fn begin_connect(
        &mut self,
        server_url: &str,
        api_secret: &str,
    ) -> Result<Credentials, ClientError> {
        if self.state == ConnectionState::Connecting {
            return Err(ValidationError::ConnectInProgress.into());
        }
        self.form = ConnectionForm {
            server_url: server_url.to_string(),
            api_secret: api_secret.to_string(),
        };
        let credentials = Credentials::new(server_url, api_secret)?;
        self.state = ConnectionState::Connecting;
        info!(server_url = credentials.server_url(), "connecting to bot server");
        Ok(credentials)
    }

    pub fn finish_connect(
        &mut self,
        credentials: Credentials,
        result: Result<Vec<Server>, ClientError>,
    ) -> Result<Vec<Server>, ClientError> {
        if self.state != ConnectionState::Connecting {
            warn!(state = ?self.state, "connect result arrived outside of a connection attempt");
        }
        match result {
            Ok(servers) => {
                self.state = ConnectionState::Connected;
                info!(
                    server_url = credentials.server_url(),
                    servers = servers.len(),
                    "connected to bot server"
                );
                self.credentials = Some(credentials);
                Ok(servers)
            }
            Err(err) => {
                self.state = ConnectionState::Disconnected;
                if let ClientError::Connection { kind, message } = &err {
                    warn!(kind = kind.label(), "connection failed: {message}");
                }
                Err(err)
            }
        }
    }
}

/// Submits the credentials and fetches the guild list that proves the connection works.
pub async fn handshake(
    backend: &dyn BotBackend,
    credentials: &Credentials,
) -> Result<Vec<Server>, ClientError> {
    backend
        .set_api_config(credentials.server_url(), credentials.api_secret())
        .await
        .map_err(ClientError::connection)?;
    let response = backend
        .list_guilds()
        .await
        .map_err(ClientError::connection)?;
    response
        .guilds
        .ok_or_else(|| ClientError::connection("Invalid server response"))
}

#[cfg(test)]
#[path = "tests/connection_tests.rs"]
mod tests;
