//! Persistence of the connection form between runs.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use anyhow::{Context, Result};

use crate::connection::Credentials;

pub const SERVER_URL_KEY: &str = "discord_bot_server_url";
pub const API_SECRET_KEY: &str = "discord_bot_api_secret";

/// Whatever was saved last; either field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredCredentials {
    pub server_url: Option<String>,
    pub api_secret: Option<String>,
}

pub trait CredentialStore: Send + Sync {
    fn load(&self) -> Result<StoredCredentials>;
    fn save(&self, credentials: &Credentials) -> Result<()>;
}

pub struct JsonFileCredentialStore {
    path: PathBuf,
}

impl JsonFileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for JsonFileCredentialStore {
    fn load(&self) -> Result<StoredCredentials> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(StoredCredentials::default())
            }
            Err(err) => {
                return Err(err).with_context(|| {
                    format!("failed to read settings file '{}'", self.path.display())
                })
            }
        };
        let mut entries: BTreeMap<String, String> = serde_json::from_str(&raw)
            .with_context(|| format!("invalid settings file '{}'", self.path.display()))?;

        Ok(StoredCredentials {
            server_url: entries.remove(SERVER_URL_KEY).filter(|v| !v.is_empty()),
            api_secret: entries.remove(API_SECRET_KEY).filter(|v| !v.is_empty()),
        })
    }

    fn save(&self, credentials: &Credentials) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create settings directory '{}'", parent.display())
            })?;
        }
        let entries = BTreeMap::from([
            (SERVER_URL_KEY, credentials.server_url()),
            (API_SECRET_KEY, credentials.api_secret()),
        ]);
        let serialized = serde_json::to_string_pretty(&entries)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("failed to write settings file '{}'", self.path.display()))
    }
}

#[derive(Default)]
pub struct MemoryCredentialStore {
    saved: Mutex<StoredCredentials>,
}

impl MemoryCredentialStore {
    pub fn with(server_url: &str, api_secret: &str) -> Self {
        Self {
            saved: Mutex::new(StoredCredentials {
                server_url: Some(server_url.to_string()),
                api_secret: Some(api_secret.to_string()),
            }),
        }
    }

    pub fn snapshot(&self) -> StoredCredentials {
        self.saved
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<StoredCredentials> {
        Ok(self.snapshot())
    }

    fn save(&self, credentials: &Credentials) -> Result<()> {
        let mut guard = self
            .saved
            .lock()
            .map_err(|_| anyhow::anyhow!("credential store lock poisoned"))?;
        *guard = StoredCredentials {
            server_url: Some(credentials.server_url().to_string()),
            api_secret: Some(credentials.api_secret().to_string()),
        };
        Ok(())
    }
}
