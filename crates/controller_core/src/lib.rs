//! Session core of the bot controller: connection, navigation, target selection, user search
//! and message composition, driven through a single event router.

pub mod backend;
pub mod composer;
pub mod config;
pub mod connection;
pub mod error;
pub mod events;
pub mod http;
pub mod navigation;
pub mod notifications;
pub mod runtime;
pub mod search;
pub mod session;
pub mod settings_store;
pub mod target;
pub mod timer;
pub mod view;

#[cfg(test)]
pub(crate) mod test_support;

pub use backend::BotBackend;
pub use config::{load_settings, ControllerSettings};
pub use error::{ClientError, ValidationError};
pub use events::{EventSender, SessionEvent};
pub use http::HttpBotBackend;
pub use runtime::{Presenter, SessionRuntime};
pub use session::Session;
pub use settings_store::{CredentialStore, JsonFileCredentialStore, MemoryCredentialStore};
pub use view::{render, SessionView};
