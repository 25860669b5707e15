//! The single send target: a channel or a user, never both.

use shared::domain::{ChannelId, ServerId, UserId};

use crate::error::ValidationError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Target {
    #[default]
    None,
    Channel {
        server_id: ServerId,
        channel_id: ChannelId,
        channel_name: String,
    },
    User {
        user_id: UserId,
        username: String,
        display_name: String,
    },
}

impl Target {
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    pub fn channel_id(&self) -> Option<&ChannelId> {
        match self {
            Self::Channel { channel_id, .. } => Some(channel_id),
            _ => None,
        }
    }

    pub fn user_id(&self) -> Option<&UserId> {
        match self {
            Self::User { user_id, .. } => Some(user_id),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct TargetSelector {
    current: Target,
}

impl TargetSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select_channel(
        &mut self,
        server_id: ServerId,
        channel_id: ChannelId,
        channel_name: impl Into<String>,
    ) -> Result<(), ValidationError> {
        if server_id.is_empty() {
            return Err(ValidationError::EmptyId("server id"));
        }
        if channel_id.is_empty() {
            return Err(ValidationError::EmptyId("channel id"));
        }
        self.current = Target::Channel {
            server_id,
            channel_id,
            channel_name: channel_name.into(),
        };
        Ok(())
    }

    /// An empty `display_name` falls back to the username.
    pub fn select_user(
        &mut self,
        user_id: UserId,
        username: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Result<(), ValidationError> {
        if user_id.is_empty() {
            return Err(ValidationError::EmptyId("user id"));
        }
        let username = username.into();
        let display_name = display_name.into();
        let display_name = if display_name.trim().is_empty() {
            username.clone()
        } else {
            display_name
        };
        self.current = Target::User {
            user_id,
            username,
            display_name,
        };
        Ok(())
    }

    pub fn current(&self) -> &Target {
        &self.current
    }
}
