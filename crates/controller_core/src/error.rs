//! Failure taxonomy for the session core.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter a server URL and an API secret")]
    MissingCredentials,
    #[error("A connection attempt is already in progress")]
    ConnectInProgress,
    #[error("Please enter a message")]
    EmptyMessage,
    #[error("Please enter at least a title or a description")]
    EmptyEmbed,
    #[error("Please select a channel or a user")]
    NoTarget,
    #[error("Not connected to the bot server")]
    NotConnected,
    #[error("{0} must not be empty")]
    EmptyId(&'static str),
    #[error("Unknown server {0}")]
    UnknownServer(String),
    #[error("A message is already being sent")]
    SendInProgress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionFailureKind {
    Unreachable,
    Rejected,
    InvalidResponse,
    Other,
}

impl ConnectionFailureKind {
    pub fn classify(message: &str) -> Self {
        let lower = message.to_ascii_lowercase();
        if lower.contains("401")
            || lower.contains("403")
            || lower.contains("unauthorized")
            || lower.contains("forbidden")
            || lower.contains("invalid api secret")
        {
            Self::Rejected
        } else if lower.contains("invalid server response")
            || lower.contains("failed to parse json")
            || lower.contains("malformed")
        {
            Self::InvalidResponse
        } else if lower.contains("request failed")
            || lower.contains("connection refused")
            || lower.contains("dns")
            || lower.contains("timed out")
            || lower.contains("error sending request")
        {
            Self::Unreachable
        } else {
            Self::Other
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Unreachable => "unreachable",
            Self::Rejected => "rejected",
            Self::InvalidResponse => "invalid_response",
            Self::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchScope {
    Channels,
    UserSearch,
}

impl FetchScope {
    fn describe(self) -> &'static str {
        match self {
            Self::Channels => "Failed to load channels",
            Self::UserSearch => "User search failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Connection error: {message}")]
    Connection {
        kind: ConnectionFailureKind,
        message: String,
    },
    #[error("{}: {message}", scope.describe())]
    ScopedFetch { scope: FetchScope, message: String },
    #[error("Failed to send: {0}")]
    Send(String),
}

impl ClientError {
    pub fn connection(err: impl std::fmt::Display) -> Self {
        let message = err.to_string();
        Self::Connection {
            kind: ConnectionFailureKind::classify(&message),
            message,
        }
    }

    pub fn scoped(scope: FetchScope, err: impl std::fmt::Display) -> Self {
        Self::ScopedFetch {
            scope,
            message: err.to_string(),
        }
    }

    pub fn send(err: impl std::fmt::Display) -> Self {
        Self::Send(err.to_string())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
