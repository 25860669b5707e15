use serde::{Deserialize, Serialize};

use crate::domain::{Channel, ChannelId, Server, UserId};

/// Body of `GET /api/servers`. A missing `guilds` field is a malformed response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildListResponse {
    #[serde(default)]
    pub guilds: Option<Vec<Server>>,
}

/// Body of `GET /api/channels/{server_id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelListResponse {
    #[serde(default)]
    pub channels: Option<Vec<Channel>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryKind {
    Channel,
    Dm,
}

/// Plain text message. Exactly one of `channel_id` / `user_id` is set when built by the composer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleMessage {
    pub channel_id: Option<ChannelId>,
    pub user_id: Option<UserId>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedUrl {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedFooter {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedAuthor {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub inline: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedData {
    pub title: Option<String>,
    pub description: Option<String>,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<EmbedUrl>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<EmbedUrl>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<EmbedFooter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<EmbedAuthor>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<EmbedField>,
    /// ISO-8601 UTC, captured when the send was requested.
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedMessage {
    pub channel_id: Option<ChannelId>,
    pub user_id: Option<UserId>,
    pub embed_data: EmbedData,
}

impl EmbedMessage {
    pub fn delivery_kind(&self) -> DeliveryKind {
        if self.channel_id.is_some() {
            DeliveryKind::Channel
        } else {
            DeliveryKind::Dm
        }
    }
}

/// Wire body of `POST /api/send-embed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendEmbedRequest {
    pub channel_id: Option<ChannelId>,
    pub user_id: Option<UserId>,
    pub embed_data: EmbedData,
    #[serde(rename = "type")]
    pub kind: DeliveryKind,
}

impl From<&EmbedMessage> for SendEmbedRequest {
    fn from(value: &EmbedMessage) -> Self {
        Self {
            channel_id: value.channel_id.clone(),
            user_id: value.user_id.clone(),
            embed_data: value.embed_data.clone(),
            kind: value.delivery_kind(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiAck {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl ApiAck {
    pub fn ok(message: impl Into<String>, data: Option<serde_json::Value>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data,
        }
    }
}
