//! The bot backend as seen by the session core.

use anyhow::Result;
use async_trait::async_trait;
use shared::{
    domain::{ServerId, User},
    protocol::{ApiAck, ChannelListResponse, EmbedMessage, GuildListResponse, SimpleMessage},
};

#[async_trait]
pub trait BotBackend: Send + Sync {
    async fn set_api_config(&self, server_url: &str, api_secret: &str) -> Result<ApiAck>;
    async fn list_guilds(&self) -> Result<GuildListResponse>;
    async fn list_channels(&self, server_id: &ServerId) -> Result<ChannelListResponse>;
    async fn search_users(&self, query: &str) -> Result<Vec<User>>;
    async fn send_simple_message(&self, message: &SimpleMessage) -> Result<ApiAck>;
    async fn send_embed_message(&self, message: &EmbedMessage) -> Result<ApiAck>;
}
