//! Backend implementation over the bot's REST API.

use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Method};
use serde::Serialize;
use shared::{
    domain::{ServerId, User},
    protocol::{
        ApiAck, ChannelListResponse, EmbedMessage, GuildListResponse, SendEmbedRequest,
        SimpleMessage,
    },
};
use tokio::sync::RwLock;
use tracing::{debug, warn};
use url::Url;

use crate::backend::BotBackend;

const API_SECRET_HEADER: &str = "x-api-secret";

#[derive(Debug, Clone)]
struct ApiConfig {
    base: Url,
    api_secret: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ChannelMessageBody<'a> {
    channel_id: &'a str,
    message: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DirectMessageBody<'a> {
    user_id: &'a str,
    message: &'a str,
}

pub struct HttpBotBackend {
    http: Client,
    config: RwLock<Option<ApiConfig>>,
}

impl HttpBotBackend {
    pub fn new(request_timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(request_timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            config: RwLock::new(None),
        })
    }

    async fn config(&self) -> Result<ApiConfig> {
        self.config
            .read()
            .await
            .clone()
            .ok_or_else(|| anyhow!("API not configured. Please set server URL and API secret first."))
    }

    fn endpoint(base: &Url, segments: &[&str]) -> Result<Url> {
        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("server URL cannot be used as a base: {base}"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
    ) -> Result<serde_json::Value> {
        let config = self.config().await?;
        let url = Self::endpoint(&config.base, segments)?;
        debug!(%method, %url, "bot api request");

        let mut request = self
            .http
            .request(method, url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header(API_SECRET_HEADER, &config.api_secret);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|err| anyhow!("Request failed: {err}"))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            bail!("HTTP {status}: {error_text}");
        }

        response
            .json()
            .await
            .map_err(|err| anyhow!("Failed to parse JSON: {err}"))
    }
}

#[async_trait]
impl BotBackend for HttpBotBackend {
    async fn set_api_config(&self, server_url: &str, api_secret: &str) -> Result<ApiAck> {
        let trimmed = server_url.trim_end_matches('/');
        let base = Url::parse(trimmed).with_context(|| format!("invalid server URL '{trimmed}'"))?;
        if base.cannot_be_a_base() {
            bail!("invalid server URL '{trimmed}'");
        }

        *self.config.write().await = Some(ApiConfig {
            base,
            api_secret: api_secret.to_string(),
        });
        Ok(ApiAck::ok("API configuration set successfully", None))
    }

    async fn list_guilds(&self) -> Result<GuildListResponse> {
        let value = self
            .request::<()>(Method::GET, &["api", "servers"], None)
            .await?;
        serde_json::from_value(value).map_err(|err| anyhow!("Invalid server response: {err}"))
    }

    async fn list_channels(&self, server_id: &ServerId) -> Result<ChannelListResponse> {
        let value = self
            .request::<()>(Method::GET, &["api", "channels", server_id.as_str()], None)
            .await?;
        serde_json::from_value(value).map_err(|err| anyhow!("Invalid channel response: {err}"))
    }

    async fn search_users(&self, query: &str) -> Result<Vec<User>> {
        let value = self
            .request::<()>(Method::GET, &["api", "users", "search", query], None)
            .await?;
        if !value.is_array() {
            warn!(query, "user search response is not an array; treating as empty");
            return Ok(Vec::new());
        }
        serde_json::from_value(value).map_err(|err| anyhow!("Invalid user search response: {err}"))
    }

    async fn send_simple_message(&self, message: &SimpleMessage) -> Result<ApiAck> {
        let response = match (&message.channel_id, &message.user_id) {
            (Some(channel_id), _) => {
                let body = ChannelMessageBody {
                    channel_id: channel_id.as_str(),
                    message: &message.message,
                };
                self.request(Method::POST, &["api", "send-message"], Some(&body))
                    .await?
            }
            (None, Some(user_id)) => {
                let body = DirectMessageBody {
                    user_id: user_id.as_str(),
                    message: &message.message,
                };
                self.request(Method::POST, &["api", "send-dm"], Some(&body))
                    .await?
            }
            (None, None) => bail!("Either channel_id or user_id must be provided"),
        };
        Ok(ApiAck::ok("Message sent successfully", Some(response)))
    }

    async fn send_embed_message(&self, message: &EmbedMessage) -> Result<ApiAck> {
        if message.channel_id.is_none() && message.user_id.is_none() {
            bail!("Either channel_id or user_id must be provided");
        }
        let body = SendEmbedRequest::from(message);
        let response = self
            .request(Method::POST, &["api", "send-embed"], Some(&body))
            .await?;
        Ok(ApiAck::ok("Embed message sent successfully", Some(response)))
    }
}

#[cfg(test)]
#[path = "tests/http_tests.rs"]
mod tests;
