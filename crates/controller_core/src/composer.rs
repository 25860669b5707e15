//! Draft state, validation and payload assembly for simple and embed messages.

use std::{fmt, str::FromStr};

use chrono::{DateTime, SecondsFormat, Utc};
use shared::{
    domain::{ChannelId, UserId},
    protocol::{
        ApiAck, EmbedAuthor, EmbedData, EmbedField, EmbedFooter, EmbedMessage, EmbedUrl,
        SimpleMessage,
    },
};

use crate::{
    backend::BotBackend,
    error::{ClientError, ValidationError},
    target::Target,
};

pub const PREVIEW_TITLE_PLACEHOLDER: &str = "Embed Title";
pub const PREVIEW_DESCRIPTION_PLACEHOLDER: &str = "Embed Description";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ComposerTab {
    #[default]
    Simple,
    Embed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EmbedColor {
    #[default]
    Blurple,
    Green,
    Yellow,
    Fuchsia,
    Red,
    White,
    Black,
}

impl EmbedColor {
    pub const ALL: [EmbedColor; 7] = [
        Self::Blurple,
        Self::Green,
        Self::Yellow,
        Self::Fuchsia,
        Self::Red,
        Self::White,
        Self::Black,
    ];

    pub fn hex(self) -> &'static str {
        match self {
            Self::Blurple => "#5865F2",
            Self::Green => "#57F287",
            Self::Yellow => "#FEE75C",
            Self::Fuchsia => "#EB459E",
            Self::Red => "#ED4245",
            Self::White => "#FFFFFF",
            Self::Black => "#23272A",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Blurple => "blurple",
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Fuchsia => "fuchsia",
            Self::Red => "red",
            Self::White => "white",
            Self::Black => "black",
        }
    }
}

impl fmt::Display for EmbedColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.hex())
    }
}

impl FromStr for EmbedColor {
    type Err = String;

    /// Accepts a palette name or its hex code, case-insensitively.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|color| {
                color.name().eq_ignore_ascii_case(value) || color.hex().eq_ignore_ascii_case(value)
            })
            .ok_or_else(|| format!("unknown embed color '{value}'"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedInput {
    Title,
    Description,
    ThumbnailUrl,
    ImageUrl,
    FooterText,
    AuthorName,
}

impl FromStr for EmbedInput {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "title" => Ok(Self::Title),
            "description" | "desc" => Ok(Self::Description),
            "thumbnail" => Ok(Self::ThumbnailUrl),
            "image" => Ok(Self::ImageUrl),
            "footer" => Ok(Self::FooterText),
            "author" => Ok(Self::AuthorName),
            other => Err(format!("unknown embed input '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmbedDraft {
    pub title: String,
    pub description: String,
    pub thumbnail_url: String,
    pub image_url: String,
    pub footer_text: String,
    pub author_name: String,
    pub fields: Vec<EmbedField>,
}

impl EmbedDraft {
    pub fn set(&mut self, input: EmbedInput, value: String) {
        let slot = match input {
            EmbedInput::Title => &mut self.title,
            EmbedInput::Description => &mut self.description,
            EmbedInput::ThumbnailUrl => &mut self.thumbnail_url,
            EmbedInput::ImageUrl => &mut self.image_url,
            EmbedInput::FooterText => &mut self.footer_text,
            EmbedInput::AuthorName => &mut self.author_name,
        };
        *slot = value;
    }

    pub fn has_body(&self) -> bool {
        !self.title.trim().is_empty() || !self.description.trim().is_empty()
    }

    fn to_embed_data(&self, color: EmbedColor, sent_at: DateTime<Utc>) -> EmbedData {
        EmbedData {
            title: non_empty(&self.title),
            description: non_empty(&self.description),
            color: color.hex().to_string(),
            thumbnail: non_empty(&self.thumbnail_url).map(|url| EmbedUrl { url }),
            image: non_empty(&self.image_url).map(|url| EmbedUrl { url }),
            footer: non_empty(&self.footer_text).map(|text| EmbedFooter { text }),
            author: non_empty(&self.author_name).map(|name| EmbedAuthor { name }),
            fields: self
                .fields
                .iter()
                .filter(|field| !field.name.trim().is_empty() && !field.value.trim().is_empty())
                .cloned()
                .collect(),
            timestamp: sent_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedPreview {
    pub title: String,
    pub description: String,
    pub color: EmbedColor,
}

#[derive(Debug, Default)]
pub struct Composer {
    tab: ComposerTab,
    simple_text: String,
    draft: EmbedDraft,
    color: EmbedColor,
    simple_in_flight: bool,
    embed_in_flight: bool,
}

/// Both sends require a target and a live connection; the target is checked first.
fn gate(
    connected: bool,
    target: &Target,
) -> Result<(Option<ChannelId>, Option<UserId>), ValidationError> {
    if target.is_none() {
        return Err(ValidationError::NoTarget);
    }
    if !connected {
        return Err(ValidationError::NotConnected);
    }
    Ok((target.channel_id().cloned(), target.user_id().cloned()))
}

impl Composer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tab(&self) -> ComposerTab {
        self.tab
    }

    pub fn select_tab(&mut self, tab: ComposerTab) {
        self.tab = tab;
    }

    pub fn simple_text(&self) -> &str {
        &self.simple_text
    }

    pub fn set_simple_text(&mut self, text: impl Into<String>) {
        self.simple_text = text.into();
    }

    pub fn draft(&self) -> &EmbedDraft {
        &self.draft
    }

    pub fn set_embed_input(&mut self, input: EmbedInput, value: impl Into<String>) {
        self.draft.set(input, value.into());
    }

    pub fn add_embed_field(&mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) {
        self.draft.fields.push(EmbedField {
            name: name.into(),
            value: value.into(),
            inline,
        });
    }

    pub fn clear_embed_fields(&mut self) {
        self.draft.fields.clear();
    }

    pub fn color(&self) -> EmbedColor {
        self.color
    }

    pub fn select_color(&mut self, color: EmbedColor) {
        self.color = color;
    }

    pub fn simple_send_enabled(&self) -> bool {
        !self.simple_in_flight
    }

    pub fn embed_send_enabled(&self) -> bool {
        !self.embed_in_flight
    }

    pub fn preview(&self) -> EmbedPreview {
        let or_placeholder = |value: &str, placeholder: &str| {
            if value.is_empty() {
                placeholder.to_string()
            } else {
                value.to_string()
            }
        };
        EmbedPreview {
            title: or_placeholder(&self.draft.title, PREVIEW_TITLE_PLACEHOLDER),
            description: or_placeholder(&self.draft.description, PREVIEW_DESCRIPTION_PLACEHOLDER),
            color: self.color,
        }
    }

    /// Validates and marks a simple send as in flight.
    pub fn begin_simple(
        &mut self,
        connected: bool,
        target: &Target,
    ) -> Result<SimpleMessage, ClientError> {
        if self.simple_in_flight {
            return Err(ValidationError::SendInProgress.into());
        }
        let text = self.simple_text.trim();
        if text.is_empty() {
            return Err(ValidationError::EmptyMessage.into());
        }
        let (channel_id, user_id) = gate(connected, target)?;
        let message = SimpleMessage {
            channel_id,
            user_id,
            message: text.to_string(),
        };
        self.simple_in_flight = true;
        Ok(message)
    }

    /// Clears the input on success; a failure leaves it for retry.
    pub fn finish_simple(
        &mut self,
        result: Result<ApiAck, ClientError>,
    ) -> Result<ApiAck, ClientError> {
        self.simple_in_flight = false;
        if result.is_ok() {
            self.simple_text.clear();
        }
        result
    }

    /// Validates and marks an embed send as in flight. `sent_at` becomes the embed timestamp.
    pub fn begin_embed(
        &mut self,
        connected: bool,
        target: &Target,
        sent_at: DateTime<Utc>,
    ) -> Result<EmbedMessage, ClientError> {
        if self.embed_in_flight {
            return Err(ValidationError::SendInProgress.into());
        }
        if !self.draft.has_body() {
            return Err(ValidationError::EmptyEmbed.into());
        }
        let (channel_id, user_id) = gate(connected, target)?;
        let message = EmbedMessage {
            channel_id,
            user_id,
            embed_data: self.draft.to_embed_data(self.color, sent_at),
        };
        self.embed_in_flight = true;
        Ok(message)
    }

    /// Clears the draft on success, keeping the selected color.
    pub fn finish_embed(
        &mut self,
        result: Result<ApiAck, ClientError>,
    ) -> Result<ApiAck, ClientError> {
        self.embed_in_flight = false;
        if result.is_ok() {
            self.draft = EmbedDraft::default();
        }
        result
    }
}

pub async fn dispatch_simple(
    backend: &dyn BotBackend,
    message: &SimpleMessage,
) -> Result<ApiAck, ClientError> {
    backend
        .send_simple_message(message)
        .await
        .map_err(ClientError::send)
}

pub async fn dispatch_embed(
    backend: &dyn BotBackend,
    message: &EmbedMessage,
) -> Result<ApiAck, ClientError> {
    backend
        .send_embed_message(message)
        .await
        .map_err(ClientError::send)
}

#[cfg(test)]
#[path = "tests/composer_tests.rs"]
mod tests;
