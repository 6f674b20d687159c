//! Relay wire protocol: one JSON object per frame, no envelope.
//!
//! `{ "username", "avatarURL", "content", "userColor"? }`. Outbound frames never carry
//! `userColor`; inbound frames may.

use crate::relay::color::{ColorStyle, DisplayColor};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One chat or event line, in either direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayMessage {
    username: String,
    avatar_ref: String,
    content: String,
    color_tag: Option<String>,
}

impl RelayMessage {
    pub fn new(
        username: impl Into<String>,
        avatar_ref: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            avatar_ref: avatar_ref.into(),
            content: content.into(),
            color_tag: None,
        }
    }

    pub fn with_color_tag(mut self, tag: impl Into<String>) -> Self {
        self.color_tag = Some(tag.into());
        self
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Avatar URL, or empty when the sender has none.
    pub fn avatar_ref(&self) -> &str {
        &self.avatar_ref
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn color_tag(&self) -> Option<&str> {
        self.color_tag.as_deref()
    }

    /// Serialize to the text of one wire frame.
    pub fn to_wire(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&WirePayload {
            username: &self.username,
            avatar_url: &self.avatar_ref,
            content: &self.content,
            user_color: self.color_tag.as_deref(),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
}

/// Outbound frame. Field order is the serialized key order.
#[derive(Serialize)]
struct WirePayload<'a> {
    username: &'a str,
    #[serde(rename = "avatarURL")]
    avatar_url: &'a str,
    content: &'a str,
    #[serde(rename = "userColor", skip_serializing_if = "Option::is_none")]
    user_color: Option<&'a str>,
}

/// Inbound frame. Optional fields are taken loosely: a wrong type reads as absent.
#[derive(Deserialize)]
struct InboundPayload {
    username: String,
    content: String,
    #[serde(rename = "avatarURL", default)]
    avatar_url: Option<Value>,
    #[serde(rename = "userColor", default)]
    user_color: Option<Value>,
}

/// Encode a game-side line for the gateway.
pub fn encode_outbound(
    username: &str,
    avatar_ref: &str,
    content: &str,
) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(&WirePayload {
        username,
        avatar_url: avatar_ref,
        content,
        user_color: None,
    })
}

/// Decode one frame received from the gateway. Only `username` and `content` are required.
pub fn decode_inbound(bytes: &[u8]) -> Result<RelayMessage, DecodeError> {
    let payload: InboundPayload = serde_json::from_slice(bytes)
        .map_err(|e| DecodeError::MalformedPayload(e.to_string()))?;
    let avatar_ref = payload
        .avatar_url
        .as_ref()
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let color_tag = payload
        .user_color
        .as_ref()
        .and_then(Value::as_str)
        .map(str::to_string);
    Ok(RelayMessage {
        username: payload.username,
        avatar_ref,
        content: payload.content,
        color_tag,
    })
}

/// Renders inbound messages as `"<color>username<reset>: content"`.
#[derive(Debug, Clone, Copy)]
pub struct DisplayFormatter {
    pub style: ColorStyle,
    pub default_color: DisplayColor,
}

impl Default for DisplayFormatter {
    fn default() -> Self {
        Self {
            style: ColorStyle::Tagged,
            default_color: DisplayColor::DEFAULT,
        }
    }
}

impl DisplayFormatter {
    pub fn new(style: ColorStyle, default_color: DisplayColor) -> Self {
        Self {
            style,
            default_color,
        }
    }

    pub fn format(&self, message: &RelayMessage) -> String {
        let color = DisplayColor::resolve(message.color_tag(), self.default_color);
        format!(
            "{}{}{}: {}",
            self.style.paint(color),
            message.username(),
            self.style.reset(),
            message.content()
        )
    }
}

/// Format with tagged markers and the built-in default color.
pub fn format_for_display(message: &RelayMessage) -> String {
    DisplayFormatter::default().format(message)
}
