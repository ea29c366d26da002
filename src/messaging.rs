//! Request/response messages between the page, the editor and the background broker.

use crate::shortcut::ShortcutDefinition;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A message sent to the background broker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Request {
    GetShortcuts,
    /// Carries the raw list so the broker validates exactly what was sent.
    SaveShortcuts { shortcuts: Value },
}

impl Request {
    pub fn save_shortcuts(shortcuts: &[ShortcutDefinition]) -> Result<Self, serde_json::Error> {
        Ok(Request::SaveShortcuts {
            shortcuts: serde_json::to_value(shortcuts)?,
        })
    }
}

/// The broker's answer. Always determinate: failures carry `error`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shortcuts: Option<Vec<ShortcutDefinition>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Response {
    pub fn ok() -> Self {
        Self {
            success: true,
            shortcuts: None,
            error: None,
        }
    }

    pub fn with_shortcuts(shortcuts: Vec<ShortcutDefinition>) -> Self {
        Self {
            success: true,
            shortcuts: Some(shortcuts),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            shortcuts: None,
            error: Some(error.into()),
        }
    }
}

/// Errors delivering a message
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("no response from receiver")]
    NoResponse,
    #[error("channel closed: {0}")]
    Closed(String),
}

/// Something that answers broker requests.
pub trait MessageChannel {
    fn send(&self, request: &Request) -> Result<Response, ChannelError>;
}

/// Send a request, turning delivery errors into a failed response.
pub fn send_or_failure(channel: &dyn MessageChannel, request: &Request) -> Response {
    match channel.send(request) {
        Ok(response) => response,
        Err(e) => {
            log::warn!("Message delivery failed: {}", e);
            Response::failure(e.to_string())
        }
    }
}
