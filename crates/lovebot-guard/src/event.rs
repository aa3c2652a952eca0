use lovebot_types::prelude::{ChatId, SenderId};

/// Who sent an inbound event, as far as the transport can tell us.
#[derive(Clone, Debug)]
pub struct Sender {
    pub id: SenderId,
    pub full_name: String,
    pub username: Option<String>,
}

impl Sender {
    pub fn new(id: SenderId, full_name: impl Into<String>) -> Self {
        Self {
            id,
            full_name: full_name.into(),
            username: None,
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// "Full Name (@handle, ID: 42)" for logs and operator alerts.
    pub fn describe(&self) -> String {
        format!(
            "{} (@{}, ID: {})",
            self.full_name,
            self.username.as_deref().unwrap_or("none"),
            self.id
        )
    }
}

/// One update delivered by the chat transport. The guard pipeline never
/// parses business payloads beyond command-prefix detection and the bounded
/// excerpt included in alerts.
#[derive(Clone, Debug)]
pub enum InboundEvent {
    Message {
        sender: Sender,
        chat: ChatId,
        text: Option<String>,
    },
    Callback {
        sender: Sender,
        callback_id: String,
        payload: Option<String>,
    },
    /// Anything else the transport delivers (membership changes, polls, ...).
    Other { sender: Option<Sender> },
}

impl InboundEvent {
    pub fn sender(&self) -> Option<&Sender> {
        match self {
            InboundEvent::Message { sender, .. } | InboundEvent::Callback { sender, .. } => {
                Some(sender)
            }
            InboundEvent::Other { sender } => sender.as_ref(),
        }
    }

    /// The literal command token ("/menu") if this is a command invocation.
    pub fn command_token(&self) -> Option<&str> {
        match self {
            InboundEvent::Message {
                text: Some(text), ..
            } if text.starts_with('/') => text.split_whitespace().next(),
            _ => None,
        }
    }

    pub fn kind_label(&self) -> &'static str {
        match self {
            InboundEvent::Message { .. } if self.command_token().is_some() => "command",
            InboundEvent::Message { .. } => "message",
            InboundEvent::Callback { .. } => "callback",
            InboundEvent::Other { .. } => "update",
        }
    }

    /// Event payload bounded to `limit` characters, for logs and alerts.
    pub fn context_excerpt(&self, limit: usize) -> Option<String> {
        let raw = match self {
            InboundEvent::Message { text, .. } => text.as_deref(),
            InboundEvent::Callback { payload, .. } => payload.as_deref(),
            InboundEvent::Other { .. } => None,
        }?;
        Some(raw.chars().take(limit).collect())
    }

    /// Callbacks need an acknowledgment to clear the client's loading state.
    pub fn supports_ack(&self) -> bool {
        matches!(self, InboundEvent::Callback { .. })
    }
}
