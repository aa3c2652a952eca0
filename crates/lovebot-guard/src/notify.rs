use crate::event::InboundEvent;
use async_trait::async_trait;
use lovebot_errors::prelude::BotError;

/// Inline action attached to a sender-facing notice, e.g. a support link.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SupportAction {
    pub label: String,
    pub url: String,
}

impl SupportAction {
    pub fn contact(handle: &str) -> Self {
        Self {
            label: "📞 Contact support".into(),
            url: format!("https://t.me/{handle}"),
        }
    }
}

/// Outbound capability handed to the guard pipeline. Implementations talk to
/// the real chat transport; the pipeline treats every call as best-effort.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send a display string back to the event's originator.
    async fn notify_sender(
        &self,
        event: &InboundEvent,
        text: &str,
        action: Option<SupportAction>,
    ) -> Result<(), BotError>;

    /// Acknowledge a callback so the client stops showing a loading state.
    /// `alert` asks the client to surface the text prominently.
    async fn ack_callback(
        &self,
        event: &InboundEvent,
        text: Option<&str>,
        alert: bool,
    ) -> Result<(), BotError>;

    /// Send a display string to the configured operator identity. No-op when
    /// no operator is configured.
    async fn notify_operator(&self, text: &str) -> Result<(), BotError>;
}
