use async_trait::async_trait;
use lovebot_errors::prelude::BotError;
use lovebot_guard::prelude::{InboundEvent, Notifier, SupportAction};
use lovebot_types::prelude::SenderId;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Delivery side of the chat transport. The real implementation long-polls
/// the provider; tests and the dry-run binary use the in-memory one below.
#[async_trait]
pub trait UpdateSource: Send {
    /// The next inbound event, or `None` once the transport is closed.
    async fn next_update(&mut self) -> Option<InboundEvent>;
}

pub struct MemoryUpdateSource {
    rx: mpsc::Receiver<InboundEvent>,
}

#[async_trait]
impl UpdateSource for MemoryUpdateSource {
    async fn next_update(&mut self) -> Option<InboundEvent> {
        self.rx.recv().await
    }
}

/// Channel-backed update feed: the sender half injects events, the source
/// half plugs into `BotApp::run`.
pub fn memory_updates(buffer: usize) -> (mpsc::Sender<InboundEvent>, MemoryUpdateSource) {
    let (tx, rx) = mpsc::channel(buffer);
    (tx, MemoryUpdateSource { rx })
}

/// Everything the bot tried to send out, for inspection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outbound {
    SenderNotice {
        to: Option<SenderId>,
        text: String,
        action: Option<SupportAction>,
    },
    CallbackAck {
        to: Option<SenderId>,
        text: Option<String>,
        alert: bool,
    },
    OperatorAlert {
        to: SenderId,
        text: String,
    },
}

/// In-memory notifier: records outbound traffic instead of talking to a
/// provider. Operator alerts are dropped (a no-op) when no operator is
/// configured, mirroring the production wiring.
pub struct MemoryNotifier {
    operator: Option<SenderId>,
    sent: Mutex<Vec<Outbound>>,
}

impl MemoryNotifier {
    pub fn new(operator: Option<SenderId>) -> Self {
        Self {
            operator,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<Outbound> {
        self.sent.lock().clone()
    }

    pub fn operator_alerts(&self) -> Vec<String> {
        self.sent
            .lock()
            .iter()
            .filter_map(|out| match out {
                Outbound::OperatorAlert { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl Notifier for MemoryNotifier {
    async fn notify_sender(
        &self,
        event: &InboundEvent,
        text: &str,
        action: Option<SupportAction>,
    ) -> Result<(), BotError> {
        debug!(text, "sender notice");
        self.sent.lock().push(Outbound::SenderNotice {
            to: event.sender().map(|s| s.id),
            text: text.to_string(),
            action,
        });
        Ok(())
    }

    async fn ack_callback(
        &self,
        event: &InboundEvent,
        text: Option<&str>,
        alert: bool,
    ) -> Result<(), BotError> {
        debug!(?text, alert, "callback acknowledgment");
        self.sent.lock().push(Outbound::CallbackAck {
            to: event.sender().map(|s| s.id),
            text: text.map(str::to_string),
            alert,
        });
        Ok(())
    }

    async fn notify_operator(&self, text: &str) -> Result<(), BotError> {
        let Some(operator) = self.operator else {
            debug!("operator alert dropped, no operator configured");
            return Ok(());
        };
        info!(%operator, "operator alert");
        self.sent.lock().push(Outbound::OperatorAlert {
            to: operator,
            text: text.to_string(),
        });
        Ok(())
    }
}
