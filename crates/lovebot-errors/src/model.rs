use crate::kind::ErrorKind;
use thiserror::Error;

/// Failure surfaced by a business handler or one of its collaborators.
///
/// The guard pipeline only ever inspects the kind and the message text; it
/// never matches on the variant itself, so collaborators are free to map
/// their own error types into the closest fit.
#[derive(Clone, Debug, Error)]
pub enum BotError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("payment provider error: {0}")]
    Payment(String),
    #[error("handler error: {0}")]
    Handler(String),
    #[error("config error: {0}")]
    Config(String),
    #[error("{0}")]
    Other(String),
}

impl BotError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BotError::Transport(_) => ErrorKind::Transport,
            BotError::Storage(_) => ErrorKind::Storage,
            BotError::Payment(_) => ErrorKind::Payment,
            BotError::Handler(_) => ErrorKind::Handler,
            BotError::Config(_) => ErrorKind::Config,
            BotError::Other(_) => ErrorKind::Unknown,
        }
    }

    /// The raw message text, without the variant prefix `Display` adds.
    pub fn detail(&self) -> &str {
        match self {
            BotError::Transport(msg)
            | BotError::Storage(msg)
            | BotError::Payment(msg)
            | BotError::Handler(msg)
            | BotError::Config(msg)
            | BotError::Other(msg) => msg,
        }
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        BotError::Transport(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        BotError::Storage(msg.into())
    }

    pub fn handler(msg: impl Into<String>) -> Self {
        BotError::Handler(msg.into())
    }
}
