pub use crate::fingerprint::Fingerprint;
pub use crate::kind::ErrorKind;
pub use crate::model::BotError;
