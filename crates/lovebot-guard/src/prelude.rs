pub use crate::anti_spam::AntiSpam;
pub use crate::chain::{Dispatch, GuardChain, Stage, StageOutcome};
pub use crate::classify::{Classification, Classifier, MESSAGE_NOT_MODIFIED, NON_CRITICAL_PATTERNS};
pub use crate::error_monitor::ErrorMonitor;
pub use crate::event::{InboundEvent, Sender};
pub use crate::ledger::{Admission, AlertThrottleLedger, RequestLedger};
pub use crate::notify::{Notifier, SupportAction};
