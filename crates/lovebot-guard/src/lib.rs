pub mod anti_spam;
pub mod chain;
pub mod classify;
pub mod error_monitor;
pub mod event;
pub mod ledger;
pub mod notify;
pub mod prelude;

pub use chain::{Dispatch, GuardChain, Stage, StageOutcome};
