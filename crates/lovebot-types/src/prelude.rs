pub use crate::id::{ChatId, SenderId};
pub use crate::time::{Clock, ManualClock, MonotonicClock};
