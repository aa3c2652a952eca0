use lovebot_types::prelude::SenderId;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tuning for one anti-spam limiter instance. Message and callback events
/// get independent instances with different request budgets.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GuardConfig {
    /// Requests admitted per sender within the sliding window.
    pub rate_limit: usize,
    /// Width of the sliding window, in seconds.
    pub time_window_secs: u64,
    /// Multiple of `rate_limit` at which an operator alert is attempted.
    /// Not derived from any stated requirement; kept configurable.
    pub escalation_factor: f64,
    /// Minimum spacing between spam alerts for the same sender, in seconds.
    pub spam_alert_cooldown_secs: u64,
    /// Command tokens that bypass rate limiting entirely.
    pub exempt_commands: Vec<String>,
    /// Maximum senders tracked before the least recently seen is evicted.
    pub ledger_capacity: usize,
}

impl GuardConfig {
    pub fn for_messages() -> Self {
        Self {
            rate_limit: 3,
            ..Self::base()
        }
    }

    pub fn for_callbacks() -> Self {
        Self {
            rate_limit: 5,
            ..Self::base()
        }
    }

    fn base() -> Self {
        Self {
            rate_limit: 3,
            time_window_secs: 3,
            escalation_factor: 2.5,
            spam_alert_cooldown_secs: 60,
            exempt_commands: vec!["/start".into(), "/help".into(), "/cancel".into()],
            ledger_capacity: 4096,
        }
    }

    pub fn time_window(&self) -> Duration {
        Duration::from_secs(self.time_window_secs)
    }

    pub fn spam_alert_cooldown(&self) -> Duration {
        Duration::from_secs(self.spam_alert_cooldown_secs)
    }

    /// Observed-request count at which an alert is warranted.
    pub fn escalation_threshold(&self) -> f64 {
        self.rate_limit as f64 * self.escalation_factor
    }
}

/// Tuning for the fault interceptor.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Minimum spacing between alerts for the same error fingerprint, in seconds.
    pub alert_cooldown_secs: u64,
    /// Longest event excerpt included in logs and alerts.
    pub context_limit: usize,
    /// Chat handle users are pointed at when something breaks.
    pub support_handle: String,
    /// Maximum fingerprints tracked before the least recently alerted is evicted.
    pub ledger_capacity: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            alert_cooldown_secs: 300,
            context_limit: 100,
            support_handle: "LoveRestaurantAdmin".into(),
            ledger_capacity: 4096,
        }
    }
}

impl MonitorConfig {
    pub fn alert_cooldown(&self) -> Duration {
        Duration::from_secs(self.alert_cooldown_secs)
    }
}

/// Everything the composition root needs to assemble the bot.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BotConfig {
    /// Privileged identity receiving abuse/fault alerts. `None` disables
    /// operator alerts but nothing else.
    pub operator: Option<SenderId>,
    pub message_guard: GuardConfig,
    pub callback_guard: GuardConfig,
    pub monitor: MonitorConfig,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            operator: None,
            message_guard: GuardConfig::for_messages(),
            callback_guard: GuardConfig::for_callbacks(),
            monitor: MonitorConfig::default(),
        }
    }
}
