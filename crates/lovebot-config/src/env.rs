use crate::errors::{invalid_value, ConfigError};
use crate::model::BotConfig;
use lovebot_types::prelude::SenderId;
use std::collections::HashMap;
use std::str::FromStr;
use tracing::warn;

pub const ENV_PREFIX: &str = "LOVEBOT__";
pub const ENV_SEPARATOR: &str = "__";

/// Flat view of the process environment: `LOVEBOT__GUARD__MESSAGE__RATE_LIMIT`
/// becomes the key `guard.message.rate_limit`. Legacy flat names used by
/// earlier deployments (`ADMIN_ID`, `ADMIN_USERNAME`) are folded in under
/// their modern keys unless those are set explicitly.
pub struct EnvMap {
    values: HashMap<String, String>,
}

impl EnvMap {
    pub fn from_process_env() -> Self {
        Self::from_vars(std::env::vars())
    }

    pub fn from_vars(vars: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut values = HashMap::new();
        let mut legacy: Vec<(String, String)> = Vec::new();

        for (key, value) in vars {
            if let Some(trimmed) = key.strip_prefix(ENV_PREFIX) {
                let normalized = trimmed
                    .split(ENV_SEPARATOR)
                    .filter(|seg| !seg.is_empty())
                    .map(|seg| seg.to_ascii_lowercase())
                    .collect::<Vec<_>>()
                    .join(".");
                if !normalized.is_empty() {
                    values.insert(normalized, value);
                }
            } else if key == "ADMIN_ID" {
                legacy.push(("operator.id".into(), value));
            } else if key == "ADMIN_USERNAME" {
                legacy.push(("monitor.support_handle".into(), value));
            }
        }

        for (key, value) in legacy {
            values.entry(key).or_insert(value);
        }

        Self { values }
    }

    pub fn get_raw(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Parse a value if present. Absence is fine (defaults apply); a value
    /// that fails to parse is a deployment mistake and is reported.
    pub fn get<T: FromStr>(&self, key: &str) -> Result<Option<T>, ConfigError>
    where
        T::Err: std::fmt::Display,
    {
        match self.values.get(key) {
            None => Ok(None),
            Some(raw) => raw
                .parse::<T>()
                .map(Some)
                .map_err(|e| invalid_value(key, e.to_string())),
        }
    }

    pub fn get_list(&self, key: &str) -> Option<Vec<String>> {
        self.values.get(key).map(|raw| {
            raw.split(',')
                .map(|item| item.trim().to_string())
                .filter(|item| !item.is_empty())
                .collect()
        })
    }
}

impl BotConfig {
    /// Build the configuration from the process environment, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(&EnvMap::from_process_env())
    }

    pub fn from_env_map(env: &EnvMap) -> Result<Self, ConfigError> {
        let mut config = BotConfig::default();

        config.operator = env.get::<i64>("operator.id")?.map(SenderId);
        if config.operator.is_none() {
            warn!("no operator id configured, operator alerts are disabled");
        }

        if let Some(limit) = env.get("guard.message.rate_limit")? {
            config.message_guard.rate_limit = limit;
        }
        if let Some(secs) = env.get("guard.message.time_window_secs")? {
            config.message_guard.time_window_secs = secs;
        }
        if let Some(limit) = env.get("guard.callback.rate_limit")? {
            config.callback_guard.rate_limit = limit;
        }
        if let Some(secs) = env.get("guard.callback.time_window_secs")? {
            config.callback_guard.time_window_secs = secs;
        }

        // Shared limiter knobs apply to both instances.
        if let Some(factor) = env.get::<f64>("guard.escalation_factor")? {
            config.message_guard.escalation_factor = factor;
            config.callback_guard.escalation_factor = factor;
        }
        if let Some(secs) = env.get::<u64>("guard.spam_alert_cooldown_secs")? {
            config.message_guard.spam_alert_cooldown_secs = secs;
            config.callback_guard.spam_alert_cooldown_secs = secs;
        }
        if let Some(capacity) = env.get::<usize>("guard.ledger_capacity")? {
            config.message_guard.ledger_capacity = capacity;
            config.callback_guard.ledger_capacity = capacity;
        }
        if let Some(commands) = env.get_list("guard.exempt_commands") {
            config.message_guard.exempt_commands = commands.clone();
            config.callback_guard.exempt_commands = commands;
        }

        if let Some(secs) = env.get("monitor.alert_cooldown_secs")? {
            config.monitor.alert_cooldown_secs = secs;
        }
        if let Some(limit) = env.get("monitor.context_limit")? {
            config.monitor.context_limit = limit;
        }
        if let Some(capacity) = env.get("monitor.ledger_capacity")? {
            config.monitor.ledger_capacity = capacity;
        }
        if let Some(handle) = env.get_raw("monitor.support_handle") {
            config.monitor.support_handle = handle.to_string();
        }

        Ok(config)
    }
}
