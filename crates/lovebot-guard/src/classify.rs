use lovebot_errors::prelude::BotError;

/// Transport error text that shows up during normal operation: edit/delete
/// races, stale callback queries, senders who blocked the bot. Matching is
/// case-insensitive substring search over the error message.
pub const NON_CRITICAL_PATTERNS: [&str; 6] = [
    "message is not modified",
    "query is too old",
    "message to edit not found",
    "message to delete not found",
    "message can't be deleted",
    "bot was blocked by the user",
];

/// The one benign case that deserves feedback instead of a silent ack.
pub const MESSAGE_NOT_MODIFIED: &str = "message is not modified";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Classification {
    Benign,
    Unexpected,
}

/// Table-driven failure classification. The table is brittle by design: it
/// matches substrings of provider error text, so keeping it in one place is
/// what makes the policy extendable.
#[derive(Clone, Debug)]
pub struct Classifier {
    patterns: Vec<String>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self {
            patterns: NON_CRITICAL_PATTERNS
                .iter()
                .map(|p| p.to_string())
                .collect(),
        }
    }
}

impl Classifier {
    pub fn with_patterns(patterns: Vec<String>) -> Self {
        Self {
            patterns: patterns
                .into_iter()
                .map(|p| p.to_lowercase())
                .collect(),
        }
    }

    pub fn classify(&self, error: &BotError) -> Classification {
        if self.is_benign(error.detail()) {
            Classification::Benign
        } else {
            Classification::Unexpected
        }
    }

    pub fn is_benign(&self, message: &str) -> bool {
        let lowered = message.to_lowercase();
        self.patterns.iter().any(|p| lowered.contains(p.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_patterns_are_benign() {
        let classifier = Classifier::default();
        for pattern in NON_CRITICAL_PATTERNS {
            let err = BotError::transport(format!("Bad Request: {pattern}"));
            assert_eq!(classifier.classify(&err), Classification::Benign, "{pattern}");
        }
    }

    #[test]
    fn matching_is_case_insensitive() {
        let classifier = Classifier::default();
        assert!(classifier.is_benign("Message Is Not Modified"));
        assert!(classifier.is_benign("BOT WAS BLOCKED BY THE USER"));
    }

    #[test]
    fn everything_else_is_unexpected() {
        let classifier = Classifier::default();
        let err = BotError::Other("division by zero".into());
        assert_eq!(classifier.classify(&err), Classification::Unexpected);
    }

    #[test]
    fn custom_table_replaces_the_default() {
        let classifier = Classifier::with_patterns(vec!["Flood Control".into()]);
        assert!(classifier.is_benign("flood control exceeded"));
        assert!(!classifier.is_benign("message is not modified"));
    }
}
