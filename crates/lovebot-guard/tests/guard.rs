use futures::FutureExt;
use lovebot_config::prelude::*;
use lovebot_errors::prelude::*;
use lovebot_guard::prelude::*;
use lovebot_types::prelude::*;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

#[derive(Default)]
struct RecordingNotifier {
    sender_notices: Mutex<Vec<(String, Option<SupportAction>)>>,
    acks: Mutex<Vec<(Option<String>, bool)>>,
    operator_alerts: Mutex<Vec<String>>,
    fail_operator_sends: bool,
}

impl RecordingNotifier {
    fn failing_operator() -> Self {
        Self {
            fail_operator_sends: true,
            ..Self::default()
        }
    }

    fn operator_alert_count(&self) -> usize {
        self.operator_alerts.lock().len()
    }

    fn sender_notice_count(&self) -> usize {
        self.sender_notices.lock().len()
    }

    fn ack_count(&self) -> usize {
        self.acks.lock().len()
    }
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    async fn notify_sender(
        &self,
        _event: &InboundEvent,
        text: &str,
        action: Option<SupportAction>,
    ) -> Result<(), BotError> {
        self.sender_notices.lock().push((text.to_string(), action));
        Ok(())
    }

    async fn ack_callback(
        &self,
        _event: &InboundEvent,
        text: Option<&str>,
        alert: bool,
    ) -> Result<(), BotError> {
        self.acks.lock().push((text.map(str::to_string), alert));
        Ok(())
    }

    async fn notify_operator(&self, text: &str) -> Result<(), BotError> {
        if self.fail_operator_sends {
            return Err(BotError::transport("operator chat unreachable"));
        }
        self.operator_alerts.lock().push(text.to_string());
        Ok(())
    }
}

fn message_from(id: i64, text: &str) -> InboundEvent {
    InboundEvent::Message {
        sender: Sender::new(SenderId(id), "Alice Example").with_username("alice"),
        chat: ChatId(id),
        text: Some(text.into()),
    }
}

fn callback_from(id: i64, payload: &str) -> InboundEvent {
    InboundEvent::Callback {
        sender: Sender::new(SenderId(id), "Alice Example").with_username("alice"),
        callback_id: "cb-1".into(),
        payload: Some(payload.into()),
    }
}

fn guard_config(rate_limit: usize) -> GuardConfig {
    GuardConfig {
        rate_limit,
        ..GuardConfig::for_messages()
    }
}

fn chain_with(
    clock: ManualClock,
    guard: GuardConfig,
    operator: Option<SenderId>,
) -> GuardChain<ManualClock> {
    let monitor = Arc::new(ErrorMonitor::with_clock(
        MonitorConfig::default(),
        clock.clone(),
    ));
    let anti_spam = Arc::new(AntiSpam::with_clock(guard, operator, clock));
    GuardChain::new(monitor).with_stage(anti_spam)
}

#[tokio::test]
async fn request_over_budget_is_throttled() {
    let clock = ManualClock::new();
    let chain = chain_with(clock, guard_config(3), None);
    let notifier = RecordingNotifier::default();
    let event = message_from(10, "order tea");

    for _ in 0..3 {
        let outcome = chain
            .dispatch(&event, &notifier, |_| async { Ok(()) }.boxed())
            .await;
        assert_eq!(outcome.unwrap(), Dispatch::Handled);
    }
    let outcome = chain
        .dispatch(&event, &notifier, |_| async { Ok(()) }.boxed())
        .await;
    assert_eq!(outcome.unwrap(), Dispatch::Throttled);
    assert_eq!(notifier.sender_notice_count(), 1);
    let (text, action) = notifier.sender_notices.lock()[0].clone();
    assert!(text.contains("Too many requests"));
    assert!(action.is_none());
}

#[tokio::test]
async fn exempt_commands_are_never_throttled() {
    let clock = ManualClock::new();
    let chain = chain_with(clock, guard_config(2), None);
    let notifier = RecordingNotifier::default();

    for _ in 0..20 {
        let outcome = chain
            .dispatch(&message_from(11, "/start"), &notifier, |_| {
                async { Ok(()) }.boxed()
            })
            .await;
        assert_eq!(outcome.unwrap(), Dispatch::Handled);
    }
    // Exempt traffic left no trace in the ledger: the full budget is still
    // available for ordinary messages.
    for _ in 0..2 {
        let outcome = chain
            .dispatch(&message_from(11, "hello"), &notifier, |_| {
                async { Ok(()) }.boxed()
            })
            .await;
        assert_eq!(outcome.unwrap(), Dispatch::Handled);
    }
    let outcome = chain
        .dispatch(&message_from(11, "hello"), &notifier, |_| {
            async { Ok(()) }.boxed()
        })
        .await;
    assert_eq!(outcome.unwrap(), Dispatch::Throttled);
}

#[tokio::test]
async fn exempt_command_matching_ignores_case_and_arguments() {
    let clock = ManualClock::new();
    let chain = chain_with(clock, guard_config(1), None);
    let notifier = RecordingNotifier::default();

    for text in ["/START", "/Help me please", "/cancel now"] {
        let outcome = chain
            .dispatch(&message_from(12, text), &notifier, |_| {
                async { Ok(()) }.boxed()
            })
            .await;
        assert_eq!(outcome.unwrap(), Dispatch::Handled, "{text}");
    }
}

#[tokio::test]
async fn privileged_sender_bypasses_the_limiter() {
    let clock = ManualClock::new();
    let operator = SenderId(99);
    let chain = chain_with(clock, guard_config(1), Some(operator));
    let notifier = RecordingNotifier::default();
    let event = InboundEvent::Message {
        sender: Sender::new(operator, "Operator"),
        chat: ChatId(99),
        text: Some("broadcast text".into()),
    };

    for _ in 0..10 {
        let outcome = chain
            .dispatch(&event, &notifier, |_| async { Ok(()) }.boxed())
            .await;
        assert_eq!(outcome.unwrap(), Dispatch::Handled);
    }
}

#[tokio::test]
async fn window_slides_and_sender_is_readmitted() {
    let clock = ManualClock::new();
    let chain = chain_with(clock.clone(), guard_config(3), None);
    let notifier = RecordingNotifier::default();
    let event = message_from(13, "menu");

    for _ in 0..3 {
        chain
            .dispatch(&event, &notifier, |_| async { Ok(()) }.boxed())
            .await
            .unwrap();
    }
    let denied = chain
        .dispatch(&event, &notifier, |_| async { Ok(()) }.boxed())
        .await;
    assert_eq!(denied.unwrap(), Dispatch::Throttled);

    clock.advance(Duration::from_secs(3));
    let outcome = chain
        .dispatch(&event, &notifier, |_| async { Ok(()) }.boxed())
        .await;
    assert_eq!(outcome.unwrap(), Dispatch::Handled);
}

#[tokio::test]
async fn sustained_burst_alerts_operator_once_per_cooldown() {
    let clock = ManualClock::new();
    let chain = chain_with(clock.clone(), guard_config(3), None);
    let notifier = RecordingNotifier::default();
    let event = callback_from(14, "menu:page:2");

    // 8 rapid requests cross the 3 * 2.5 = 7.5 escalation threshold.
    for _ in 0..8 {
        chain
            .dispatch(&event, &notifier, |_| async { Ok(()) }.boxed())
            .await
            .unwrap();
    }
    assert_eq!(notifier.operator_alert_count(), 1);
    let alert = notifier.operator_alerts.lock()[0].clone();
    assert!(alert.contains("Possible spam detected"));
    assert!(alert.contains("Alice Example"));
    assert!(alert.contains("menu:page:2"));

    // A ninth request inside the cooldown stays quiet.
    chain
        .dispatch(&event, &notifier, |_| async { Ok(()) }.boxed())
        .await
        .unwrap();
    assert_eq!(notifier.operator_alert_count(), 1);

    // After the cooldown a fresh burst alerts exactly once more.
    clock.advance(Duration::from_secs(60));
    for _ in 0..8 {
        chain
            .dispatch(&event, &notifier, |_| async { Ok(()) }.boxed())
            .await
            .unwrap();
    }
    assert_eq!(notifier.operator_alert_count(), 2);
}

#[tokio::test]
async fn benign_failure_is_suppressed_with_one_ack() {
    let clock = ManualClock::new();
    let chain = chain_with(clock, guard_config(10), None);
    let notifier = RecordingNotifier::default();
    let event = callback_from(15, "refresh");

    let outcome = chain
        .dispatch(&event, &notifier, |_| {
            async { Err(BotError::transport("Bad Request: message is not modified")) }.boxed()
        })
        .await;
    assert_eq!(outcome.unwrap(), Dispatch::Suppressed);
    assert_eq!(notifier.operator_alert_count(), 0);
    assert_eq!(notifier.ack_count(), 1);
    let (text, alert) = notifier.acks.lock()[0].clone();
    assert_eq!(text.as_deref(), Some("Data is already up to date"));
    assert!(!alert);
}

#[tokio::test]
async fn benign_failure_on_message_needs_no_ack() {
    let clock = ManualClock::new();
    let chain = chain_with(clock, guard_config(10), None);
    let notifier = RecordingNotifier::default();

    let outcome = chain
        .dispatch(&message_from(16, "hi"), &notifier, |_| {
            async { Err(BotError::transport("Forbidden: bot was blocked by the user")) }.boxed()
        })
        .await;
    assert_eq!(outcome.unwrap(), Dispatch::Suppressed);
    assert_eq!(notifier.ack_count(), 0);
    assert_eq!(notifier.sender_notice_count(), 0);
}

#[tokio::test]
async fn unexpected_failure_is_reported_and_reraised() {
    let clock = ManualClock::new();
    let chain = chain_with(clock, guard_config(10), None);
    let notifier = RecordingNotifier::default();
    let event = message_from(17, "buy everything");

    let outcome = chain
        .dispatch(&event, &notifier, |_| {
            async { Err(BotError::Other("division by zero".into())) }.boxed()
        })
        .await;
    let err = outcome.expect_err("must re-raise");
    assert_eq!(err.to_string(), "division by zero");

    assert_eq!(notifier.operator_alert_count(), 1);
    let alert = notifier.operator_alerts.lock()[0].clone();
    assert!(alert.contains("Critical error"));
    assert!(alert.contains("division by zero"));
    assert!(alert.contains("buy everything"));
    assert!(alert.contains("Alice Example"));

    assert_eq!(notifier.sender_notice_count(), 1);
    let (text, action) = notifier.sender_notices.lock()[0].clone();
    assert!(text.contains("Something went wrong"));
    let action = action.expect("support action attached");
    assert_eq!(action.url, "https://t.me/LoveRestaurantAdmin");
}

#[tokio::test]
async fn repeated_fault_is_alerted_once_per_cooldown() {
    let clock = ManualClock::new();
    let chain = chain_with(clock.clone(), guard_config(10), None);
    let notifier = RecordingNotifier::default();
    let event = message_from(18, "hi");

    for _ in 0..3 {
        let outcome = chain
            .dispatch(&event, &notifier, |_| {
                async { Err(BotError::Other("division by zero".into())) }.boxed()
            })
            .await;
        assert!(outcome.is_err());
    }
    assert_eq!(notifier.operator_alert_count(), 1);
    // Every occurrence still apologizes to the sender.
    assert_eq!(notifier.sender_notice_count(), 3);

    clock.advance(Duration::from_secs(300));
    let outcome = chain
        .dispatch(&event, &notifier, |_| {
            async { Err(BotError::Other("division by zero".into())) }.boxed()
        })
        .await;
    assert!(outcome.is_err());
    assert_eq!(notifier.operator_alert_count(), 2);
}

#[tokio::test]
async fn distinct_faults_alert_independently() {
    let clock = ManualClock::new();
    let chain = chain_with(clock, guard_config(10), None);
    let notifier = RecordingNotifier::default();
    let event = message_from(19, "hi");

    let first = chain
        .dispatch(&event, &notifier, |_| {
            async { Err(BotError::Other("division by zero".into())) }.boxed()
        })
        .await;
    let second = chain
        .dispatch(&event, &notifier, |_| {
            async { Err(BotError::Other("index out of range".into())) }.boxed()
        })
        .await;
    assert!(first.is_err());
    assert!(second.is_err());
    assert_eq!(notifier.operator_alert_count(), 2);
}

#[tokio::test]
async fn alert_send_failure_never_masks_the_original_error() {
    let clock = ManualClock::new();
    let chain = chain_with(clock, guard_config(10), None);
    let notifier = RecordingNotifier::failing_operator();
    let event = message_from(20, "hi");

    let outcome = chain
        .dispatch(&event, &notifier, |_| {
            async { Err(BotError::Other("division by zero".into())) }.boxed()
        })
        .await;
    let err = outcome.expect_err("original error survives");
    assert_eq!(err.to_string(), "division by zero");
    // The apology still went out.
    assert_eq!(notifier.sender_notice_count(), 1);
}

#[tokio::test]
async fn callback_fault_acknowledges_and_follows_up() {
    let clock = ManualClock::new();
    let chain = chain_with(clock, guard_config(10), None);
    let notifier = RecordingNotifier::default();
    let event = callback_from(21, "order:confirm");

    let outcome = chain
        .dispatch(&event, &notifier, |_| {
            async { Err(BotError::Other("division by zero".into())) }.boxed()
        })
        .await;
    assert!(outcome.is_err());
    assert_eq!(notifier.ack_count(), 1);
    let (_, alert) = notifier.acks.lock()[0].clone();
    assert!(alert);
    assert_eq!(notifier.sender_notice_count(), 1);
}
