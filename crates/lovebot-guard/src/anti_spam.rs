use crate::chain::{Stage, StageOutcome};
use crate::event::InboundEvent;
use crate::ledger::{AlertThrottleLedger, RequestLedger};
use crate::notify::Notifier;
use async_trait::async_trait;
use lovebot_config::prelude::GuardConfig;
use lovebot_errors::prelude::BotError;
use lovebot_types::prelude::{Clock, MonotonicClock, SenderId};
use tracing::{debug, info, warn};

const THROTTLE_MESSAGE: &str = "🚫 Too many requests. Please wait a few seconds.";
const THROTTLE_CALLBACK: &str = "🚫 Too many requests. Please wait.";
const ALERT_CONTEXT_LIMIT: usize = 100;

/// Per-sender sliding-window rate limiter. Suppresses handler execution for
/// senders over budget and escalates sustained bursts to the operator.
pub struct AntiSpam<C: Clock = MonotonicClock> {
    config: GuardConfig,
    operator: Option<SenderId>,
    requests: RequestLedger,
    alerts: AlertThrottleLedger<SenderId>,
    clock: C,
}

impl AntiSpam<MonotonicClock> {
    pub fn new(config: GuardConfig, operator: Option<SenderId>) -> Self {
        Self::with_clock(config, operator, MonotonicClock)
    }
}

impl<C: Clock> AntiSpam<C> {
    pub fn with_clock(config: GuardConfig, operator: Option<SenderId>, clock: C) -> Self {
        info!(
            rate_limit = config.rate_limit,
            time_window_secs = config.time_window_secs,
            exempt = ?config.exempt_commands,
            "anti-spam limiter initialized"
        );
        let requests = RequestLedger::new(config.ledger_capacity);
        let alerts = AlertThrottleLedger::new(config.ledger_capacity);
        Self {
            config,
            operator,
            requests,
            alerts,
            clock,
        }
    }

    fn is_exempt_command(&self, event: &InboundEvent) -> bool {
        let Some(token) = event.command_token() else {
            return false;
        };
        self.config
            .exempt_commands
            .iter()
            .any(|cmd| cmd.eq_ignore_ascii_case(token))
    }

    async fn send_throttle_notice(&self, event: &InboundEvent, notifier: &dyn Notifier) {
        let result = if event.supports_ack() {
            notifier.ack_callback(event, Some(THROTTLE_CALLBACK), true).await
        } else {
            notifier.notify_sender(event, THROTTLE_MESSAGE, None).await
        };
        if let Err(err) = result {
            warn!(error = %err, "failed to deliver throttle notice");
        }
    }

    async fn maybe_escalate(
        &self,
        event: &InboundEvent,
        notifier: &dyn Notifier,
        observed: usize,
    ) {
        if (observed as f64) < self.config.escalation_threshold() {
            return;
        }
        let Some(sender) = event.sender() else {
            return;
        };
        let now = self.clock.now();
        if !self
            .alerts
            .try_begin(sender.id, now, self.config.spam_alert_cooldown())
        {
            return;
        }

        let content = event
            .context_excerpt(ALERT_CONTEXT_LIMIT)
            .unwrap_or_else(|| "none".into());
        let text = format!(
            "⚠️ Possible spam detected!\n\n\
             User: {} (@{})\n\
             ID: {}\n\
             Kind: {}\n\
             Content: {}\n\
             Requests: {} in {} sec",
            sender.full_name,
            sender.username.as_deref().unwrap_or("none"),
            sender.id,
            event.kind_label(),
            content,
            observed,
            self.config.time_window_secs,
        );
        match notifier.notify_operator(&text).await {
            Ok(()) => info!(sender = %sender.id, "spam alert sent"),
            Err(err) => warn!(error = %err, "failed to send spam alert"),
        }
    }
}

#[async_trait]
impl<C: Clock> Stage for AntiSpam<C> {
    async fn handle(
        &self,
        event: &InboundEvent,
        notifier: &dyn Notifier,
    ) -> Result<StageOutcome, BotError> {
        let Some(sender) = event.sender() else {
            return Ok(StageOutcome::Continue);
        };
        if self.operator == Some(sender.id) {
            return Ok(StageOutcome::Continue);
        }
        if self.is_exempt_command(event) {
            debug!(sender = %sender.id, token = ?event.command_token(), "exempt command, skipping limiter");
            return Ok(StageOutcome::Continue);
        }

        let admission = self.requests.admit(
            sender.id,
            self.clock.now(),
            self.config.time_window(),
            self.config.rate_limit,
        );
        if admission.allowed {
            return Ok(StageOutcome::Continue);
        }

        debug!(sender = %sender.id, observed = admission.observed, "request denied by limiter");
        self.send_throttle_notice(event, notifier).await;
        self.maybe_escalate(event, notifier, admission.observed).await;
        Ok(StageOutcome::ShortCircuit)
    }
}
