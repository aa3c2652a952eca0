use crate::chain::Dispatch;
use crate::classify::{Classification, Classifier, MESSAGE_NOT_MODIFIED};
use crate::event::InboundEvent;
use crate::ledger::AlertThrottleLedger;
use crate::notify::{Notifier, SupportAction};
use lovebot_config::prelude::MonitorConfig;
use lovebot_errors::prelude::{BotError, Fingerprint};
use lovebot_types::prelude::{Clock, MonotonicClock};
use std::future::Future;
use tracing::{debug, error, info, warn};

const APOLOGY: &str = "❌ Something went wrong while handling your request.\n\
                       The administrator has been notified. Please try again later or contact support.";
const APOLOGY_CALLBACK: &str = "❌ Something went wrong. Please try again later.";
const ACK_UP_TO_DATE: &str = "Data is already up to date";

/// Wraps handler execution: absorbs benign transport noise, and for genuine
/// defects guarantees one operator alert per fingerprint per cooldown, one
/// sender apology, and a re-raise to the caller.
pub struct ErrorMonitor<C: Clock = MonotonicClock> {
    config: MonitorConfig,
    classifier: Classifier,
    alerts: AlertThrottleLedger<Fingerprint>,
    clock: C,
}

impl ErrorMonitor<MonotonicClock> {
    pub fn new(config: MonitorConfig) -> Self {
        Self::with_clock(config, MonotonicClock)
    }
}

impl<C: Clock> ErrorMonitor<C> {
    pub fn with_clock(config: MonitorConfig, clock: C) -> Self {
        Self::with_classifier(config, Classifier::default(), clock)
    }

    pub fn with_classifier(config: MonitorConfig, classifier: Classifier, clock: C) -> Self {
        info!(
            alert_cooldown_secs = config.alert_cooldown_secs,
            "error monitor initialized"
        );
        let alerts = AlertThrottleLedger::new(config.ledger_capacity);
        Self {
            config,
            classifier,
            alerts,
            clock,
        }
    }

    /// Run `next`, classifying and reporting any failure. Benign failures
    /// are suppressed; unexpected ones are re-raised after reporting.
    pub async fn intercept<F, Fut>(
        &self,
        event: &InboundEvent,
        notifier: &dyn Notifier,
        next: F,
    ) -> Result<Dispatch, BotError>
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<Dispatch, BotError>> + Send,
    {
        match next().await {
            Ok(outcome) => Ok(outcome),
            Err(err) => match self.classifier.classify(&err) {
                Classification::Benign => {
                    self.absorb_benign(event, notifier, &err).await;
                    Ok(Dispatch::Suppressed)
                }
                Classification::Unexpected => {
                    self.report_unexpected(event, notifier, &err).await;
                    Err(err)
                }
            },
        }
    }

    async fn absorb_benign(&self, event: &InboundEvent, notifier: &dyn Notifier, err: &BotError) {
        info!(error = %err, "non-critical error suppressed");
        if !event.supports_ack() {
            return;
        }
        let text = if err.detail().to_lowercase().contains(MESSAGE_NOT_MODIFIED) {
            Some(ACK_UP_TO_DATE)
        } else {
            None
        };
        if let Err(ack_err) = notifier.ack_callback(event, text, false).await {
            debug!(error = %ack_err, "benign-path acknowledgment failed");
        }
    }

    async fn report_unexpected(
        &self,
        event: &InboundEvent,
        notifier: &dyn Notifier,
        err: &BotError,
    ) {
        let context = event.context_excerpt(self.config.context_limit);
        let sender = event.sender();
        error!(
            kind = err.kind().as_str(),
            message = err.detail(),
            sender = sender.map(|s| s.id.0),
            context = context.as_deref(),
            "unhandled error in dispatch"
        );

        let fingerprint = Fingerprint::of(err.kind(), err.detail());
        let now = self.clock.now();
        if self
            .alerts
            .try_begin(fingerprint, now, self.config.alert_cooldown())
        {
            let text = self.format_operator_alert(event, err, context.as_deref());
            match notifier.notify_operator(&text).await {
                Ok(()) => info!(?fingerprint, "fault alert sent"),
                Err(notify_err) => {
                    warn!(error = %notify_err, "failed to send fault alert")
                }
            }
        }

        self.apologize(event, notifier).await;
    }

    fn format_operator_alert(
        &self,
        event: &InboundEvent,
        err: &BotError,
        context: Option<&str>,
    ) -> String {
        let mut text = format!(
            "⚠️ Critical error in the bot!\n\n\
             Time: {}\n\
             Kind: {}\n\
             Message: {}\n",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            err.kind().as_str(),
            err.detail(),
        );
        if let Some(context) = context {
            let label = if event.supports_ack() {
                "Callback data"
            } else {
                "Message"
            };
            text.push_str(&format!("{label}: {context}\n"));
        }
        let user = event
            .sender()
            .map(|s| s.describe())
            .unwrap_or_else(|| "unknown".into());
        text.push_str(&format!("User: {user}"));
        text
    }

    async fn apologize(&self, event: &InboundEvent, notifier: &dyn Notifier) {
        if event.sender().is_none() {
            return;
        }
        let action = SupportAction::contact(&self.config.support_handle);
        if event.supports_ack() {
            if let Err(err) = notifier.ack_callback(event, Some(APOLOGY_CALLBACK), true).await {
                warn!(error = %err, "failed to acknowledge failed callback");
            }
        }
        if let Err(err) = notifier.notify_sender(event, APOLOGY, Some(action)).await {
            warn!(error = %err, "failed to notify sender about the error");
        }
    }
}
