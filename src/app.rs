use crate::transport::UpdateSource;
use async_trait::async_trait;
use futures::FutureExt;
use lovebot_config::prelude::BotConfig;
use lovebot_errors::prelude::BotError;
use lovebot_guard::prelude::{AntiSpam, ErrorMonitor, GuardChain, InboundEvent, Notifier};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

/// Seam for the business side of the bot: menu browsing, orders, broadcasts,
/// payments. Those flows live behind this trait; the guard pipeline neither
/// knows nor cares what they do.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: &InboundEvent) -> Result<(), BotError>;
}

/// Placeholder handler used by the dry-run binary: logs the event and moves on.
pub struct LoggingHandler;

#[async_trait]
impl EventHandler for LoggingHandler {
    async fn handle(&self, event: &InboundEvent) -> Result<(), BotError> {
        info!(kind = event.kind_label(), "handled update");
        Ok(())
    }
}

struct AppInner {
    config: BotConfig,
    message_chain: GuardChain,
    callback_chain: GuardChain,
    other_chain: GuardChain,
    notifier: Arc<dyn Notifier>,
    handler: Arc<dyn EventHandler>,
}

/// Composition root: owns the guard chains and pumps updates through them,
/// one task per update.
#[derive(Clone)]
pub struct BotApp {
    inner: Arc<AppInner>,
}

impl BotApp {
    pub fn new(
        config: BotConfig,
        notifier: Arc<dyn Notifier>,
        handler: Arc<dyn EventHandler>,
    ) -> Self {
        // One fault interceptor for every event kind; limiters are
        // per-kind, with their own budgets.
        let monitor = Arc::new(ErrorMonitor::new(config.monitor.clone()));
        let message_chain = GuardChain::new(monitor.clone()).with_stage(Arc::new(AntiSpam::new(
            config.message_guard.clone(),
            config.operator,
        )));
        let callback_chain = GuardChain::new(monitor.clone()).with_stage(Arc::new(
            AntiSpam::new(config.callback_guard.clone(), config.operator),
        ));
        let other_chain = GuardChain::new(monitor);

        Self {
            inner: Arc::new(AppInner {
                config,
                message_chain,
                callback_chain,
                other_chain,
                notifier,
                handler,
            }),
        }
    }

    pub fn config(&self) -> &BotConfig {
        &self.inner.config
    }

    /// Consume the update source until it closes, dispatching each update on
    /// its own task, then wait for the in-flight tasks to finish.
    pub async fn run<S: UpdateSource>(&self, mut source: S) {
        self.notify_operator_banner(&format!(
            "✅ Love Restaurant bot is up and ready!\nVersion: {}\nTime: {}",
            env!("CARGO_PKG_VERSION"),
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        ))
        .await;

        let mut tasks = JoinSet::new();
        while let Some(event) = source.next_update().await {
            let app = self.clone();
            tasks.spawn(async move { app.dispatch_one(event).await });
            // Opportunistically reap finished tasks so the set stays small.
            while tasks.try_join_next().is_some() {}
        }
        while tasks.join_next().await.is_some() {}
    }

    /// Operator notice for lifecycle transitions; never fatal.
    pub async fn notify_shutdown(&self, reason: &str) {
        self.notify_operator_banner(&format!(
            "⚠️ Love Restaurant bot is shutting down!\nReason: {}\nTime: {}",
            reason,
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        ))
        .await;
    }

    async fn notify_operator_banner(&self, text: &str) {
        if let Err(err) = self.inner.notifier.notify_operator(text).await {
            warn!(error = %err, "failed to send lifecycle notice");
        }
    }

    async fn dispatch_one(&self, event: InboundEvent) {
        let chain = match &event {
            InboundEvent::Message { .. } => &self.inner.message_chain,
            InboundEvent::Callback { .. } => &self.inner.callback_chain,
            InboundEvent::Other { .. } => &self.inner.other_chain,
        };
        let handler = self.inner.handler.clone();
        let result = chain
            .dispatch(&event, self.inner.notifier.as_ref(), move |e| {
                async move { handler.handle(e).await }.boxed()
            })
            .await;
        if let Err(err) = result {
            // Already classified, alerted and apologized for by the monitor;
            // this is the outer harness observing the re-raise.
            error!(error = %err, "update processing failed");
        }
    }
}
