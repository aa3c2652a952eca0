use crate::error_monitor::ErrorMonitor;
use crate::event::InboundEvent;
use crate::notify::Notifier;
use async_trait::async_trait;
use futures::future::BoxFuture;
use lovebot_errors::prelude::BotError;
use lovebot_types::prelude::{Clock, MonotonicClock};
use std::sync::Arc;

/// A pre-handler guard. Stages run in registration order; a short-circuit
/// skips the remaining stages and the handler without signaling an error.
#[async_trait]
pub trait Stage: Send + Sync {
    async fn handle(
        &self,
        event: &InboundEvent,
        notifier: &dyn Notifier,
    ) -> Result<StageOutcome, BotError>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StageOutcome {
    Continue,
    ShortCircuit,
}

/// What happened to one inbound event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dispatch {
    /// The business handler ran to completion.
    Handled,
    /// A guard stage short-circuited (rate limited).
    Throttled,
    /// The handler failed with benign transport noise; absorbed.
    Suppressed,
}

/// The dispatch chain: the fault interceptor wraps everything, so it sees
/// failures from the guard stages as well as from the handler.
pub struct GuardChain<C: Clock = MonotonicClock> {
    monitor: Arc<ErrorMonitor<C>>,
    stages: Vec<Arc<dyn Stage>>,
}

impl<C: Clock> GuardChain<C> {
    pub fn new(monitor: Arc<ErrorMonitor<C>>) -> Self {
        Self {
            monitor,
            stages: Vec::new(),
        }
    }

    pub fn with_stage(mut self, stage: Arc<dyn Stage>) -> Self {
        self.stages.push(stage);
        self
    }

    /// Run the event through the guards and, if none short-circuits, the
    /// handler. Unexpected handler failures come back as `Err` after the
    /// monitor has reported them.
    pub async fn dispatch<F>(
        &self,
        event: &InboundEvent,
        notifier: &dyn Notifier,
        handler: F,
    ) -> Result<Dispatch, BotError>
    where
        F: for<'a> FnOnce(&'a InboundEvent) -> BoxFuture<'a, Result<(), BotError>> + Send,
    {
        self.monitor
            .intercept(event, notifier, || async {
                for stage in &self.stages {
                    match stage.handle(event, notifier).await? {
                        StageOutcome::Continue => {}
                        StageOutcome::ShortCircuit => return Ok(Dispatch::Throttled),
                    }
                }
                handler(event).await?;
                Ok(Dispatch::Handled)
            })
            .await
    }
}
