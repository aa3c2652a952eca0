use anyhow::{Context, Result};
use clap::Parser;
use lovebot::{memory_updates, BotApp, LoggingHandler, MemoryNotifier};
use lovebot_config::prelude::BotConfig;
use lovebot_guard::prelude::{InboundEvent, Sender};
use lovebot_types::prelude::{ChatId, SenderId};
use std::sync::Arc;
use tokio::signal::{
    ctrl_c,
    unix::{signal, SignalKind},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lovebot", version, about = "Love Restaurant storefront bot")]
struct Cli {
    /// Override the operator id from the environment.
    #[arg(long)]
    operator: Option<i64>,
    /// Messages in the scripted abuse burst of the dry run.
    #[arg(long, default_value_t = 8)]
    burst: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let mut config = BotConfig::from_env().context("loading configuration")?;
    if let Some(operator) = cli.operator {
        config.operator = Some(SenderId(operator));
    }

    let notifier = Arc::new(MemoryNotifier::new(config.operator));
    let app = BotApp::new(config, notifier.clone(), Arc::new(LoggingHandler));

    // The real chat transport is an external collaborator; the binary ships
    // with the in-memory one and a scripted traffic sample.
    let (tx, source) = memory_updates(64);
    let feeder = tokio::spawn(feed_dry_run_traffic(tx, cli.burst));

    tokio::select! {
        _ = app.run(source) => {
            app.notify_shutdown("DRY_RUN_COMPLETE").await;
        }
        reason = shutdown_signal() => {
            app.notify_shutdown(reason).await;
        }
    }
    feeder.await.context("feeder task")?;

    let sent = notifier.sent();
    info!(outbound = sent.len(), "dry run finished");
    for alert in notifier.operator_alerts() {
        info!("operator alert:\n{alert}");
    }
    Ok(())
}

async fn feed_dry_run_traffic(tx: tokio::sync::mpsc::Sender<InboundEvent>, burst: usize) {
    let patron = Sender::new(SenderId(1001), "Dry Run Patron").with_username("patron");

    let _ = tx
        .send(InboundEvent::Message {
            sender: patron.clone(),
            chat: ChatId(1001),
            text: Some("/start".into()),
        })
        .await;
    let _ = tx
        .send(InboundEvent::Message {
            sender: patron.clone(),
            chat: ChatId(1001),
            text: Some("show me the menu".into()),
        })
        .await;
    let _ = tx
        .send(InboundEvent::Callback {
            sender: patron.clone(),
            callback_id: "cb-1".into(),
            payload: Some("menu:page:1".into()),
        })
        .await;

    for _ in 0..burst {
        let _ = tx
            .send(InboundEvent::Message {
                sender: patron.clone(),
                chat: ChatId(1001),
                text: Some("gimme gimme".into()),
            })
            .await;
    }
}

async fn shutdown_signal() -> &'static str {
    let interrupt = async {
        ctrl_c().await.expect("failed to install Ctrl+C handler");
        "SIGINT"
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
        "SIGTERM"
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<&'static str>();

    tokio::select! {
        reason = interrupt => reason,
        reason = terminate => reason,
    }
}
