mod feed;

use std::sync::Arc;

use anyhow::Context;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use common::{Config, MarketEvent};
use paper::{PaperClient, Sizer};
use strategy::{StrategyFileConfig, StrategyRunner};

use crate::feed::JsonlFeed;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── Logging ──────────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    // ── Config ────────────────────────────────────────────────────────────────
    let cfg = Config::from_env().context("loading environment configuration")?;
    let strategy_file = StrategyFileConfig::load(&cfg.strategy_config_path)
        .context("loading strategy config")?;
    let dispatcher = strategy_file.build_dispatcher()?;
    info!(
        name = %strategy_file.name,
        pair = %strategy_file.pair,
        preset = ?strategy_file.preset,
        short_entries = strategy_file.short_entries,
        params = ?dispatcher.params(),
        "RSI rollercoaster starting"
    );

    // ── Execution client ──────────────────────────────────────────────────────
    let sizer = Sizer::from_name(&strategy_file.sizer.name, strategy_file.sizer.lots)?;
    let client = Arc::new(PaperClient::new(sizer, cfg.paper_balance));

    // ── Strategy ──────────────────────────────────────────────────────────────
    let runner = StrategyRunner::new(
        strategy_file.name.clone(),
        strategy_file.pair.clone(),
        dispatcher,
        client.clone(),
    );

    // ── Feed ──────────────────────────────────────────────────────────────────
    let (bar_tx, bar_rx) = mpsc::channel::<MarketEvent>(256);
    let feed = JsonlFeed::new(cfg.bars_path.clone(), strategy_file.pair.clone());
    let feed_task = tokio::spawn(feed.run(bar_tx));

    tokio::select! {
        position = runner.run(bar_rx) => {
            let bars = feed_task.await.context("feed task panicked")??;
            info!(
                bars,
                side = %position.side,
                entry = ?position.entry_price,
                balance = client.balance().await,
                "Replay finished"
            );
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received. Exiting.");
        }
    }

    Ok(())
}
