//! NexusTrade engine binary
//!
//! Drives the simulated price feed and the lifecycle engine on a fixed tick
//! interval, with oracle-gated auto-entries when an analysis endpoint is
//! configured.

use clap::{Parser, Subcommand};
use nexus_engine::{
    analysis::MarketSnapshot,
    config::Config,
    engine::LifecycleEngine,
    feed::{PriceFeed, PAIR_SPECS},
    gate::{AutoEntryGate, EntryRejection},
    oracle::{request_or_hold, HttpOracle},
    types::Signal,
};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "nexus-engine")]
#[command(about = "Position risk & lifecycle engine for a simulated trading terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the tick loop
    Run {
        /// Enable oracle-driven auto-entries
        #[arg(long)]
        auto: bool,

        /// Symbol to request analysis for
        #[arg(long, default_value = "USD/JPY")]
        pair: String,

        /// Stop after this many ticks (runs forever when omitted)
        #[arg(long)]
        ticks: Option<u64>,
    },
    /// List the traded pair catalog
    Pairs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;

    match cli.command {
        Commands::Run { auto, pair, ticks } => run(config, auto, pair, ticks).await,
        Commands::Pairs => {
            for spec in PAIR_SPECS {
                println!("{:10} baseline {}", spec.symbol, spec.baseline);
            }
            Ok(())
        }
    }
}

async fn run(config: Config, auto: bool, pair: String, max_ticks: Option<u64>) -> anyhow::Result<()> {
    let mut feed = PriceFeed::new(&config.feed);
    feed.seed_history(50, Utc::now());
    if !feed.contains(&pair) {
        anyhow::bail!("unknown pair: {pair}");
    }

    let mut engine = LifecycleEngine::new(&config);
    let mut gate = AutoEntryGate::new(config.gate.clone());

    let oracle: Option<Arc<HttpOracle>> = match &config.oracle.endpoint {
        Some(endpoint) => Some(Arc::new(HttpOracle::new(endpoint, config.oracle.timeout_secs)?)),
        None => None,
    };
    if auto && oracle.is_none() {
        tracing::warn!("--auto requested but no oracle endpoint configured; auto-entries disabled");
    }

    // Oracle cadence expressed in ticks, depending on account tier
    let cadence_secs = config.risk.account_tier.oracle_cadence_secs();
    let cadence_ticks = (cadence_secs * 1000 / config.feed.tick_interval_ms.max(1)).max(1);

    let (signal_tx, mut signal_rx) = mpsc::channel::<Signal>(4);
    let mut ticker = tokio::time::interval(Duration::from_millis(config.feed.tick_interval_ms));

    tracing::info!(
        "🤖 Engine started: {} wallet, {:?} risk, {:?} tier",
        engine.active_wallet(),
        config.risk.risk_level,
        config.risk.account_tier
    );

    let mut tick: u64 = 0;
    loop {
        ticker.tick().await;
        tick += 1;
        let now = Utc::now();

        // Apply any completed oracle result before the pass, in one
        // synchronous update
        while let Ok(signal) = signal_rx.try_recv() {
            gate.finish_request();
            apply_signal(&mut engine, &gate, &feed, signal, now);
        }

        // One consistent snapshot per pass
        let snapshot = feed.advance(now);
        let report = engine.on_tick(&snapshot, now);
        if report.stops_adjusted > 0 || !report.closed.is_empty() {
            tracing::debug!(
                "Tick {}: {} stops adjusted, {} closed",
                tick,
                report.stops_adjusted,
                report.closed.len()
            );
        }

        // Launch at most one oracle request at the configured cadence
        if auto && tick % cadence_ticks == 0 {
            if let Some(oracle) = &oracle {
                launch_analysis(oracle, &mut gate, &feed, &engine, &config, &pair, &signal_tx);
            }
        }

        if tick % 20 == 0 {
            let summary = engine.summary(&snapshot);
            tracing::info!(
                "💰 ${:.2} | equity ${:.2} | P&L ${:.2} | open {} | closed {}",
                summary.balance,
                summary.equity,
                summary.realized_pnl,
                summary.open_positions,
                summary.closed_trades
            );
        }

        if let Some(max) = max_ticks {
            if tick >= max {
                let summary = engine.summary(&snapshot);
                tracing::info!(
                    "Finished after {} ticks: balance ${:.2}, {} trades closed",
                    tick,
                    summary.balance,
                    summary.closed_trades
                );
                break;
            }
        }
    }

    Ok(())
}

/// Gate-check a signal and open the admitted position
fn apply_signal(
    engine: &mut LifecycleEngine,
    gate: &AutoEntryGate,
    feed: &PriceFeed,
    signal: Signal,
    now: chrono::DateTime<Utc>,
) {
    let open_on_symbol = engine.open_count(&signal.symbol);
    match gate.evaluate(&signal, engine.risk(), open_on_symbol, now) {
        Ok(request) => {
            let Some(price) = feed.price(&request.symbol) else {
                tracing::warn!("No price for {}, dropping open request", request.symbol);
                return;
            };
            match engine.open_position(&request, price, now) {
                Ok(id) => tracing::info!("✅ Auto-entry {} on {}", id, request.symbol),
                Err(e) => tracing::warn!("Auto-entry rejected: {}", e),
            }
        }
        // Stale signals and holds are normal, not worth surfacing
        Err(EntryRejection::Hold) | Err(EntryRejection::Stale { .. }) => {}
        Err(rejection) => tracing::info!("Signal dropped: {}", rejection),
    }
}

/// Spawn the in-flight oracle call if the gate allows one
fn launch_analysis(
    oracle: &Arc<HttpOracle>,
    gate: &mut AutoEntryGate,
    feed: &PriceFeed,
    engine: &LifecycleEngine,
    config: &Config,
    pair: &str,
    signal_tx: &mpsc::Sender<Signal>,
) {
    if !gate.try_begin_request() {
        tracing::debug!("Analysis already in flight, skipping this cadence");
        return;
    }
    let history = feed.history(pair);
    let Some(snapshot) = MarketSnapshot::compute(pair, &history) else {
        gate.finish_request();
        return;
    };

    let oracle = Arc::clone(oracle);
    let tx = signal_tx.clone();
    let balance = engine.ledger().balance(engine.active_wallet());
    let risk_level = config.risk.risk_level;
    let sensitivity = config.risk.sensitivity;
    tokio::spawn(async move {
        let signal = request_or_hold(
            oracle.as_ref(),
            &snapshot,
            balance,
            risk_level,
            sensitivity,
        )
        .await;
        let _ = tx.send(signal).await;
    });
}
