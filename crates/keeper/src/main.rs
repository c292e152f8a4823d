use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::time::{self, MissedTickBehavior};

use bullion_record::RecordEvent;

use bullion_keeper::{
    create_example_config, HttpPriceSource, KeeperConfig, PublicationGateway, TickOutcome,
};

#[derive(Parser, Debug)]
#[command(name = "bullion-keeper")]
#[command(about = "Bullion index publication service")]
struct Args {
    /// Path to keeper configuration file
    #[arg(short, long, default_value = "keeper.toml")]
    config: String,

    /// Override the configured tick interval in seconds
    #[arg(short, long)]
    interval: Option<u64>,

    /// Dry run mode - compute but don't submit updates
    #[arg(long)]
    dry_run: bool,

    /// Write an example configuration file to the given path and exit
    #[arg(long)]
    init_config: Option<String>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if args.verbose { "debug" } else { "info" }),
    )
    .init();

    if let Some(path) = args.init_config {
        create_example_config(&path)?;
        log::info!("wrote example configuration to {}", path);
        return Ok(());
    }

    log::info!("starting bullion keeper");

    // Configuration failures are fatal; the process never begins ticking
    let config = KeeperConfig::load(&args.config)?;
    let interval_secs = args.interval.unwrap_or(config.poll_interval_secs);

    log::info!("source: {}", config.source.base_url);
    log::info!("tick interval: {}s", interval_secs);
    if args.dry_run {
        log::warn!("running in DRY RUN mode - no updates will be submitted");
    }

    let record = Arc::new(config.build_record()?);
    let engine = config.build_engine()?;
    let source = HttpPriceSource::new(&config.source);
    let mut gateway = PublicationGateway::new(
        source,
        Arc::clone(&record),
        engine,
        config.default_vols(),
        config.updater_id.clone(),
        Duration::from_millis(config.fetch_spacing_ms),
        args.dry_run,
    );

    log::info!("keeper initialized; publishing as {}", config.updater_id);

    // One logical thread of control: a tick that overruns delays the next,
    // it never runs concurrently with it
    let mut interval_timer = time::interval(Duration::from_secs(interval_secs));
    interval_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut iteration = 0u64;

    // A single shutdown future for the life of the loop; recreating it per
    // iteration would drop a Ctrl-C that arrives while a tick is in flight
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = interval_timer.tick() => {}
            _ = &mut shutdown => {
                log::info!(
                    "shutdown requested; final weight state: {:.4?}",
                    gateway.weights()
                );
                break;
            }
        }

        iteration += 1;
        let now = chrono::Utc::now().timestamp();
        log::debug!("starting tick {}", iteration);

        match gateway.tick(now).await {
            Ok(TickOutcome::Published { snapshot }) => {
                log::info!(
                    "tick {}: published index {:.4} over {} samples",
                    iteration,
                    snapshot.index_value,
                    gateway.history_samples()
                );
            }
            Ok(TickOutcome::Rejected { reason, .. }) => {
                // Expected under bounded-rate operation; retried at the
                // next scheduled tick, never within this one
                log::warn!("tick {}: update rejected ({})", iteration, reason);
            }
            Ok(TickOutcome::Skipped { snapshot }) => {
                log::info!(
                    "tick {}: dry run, index {:.4}",
                    iteration,
                    snapshot.index_value
                );
            }
            Err(e) => {
                // Fetch failures abort only the current tick
                log::error!("tick {} aborted: {}", iteration, e);
            }
        }

        for event in record.drain_events() {
            match event {
                RecordEvent::PriceUpdated { price, timestamp, ref updater } => {
                    log::debug!("event: price {} at t={} by {}", price, timestamp, updater)
                }
                other => log::debug!("event: {:?}", other),
            }
        }

        if record.is_stale(now, config.stale_alert_secs) {
            log::warn!(
                "record is stale: no accepted update within {}s",
                config.stale_alert_secs
            );
        }
    }

    Ok(())
}
