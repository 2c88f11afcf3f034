//! In-process auto-tally loop.
//!
//! Runs one sweep per interval so stages are tallied shortly after their
//! window ends, without an external scheduler. The sweep window is
//! configured separately; keep the interval below it or ends can be missed.

use std::time::Duration;

use agora_engine::sweep::run_sweep;
use agora_engine::EngineConfig;
use chrono::Utc;
use sqlx::PgPool;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Run the auto-tally loop until `cancel` is triggered.
pub async fn run(pool: PgPool, config: EngineConfig, period: Duration, cancel: CancellationToken) {
    let lookback_secs = config.auto_tally_lookback.num_seconds();
    if u64::try_from(lookback_secs).is_ok_and(|l| l < period.as_secs()) {
        tracing::warn!(
            interval_secs = period.as_secs(),
            lookback_secs,
            "Auto-tally interval exceeds lookback window; some stage ends may be skipped"
        );
    }

    tracing::info!(
        interval_secs = period.as_secs(),
        lookback_secs,
        "Auto-tally job started"
    );

    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Auto-tally job stopping");
                break;
            }
            _ = interval.tick() => {
                match run_sweep(&pool, &config, Utc::now()).await {
                    Ok(report) => {
                        tracing::debug!(processed = report.processed, "Auto-tally tick complete");
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Auto-tally sweep aborted");
                    }
                }
            }
        }
    }
}
