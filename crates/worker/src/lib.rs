//! One-shot auto-tally trigger.
//!
//! Each invocation runs a single sweep and exits, so any external scheduler
//! (cron, a Kubernetes CronJob, systemd timers) can drive tallying.

use agora_core::types::Timestamp;
use agora_engine::sweep::{run_sweep, SweepReport};
use agora_engine::{EngineConfig, EngineError};
use sqlx::PgPool;

/// Run one sweep as of `now` and render its report as pretty JSON.
///
/// Per-vote failures are part of the report; only an aborted sweep is an
/// error.
pub async fn sweep_once(
    pool: &PgPool,
    config: &EngineConfig,
    now: Timestamp,
) -> Result<(SweepReport, String), EngineError> {
    let report = run_sweep(pool, config, now).await?;
    let rendered = serde_json::to_string_pretty(&report)
        .map_err(|e| agora_core::error::CoreError::Internal(e.to_string()))?;
    Ok((report, rendered))
}
