//! Auto-tally sweep.
//!
//! One sweep looks at every open vote, tallies each stage whose end fell
//! inside the lookback window, and closes votes whose stages have all
//! elapsed. A failure for one vote is recorded and the sweep moves on;
//! the next sweep retries any stage still inside its window.

use agora_core::lifecycle::VoteStatus;
use agora_core::stage::{all_stages_elapsed, stages_due_for_tally, Stage};
use agora_core::types::{DbId, Timestamp};
use agora_db::repositories::VoteRepo;
use serde::Serialize;
use sqlx::PgPool;

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::tally::run_tally;

/// Outcome of one stage tally within a sweep.
#[derive(Debug, Clone, Serialize)]
pub struct SweepEntry {
    pub vote_id: DbId,
    pub stage: Stage,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tally_run: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner_id: Option<DbId>,
    /// Raw error message when the tally failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Summary of one sweep.
#[derive(Debug, Clone, Serialize)]
pub struct SweepReport {
    pub timestamp: Timestamp,
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub closed_votes: Vec<DbId>,
    pub results: Vec<SweepEntry>,
}

/// Run one sweep as of `now`.
///
/// Only failing to list the open votes aborts the sweep.
pub async fn run_sweep(
    pool: &PgPool,
    config: &EngineConfig,
    now: Timestamp,
) -> Result<SweepReport, EngineError> {
    let votes = VoteRepo::list_by_status(pool, VoteStatus::Open).await?;
    tracing::debug!(open_votes = votes.len(), "Auto-tally sweep started");

    let mut results = Vec::new();
    let mut closed_votes = Vec::new();

    for vote in &votes {
        let windows = vote.windows();
        let mut vote_failed = false;

        for stage in stages_due_for_tally(&windows, now, config.auto_tally_lookback) {
            match run_tally(pool, config, vote.id, stage).await {
                Ok(run) => results.push(SweepEntry {
                    vote_id: vote.id,
                    stage,
                    success: true,
                    tally_run: Some(run.tally_run),
                    winner_id: run.winner_id,
                    error: None,
                }),
                Err(e) => {
                    tracing::error!(
                        vote_id = vote.id,
                        stage = stage.number(),
                        error = %e,
                        "Auto-tally failed"
                    );
                    vote_failed = true;
                    results.push(SweepEntry {
                        vote_id: vote.id,
                        stage,
                        success: false,
                        tally_run: None,
                        winner_id: None,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        if config.auto_close_votes && !vote_failed && all_stages_elapsed(&windows, now) {
            match VoteRepo::transition_status(pool, vote.id, VoteStatus::Open, VoteStatus::Closed)
                .await
            {
                Ok(Some(_)) => {
                    tracing::info!(vote_id = vote.id, "Vote closed after final stage elapsed");
                    closed_votes.push(vote.id);
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::error!(vote_id = vote.id, error = %e, "Auto-close failed");
                }
            }
        }
    }

    let succeeded = results.iter().filter(|r| r.success).count();
    let report = SweepReport {
        timestamp: now,
        processed: results.len(),
        succeeded,
        failed: results.len() - succeeded,
        closed_votes,
        results,
    };

    tracing::info!(
        processed = report.processed,
        succeeded = report.succeeded,
        failed = report.failed,
        closed = report.closed_votes.len(),
        "Auto-tally sweep finished"
    );

    Ok(report)
}
