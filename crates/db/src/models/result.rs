//! Tally snapshot models for the `results` table.

use agora_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `results` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StageResult {
    pub id: DbId,
    pub vote_id: DbId,
    pub stage: i16,
    pub choice_id: DbId,
    pub tally_run: i32,
    pub total_votes: i32,
    pub weighted_votes: f64,
    pub bkq0_count: i32,
    pub bkq1_count: i32,
    pub bkq2_count: i32,
    pub bkq3_count: i32,
    pub is_winner: bool,
    pub created_at: Timestamp,
}

/// One entry of a stage's tally history.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TallyRunSummary {
    pub tally_run: i32,
    pub created_at: Timestamp,
    /// Ballots that counted toward an option in this run.
    pub counted_ballots: i64,
    pub winner_id: Option<DbId>,
}
