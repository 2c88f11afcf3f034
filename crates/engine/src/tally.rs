//! Tally runs and result queries.
//!
//! A run reads every ballot of a stage, aggregates them over the stage's
//! resolved options, and appends the outcome under a new run number. Old
//! runs are never touched; the newest run is authoritative.

use std::collections::HashMap;

use agora_core::stage::Stage;
use agora_core::tally::{aggregate, BallotScore, TallyOption};
use agora_core::types::DbId;
use agora_db::models::result::{StageResult, TallyRunSummary};
use agora_db::repositories::{
    BallotRepo, KnowledgeQuestionRepo, OptionRepo, ResultRepo, VoteRepo,
};
use serde::Serialize;
use sqlx::PgPool;

use crate::config::EngineConfig;
use crate::eligibility::require_options_for_stage;
use crate::error::EngineError;

/// The outcome of one tally run.
#[derive(Debug, Clone, Serialize)]
pub struct TallyRun {
    pub vote_id: DbId,
    pub stage: Stage,
    pub tally_run: i32,
    /// Result rows in ranked order.
    pub rows: Vec<StageResult>,
    pub winner_id: Option<DbId>,
    pub ignored_ballots: i32,
}

/// Compute and persist a new tally run for one vote stage.
///
/// Runs in a single transaction. The vote row is locked first, so
/// concurrent runs for the same vote queue up and each gets its own run
/// number. Ballots are read in one statement; ballots for options outside
/// the resolved set are ignored. The stage's winner flags are rewritten to
/// match the new run.
pub async fn run_tally(
    pool: &PgPool,
    config: &EngineConfig,
    vote_id: DbId,
    stage: Stage,
) -> Result<TallyRun, EngineError> {
    let mut tx = pool.begin().await?;

    VoteRepo::lock(&mut *tx, vote_id)
        .await?
        .ok_or_else(|| EngineError::not_found("vote", vote_id))?;

    let options = require_options_for_stage(&mut tx, vote_id, stage).await?;
    let option_ids: Vec<DbId> = options.iter().map(|o| o.id).collect();

    let question_counts: HashMap<DbId, i32> =
        KnowledgeQuestionRepo::count_by_option(&mut *tx, stage, &option_ids)
            .await?
            .into_iter()
            .map(|(id, n)| (id, i32::try_from(n).unwrap_or(i32::MAX)))
            .collect();

    let ballots: Vec<BallotScore> = BallotRepo::list_scores(&mut *tx, vote_id, stage)
        .await?
        .into_iter()
        .map(|b| BallotScore {
            option_id: b.option_id,
            knowledge_score: b.knowledge_score,
        })
        .collect();

    let tally_options: Vec<TallyOption> = options
        .iter()
        .map(|o| TallyOption {
            id: o.id,
            created_at: o.created_at,
        })
        .collect();
    let outcome = aggregate(&tally_options, &ballots, &question_counts, config.weight_curve);

    let tally_run = ResultRepo::next_tally_run(&mut *tx, vote_id, stage).await?;
    let rows = ResultRepo::insert_run(&mut tx, vote_id, stage, tally_run, &outcome.rows).await?;

    OptionRepo::reset_winners(&mut *tx, stage, vote_id).await?;
    if let Some(winner_id) = outcome.winner_id {
        OptionRepo::set_winner(&mut *tx, stage, winner_id).await?;
    }

    tx.commit().await?;

    if outcome.ignored_ballots > 0 {
        tracing::warn!(
            vote_id,
            stage = stage.number(),
            ignored = outcome.ignored_ballots,
            "Ballots for options outside the stage's option set were ignored"
        );
    }
    tracing::info!(
        vote_id,
        stage = stage.number(),
        tally_run,
        ballots = ballots.len(),
        options = rows.len(),
        winner_id = ?outcome.winner_id,
        weight_curve = %config.weight_curve,
        "Tally run recorded"
    );

    Ok(TallyRun {
        vote_id,
        stage,
        tally_run,
        rows,
        winner_id: outcome.winner_id,
        ignored_ballots: outcome.ignored_ballots,
    })
}

/// Rows of the newest run for a stage; empty if never tallied.
pub async fn latest_results(
    pool: &PgPool,
    vote_id: DbId,
    stage: Stage,
) -> Result<Vec<StageResult>, EngineError> {
    Ok(ResultRepo::latest(pool, vote_id, stage).await?)
}

/// Rows of one specific run.
pub async fn results_for_run(
    pool: &PgPool,
    vote_id: DbId,
    stage: Stage,
    tally_run: i32,
) -> Result<Vec<StageResult>, EngineError> {
    Ok(ResultRepo::for_run(pool, vote_id, stage, tally_run).await?)
}

/// Run history for a stage, newest first.
pub async fn list_runs(
    pool: &PgPool,
    vote_id: DbId,
    stage: Stage,
) -> Result<Vec<TallyRunSummary>, EngineError> {
    Ok(ResultRepo::list_runs(pool, vote_id, stage).await?)
}
