//! Repository for the `results` table.
//!
//! Rows are append-only. Each tally run writes one row per option under a
//! new `tally_run`; the highest run per (vote, stage) is current.

use agora_core::stage::Stage;
use agora_core::tally::OptionTally;
use agora_core::types::DbId;
use sqlx::{PgConnection, PgExecutor, PgPool};

use crate::models::result::{StageResult, TallyRunSummary};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, vote_id, stage, choice_id, tally_run, total_votes, weighted_votes, \
    bkq0_count, bkq1_count, bkq2_count, bkq3_count, is_winner, created_at";

/// Provides tally snapshot storage.
pub struct ResultRepo;

impl ResultRepo {
    /// Next run number for a stage (max existing + 1, or 1 if none).
    pub async fn next_tally_run<'e>(
        executor: impl PgExecutor<'e>,
        vote_id: DbId,
        stage: Stage,
    ) -> Result<i32, sqlx::Error> {
        let row: (i32,) = sqlx::query_as(
            "SELECT COALESCE(MAX(tally_run), 0) + 1 FROM results \
             WHERE vote_id = $1 AND stage = $2",
        )
        .bind(vote_id)
        .bind(stage.number())
        .fetch_one(executor)
        .await?;
        Ok(row.0)
    }

    /// Insert the rows of one run in ranked order.
    ///
    /// Runs on the caller's connection so it joins the tally transaction.
    pub async fn insert_run(
        conn: &mut PgConnection,
        vote_id: DbId,
        stage: Stage,
        tally_run: i32,
        rows: &[OptionTally],
    ) -> Result<Vec<StageResult>, sqlx::Error> {
        let query = format!(
            "INSERT INTO results
                (vote_id, stage, choice_id, tally_run, total_votes, weighted_votes,
                 bkq0_count, bkq1_count, bkq2_count, bkq3_count, is_winner)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING {COLUMNS}"
        );
        let mut inserted = Vec::with_capacity(rows.len());
        for row in rows {
            let [b0, b1, b2, b3] = row.knowledge_breakdown;
            let result = sqlx::query_as::<_, StageResult>(&query)
                .bind(vote_id)
                .bind(stage.number())
                .bind(row.option_id)
                .bind(tally_run)
                .bind(row.total_votes)
                .bind(row.weighted_votes)
                .bind(b0)
                .bind(b1)
                .bind(b2)
                .bind(b3)
                .bind(row.is_winner)
                .fetch_one(&mut *conn)
                .await?;
            inserted.push(result);
        }
        Ok(inserted)
    }

    /// Rows of the latest run for a stage, in ranked order.
    ///
    /// Empty when the stage has never been tallied.
    pub async fn latest(
        pool: &PgPool,
        vote_id: DbId,
        stage: Stage,
    ) -> Result<Vec<StageResult>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM results
             WHERE vote_id = $1 AND stage = $2
               AND tally_run = (
                   SELECT MAX(tally_run) FROM results WHERE vote_id = $1 AND stage = $2
               )
             ORDER BY id ASC"
        );
        sqlx::query_as::<_, StageResult>(&query)
            .bind(vote_id)
            .bind(stage.number())
            .fetch_all(pool)
            .await
    }

    /// Rows of one specific run, in ranked order.
    pub async fn for_run(
        pool: &PgPool,
        vote_id: DbId,
        stage: Stage,
        tally_run: i32,
    ) -> Result<Vec<StageResult>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM results
             WHERE vote_id = $1 AND stage = $2 AND tally_run = $3
             ORDER BY id ASC"
        );
        sqlx::query_as::<_, StageResult>(&query)
            .bind(vote_id)
            .bind(stage.number())
            .bind(tally_run)
            .fetch_all(pool)
            .await
    }

    /// History of runs for a stage, newest first.
    pub async fn list_runs(
        pool: &PgPool,
        vote_id: DbId,
        stage: Stage,
    ) -> Result<Vec<TallyRunSummary>, sqlx::Error> {
        sqlx::query_as::<_, TallyRunSummary>(
            "SELECT tally_run,
                    MIN(created_at) AS created_at,
                    COALESCE(SUM(total_votes), 0)::BIGINT AS counted_ballots,
                    MAX(choice_id) FILTER (WHERE is_winner) AS winner_id
             FROM results
             WHERE vote_id = $1 AND stage = $2
             GROUP BY tally_run
             ORDER BY tally_run DESC",
        )
        .bind(vote_id)
        .bind(stage.number())
        .fetch_all(pool)
        .await
    }
}
