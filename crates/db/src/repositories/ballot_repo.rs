//! Repository for the `user_votes` table.

use agora_core::stage::Stage;
use agora_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::ballot::{Ballot, BallotScoreRow, UpsertBallot};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, vote_id, stage, issue_id, approach_id, plan_id, \
    knowledge_score, created_at, updated_at";

/// Provides ballot storage.
pub struct BallotRepo;

impl BallotRepo {
    /// Record a voter's ballot for a stage, replacing any earlier one.
    ///
    /// A single `INSERT ... ON CONFLICT` statement, so concurrent
    /// resubmissions by the same voter cannot leave two rows.
    pub async fn upsert(pool: &PgPool, input: &UpsertBallot) -> Result<Ballot, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_votes
                (user_id, vote_id, stage, issue_id, approach_id, plan_id, knowledge_score)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             ON CONFLICT ON CONSTRAINT uq_user_votes_voter_stage DO UPDATE SET
                issue_id = EXCLUDED.issue_id,
                approach_id = EXCLUDED.approach_id,
                plan_id = EXCLUDED.plan_id,
                knowledge_score = EXCLUDED.knowledge_score
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Ballot>(&query)
            .bind(input.user_id)
            .bind(input.vote_id)
            .bind(input.stage.number())
            .bind(input.choice.issue_id)
            .bind(input.choice.approach_id)
            .bind(input.choice.plan_id)
            .bind(input.knowledge_score)
            .fetch_one(pool)
            .await
    }

    /// The voter's current ballot for a stage.
    pub async fn find(
        pool: &PgPool,
        user_id: DbId,
        vote_id: DbId,
        stage: Stage,
    ) -> Result<Option<Ballot>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM user_votes
             WHERE user_id = $1 AND vote_id = $2 AND stage = $3"
        );
        sqlx::query_as::<_, Ballot>(&query)
            .bind(user_id)
            .bind(vote_id)
            .bind(stage.number())
            .fetch_optional(pool)
            .await
    }

    /// Every ballot of a stage reduced to its option and score, in one read.
    pub async fn list_scores<'e>(
        executor: impl PgExecutor<'e>,
        vote_id: DbId,
        stage: Stage,
    ) -> Result<Vec<BallotScoreRow>, sqlx::Error> {
        sqlx::query_as::<_, BallotScoreRow>(
            "SELECT COALESCE(issue_id, approach_id, plan_id) AS option_id, knowledge_score
             FROM user_votes
             WHERE vote_id = $1 AND stage = $2
             ORDER BY id ASC",
        )
        .bind(vote_id)
        .bind(stage.number())
        .fetch_all(executor)
        .await
    }
}
