//! Repository for the `votes` table.

use agora_core::lifecycle::{VoteStatus, STATUS_CLOSED, STATUS_OPEN};
use agora_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::vote::{CreateVote, Vote};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, description, status, \
    stage1_start, stage1_end, stage2_start, stage2_end, stage3_start, stage3_end, \
    outcome_summary, detail_summary, created_at, updated_at";

/// Provides CRUD operations for votes.
pub struct VoteRepo;

impl VoteRepo {
    /// Insert a new vote in `draft`, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateVote) -> Result<Vote, sqlx::Error> {
        let query = format!(
            "INSERT INTO votes
                (title, description, stage1_start, stage1_end, stage2_start, stage2_end,
                 stage3_start, stage3_end, outcome_summary, detail_summary)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {COLUMNS}"
        );
        let w = &input.windows;
        sqlx::query_as::<_, Vote>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(w.stage1_start)
            .bind(w.stage1_end)
            .bind(w.stage2_start)
            .bind(w.stage2_end)
            .bind(w.stage3_start)
            .bind(w.stage3_end)
            .bind(&input.outcome_summary)
            .bind(&input.detail_summary)
            .fetch_one(pool)
            .await
    }

    /// Find a vote by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Vote>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM votes WHERE id = $1");
        sqlx::query_as::<_, Vote>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a vote and lock its row until the surrounding transaction ends.
    ///
    /// Serialises tally runs for the same vote so run numbers never collide.
    pub async fn lock<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<Option<Vote>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM votes WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Vote>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// List votes with the given status, oldest first.
    pub async fn list_by_status(
        pool: &PgPool,
        status: VoteStatus,
    ) -> Result<Vec<Vote>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM votes WHERE status = $1 ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, Vote>(&query)
            .bind(status.as_str())
            .fetch_all(pool)
            .await
    }

    /// Open or closed votes sharing at least one population with the user,
    /// most recently created first.
    pub async fn list_visible_to_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<Vote>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM votes v
             WHERE v.status IN ($2, $3)
               AND EXISTS (
                   SELECT 1 FROM vote_populations vp
                   JOIN user_populations up ON up.population_id = vp.population_id
                   WHERE vp.vote_id = v.id AND up.user_id = $1
               )
             ORDER BY v.created_at DESC, v.id DESC"
        );
        sqlx::query_as::<_, Vote>(&query)
            .bind(user_id)
            .bind(STATUS_OPEN)
            .bind(STATUS_CLOSED)
            .fetch_all(pool)
            .await
    }

    /// Move a vote from `from` to `to` in one conditional write.
    ///
    /// Returns `None` if the vote does not exist or is no longer in `from`.
    pub async fn transition_status(
        pool: &PgPool,
        id: DbId,
        from: VoteStatus,
        to: VoteStatus,
    ) -> Result<Option<Vote>, sqlx::Error> {
        let query = format!(
            "UPDATE votes SET status = $3
             WHERE id = $1 AND status = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Vote>(&query)
            .bind(id)
            .bind(from.as_str())
            .bind(to.as_str())
            .fetch_optional(pool)
            .await
    }
}
