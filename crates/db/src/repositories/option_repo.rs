//! Repository for the option tables: `issues`, `approaches` and `plans`.
//!
//! Every method takes the [`Stage`] that selects the table. The parent
//! column differs per table and is aliased to `parent_id`.

use agora_core::eligibility::OptionScope;
use agora_core::stage::Stage;
use agora_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::option::{CreateOption, UpdateOption, VoteOption};

/// Table holding the options of `stage`.
fn table(stage: Stage) -> &'static str {
    match stage {
        Stage::Issues => "issues",
        Stage::Approaches => "approaches",
        Stage::Plans => "plans",
    }
}

/// Parent column of the stage's table; issues have none.
fn parent_column(stage: Stage) -> Option<&'static str> {
    match stage {
        Stage::Issues => None,
        Stage::Approaches => Some("issue_id"),
        Stage::Plans => Some("approach_id"),
    }
}

/// Column list for `stage`, with the parent column read as `parent_id`.
fn columns(stage: Stage) -> String {
    let parent = parent_column(stage).unwrap_or("NULL::BIGINT");
    format!(
        "id, vote_id, {parent} AS parent_id, title, description, is_winner, \
         revised_from_id, created_at, updated_at"
    )
}

/// Provides CRUD and winner operations for options.
pub struct OptionRepo;

impl OptionRepo {
    /// Insert a new option, returning the created row.
    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        stage: Stage,
        input: &CreateOption,
    ) -> Result<VoteOption, sqlx::Error> {
        let table = table(stage);
        let cols = columns(stage);
        match parent_column(stage) {
            Some(parent) => {
                let query = format!(
                    "INSERT INTO {table} (vote_id, {parent}, title, description, revised_from_id)
                     VALUES ($1, $2, $3, $4, $5)
                     RETURNING {cols}"
                );
                sqlx::query_as::<_, VoteOption>(&query)
                    .bind(input.vote_id)
                    .bind(input.parent_id)
                    .bind(&input.title)
                    .bind(&input.description)
                    .bind(input.revised_from_id)
                    .fetch_one(executor)
                    .await
            }
            None => {
                let query = format!(
                    "INSERT INTO {table} (vote_id, title, description, revised_from_id)
                     VALUES ($1, $2, $3, $4)
                     RETURNING {cols}"
                );
                sqlx::query_as::<_, VoteOption>(&query)
                    .bind(input.vote_id)
                    .bind(&input.title)
                    .bind(&input.description)
                    .bind(input.revised_from_id)
                    .fetch_one(executor)
                    .await
            }
        }
    }

    /// Find an option of `stage` by its ID.
    pub async fn find_by_id(
        pool: &PgPool,
        stage: Stage,
        id: DbId,
    ) -> Result<Option<VoteOption>, sqlx::Error> {
        let query = format!("SELECT {} FROM {} WHERE id = $1", columns(stage), table(stage));
        sqlx::query_as::<_, VoteOption>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List every option of `stage` under a vote, oldest first.
    pub async fn list_for_vote(
        pool: &PgPool,
        stage: Stage,
        vote_id: DbId,
    ) -> Result<Vec<VoteOption>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM {} WHERE vote_id = $1 ORDER BY created_at ASC, id ASC",
            columns(stage),
            table(stage)
        );
        sqlx::query_as::<_, VoteOption>(&query)
            .bind(vote_id)
            .fetch_all(pool)
            .await
    }

    /// List the options of `stage` inside `scope`, oldest first.
    pub async fn list_in_scope<'e>(
        executor: impl PgExecutor<'e>,
        stage: Stage,
        vote_id: DbId,
        scope: OptionScope,
    ) -> Result<Vec<VoteOption>, sqlx::Error> {
        let cols = columns(stage);
        let table = table(stage);
        match (parent_column(stage), scope.parent_id()) {
            (Some(parent), Some(parent_id)) => {
                let query = format!(
                    "SELECT {cols} FROM {table}
                     WHERE vote_id = $1 AND {parent} = $2
                     ORDER BY created_at ASC, id ASC"
                );
                sqlx::query_as::<_, VoteOption>(&query)
                    .bind(vote_id)
                    .bind(parent_id)
                    .fetch_all(executor)
                    .await
            }
            _ => {
                let query = format!(
                    "SELECT {cols} FROM {table}
                     WHERE vote_id = $1
                     ORDER BY created_at ASC, id ASC"
                );
                sqlx::query_as::<_, VoteOption>(&query)
                    .bind(vote_id)
                    .fetch_all(executor)
                    .await
            }
        }
    }

    /// The flagged winner of `stage` within `scope`, if any.
    ///
    /// Only one option per stage and vote carries the flag; the lowest id
    /// is returned should data ever disagree.
    pub async fn find_winner<'e>(
        executor: impl PgExecutor<'e>,
        stage: Stage,
        vote_id: DbId,
        scope: OptionScope,
    ) -> Result<Option<VoteOption>, sqlx::Error> {
        let cols = columns(stage);
        let table = table(stage);
        match (parent_column(stage), scope.parent_id()) {
            (Some(parent), Some(parent_id)) => {
                let query = format!(
                    "SELECT {cols} FROM {table}
                     WHERE vote_id = $1 AND {parent} = $2 AND is_winner = true
                     ORDER BY id ASC LIMIT 1"
                );
                sqlx::query_as::<_, VoteOption>(&query)
                    .bind(vote_id)
                    .bind(parent_id)
                    .fetch_optional(executor)
                    .await
            }
            _ => {
                let query = format!(
                    "SELECT {cols} FROM {table}
                     WHERE vote_id = $1 AND is_winner = true
                     ORDER BY id ASC LIMIT 1"
                );
                sqlx::query_as::<_, VoteOption>(&query)
                    .bind(vote_id)
                    .fetch_optional(executor)
                    .await
            }
        }
    }

    /// Clear the winner flag on every option of `stage` for the vote.
    pub async fn reset_winners<'e>(
        executor: impl PgExecutor<'e>,
        stage: Stage,
        vote_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let query = format!(
            "UPDATE {} SET is_winner = false WHERE vote_id = $1 AND is_winner = true",
            table(stage)
        );
        let result = sqlx::query(&query).bind(vote_id).execute(executor).await?;
        Ok(result.rows_affected())
    }

    /// Flag one option as the stage winner. Returns `true` if the row exists.
    pub async fn set_winner<'e>(
        executor: impl PgExecutor<'e>,
        stage: Stage,
        id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let query = format!("UPDATE {} SET is_winner = true WHERE id = $1", table(stage));
        let result = sqlx::query(&query).bind(id).execute(executor).await?;
        Ok(result.rows_affected() > 0)
    }

    /// Update an option in place. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        stage: Stage,
        id: DbId,
        input: &UpdateOption,
    ) -> Result<Option<VoteOption>, sqlx::Error> {
        let query = format!(
            "UPDATE {} SET
                title = COALESCE($2, title),
                description = COALESCE($3, description)
             WHERE id = $1
             RETURNING {}",
            table(stage),
            columns(stage)
        );
        sqlx::query_as::<_, VoteOption>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .fetch_optional(pool)
            .await
    }
}
