//! Repository for `populations` and the two membership tables.

use agora_core::types::DbId;
use sqlx::PgPool;

use crate::models::population::{CreatePopulation, Population};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, description, created_at, updated_at";

/// Provides population and membership operations.
pub struct PopulationRepo;

impl PopulationRepo {
    /// Insert a new population, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreatePopulation,
    ) -> Result<Population, sqlx::Error> {
        let query = format!(
            "INSERT INTO populations (name, description)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Population>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .fetch_one(pool)
            .await
    }

    /// Add a voter to a population. Adding an existing member is a no-op.
    pub async fn add_user(
        pool: &PgPool,
        user_id: DbId,
        population_id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO user_populations (user_id, population_id) VALUES ($1, $2)
             ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(population_id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Open a vote to a population. Assigning twice is a no-op.
    pub async fn assign_to_vote(
        pool: &PgPool,
        vote_id: DbId,
        population_id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO vote_populations (vote_id, population_id) VALUES ($1, $2)
             ON CONFLICT DO NOTHING",
        )
        .bind(vote_id)
        .bind(population_id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Population ids the voter belongs to.
    pub async fn ids_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<DbId>, sqlx::Error> {
        let rows: Vec<(DbId,)> = sqlx::query_as(
            "SELECT population_id FROM user_populations WHERE user_id = $1 ORDER BY population_id",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Population ids a vote is assigned to.
    pub async fn ids_for_vote(pool: &PgPool, vote_id: DbId) -> Result<Vec<DbId>, sqlx::Error> {
        let rows: Vec<(DbId,)> = sqlx::query_as(
            "SELECT population_id FROM vote_populations WHERE vote_id = $1 ORDER BY population_id",
        )
        .bind(vote_id)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}
