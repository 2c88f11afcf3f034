//! Population models.

use agora_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `populations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Population {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a population.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePopulation {
    pub name: String,
    pub description: Option<String>,
}
