//! Option models shared by the `issues`, `approaches` and `plans` tables.
//!
//! The three tables differ only in their parent column (`issue_id` for
//! approaches, `approach_id` for plans, none for issues), which is read
//! back as `parent_id`.

use agora_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from one of the option tables.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct VoteOption {
    pub id: DbId,
    pub vote_id: DbId,
    pub parent_id: Option<DbId>,
    pub title: String,
    pub description: Option<String>,
    pub is_winner: bool,
    pub revised_from_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating an option. `parent_id` is ignored for issues.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateOption {
    pub vote_id: DbId,
    pub parent_id: Option<DbId>,
    pub title: String,
    pub description: Option<String>,
    pub revised_from_id: Option<DbId>,
}

/// DTO for editing an option. Only non-`None` fields are applied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateOption {
    pub title: Option<String>,
    pub description: Option<String>,
}
