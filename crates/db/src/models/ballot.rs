//! Ballot models for the `user_votes` table.

use agora_core::ballot::BallotChoice;
use agora_core::stage::Stage;
use agora_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `user_votes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Ballot {
    pub id: DbId,
    pub user_id: DbId,
    pub vote_id: DbId,
    pub stage: i16,
    pub issue_id: Option<DbId>,
    pub approach_id: Option<DbId>,
    pub plan_id: Option<DbId>,
    pub knowledge_score: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Ballot {
    pub fn choice(&self) -> BallotChoice {
        BallotChoice {
            issue_id: self.issue_id,
            approach_id: self.approach_id,
            plan_id: self.plan_id,
        }
    }
}

/// Input for the ballot upsert.
#[derive(Debug, Clone)]
pub struct UpsertBallot {
    pub user_id: DbId,
    pub vote_id: DbId,
    pub stage: Stage,
    pub choice: BallotChoice,
    pub knowledge_score: i32,
}

/// The chosen option and score of one ballot, as read by the tally.
#[derive(Debug, Clone, Copy, FromRow)]
pub struct BallotScoreRow {
    pub option_id: DbId,
    pub knowledge_score: i32,
}
