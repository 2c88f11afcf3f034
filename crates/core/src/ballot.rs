//! Ballot choice encoding.
//!
//! A ballot stores its choice in the column matching its stage
//! (`issue_id`, `approach_id` or `plan_id`); the other two stay null.

use serde::Serialize;

use crate::stage::Stage;
use crate::types::DbId;

/// The three choice columns of a ballot, exactly one of them set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BallotChoice {
    pub issue_id: Option<DbId>,
    pub approach_id: Option<DbId>,
    pub plan_id: Option<DbId>,
}

impl BallotChoice {
    pub fn for_stage(stage: Stage, option_id: DbId) -> Self {
        let mut choice = Self {
            issue_id: None,
            approach_id: None,
            plan_id: None,
        };
        match stage {
            Stage::Issues => choice.issue_id = Some(option_id),
            Stage::Approaches => choice.approach_id = Some(option_id),
            Stage::Plans => choice.plan_id = Some(option_id),
        }
        choice
    }

    /// The chosen option, whichever column holds it.
    pub fn option_id(&self) -> Option<DbId> {
        self.issue_id.or(self.approach_id).or(self.plan_id)
    }
}
