//! Vote models.

use agora_core::lifecycle::VoteStatus;
use agora_core::stage::StageWindows;
use agora_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `votes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Vote {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub stage1_start: Option<Timestamp>,
    pub stage1_end: Option<Timestamp>,
    pub stage2_start: Option<Timestamp>,
    pub stage2_end: Option<Timestamp>,
    pub stage3_start: Option<Timestamp>,
    pub stage3_end: Option<Timestamp>,
    pub outcome_summary: Option<String>,
    pub detail_summary: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Vote {
    pub fn windows(&self) -> StageWindows {
        StageWindows {
            stage1_start: self.stage1_start,
            stage1_end: self.stage1_end,
            stage2_start: self.stage2_start,
            stage2_end: self.stage2_end,
            stage3_start: self.stage3_start,
            stage3_end: self.stage3_end,
        }
    }

    /// Parsed status. The column is constrained, so this only fails on
    /// rows written outside the migrations' CHECK.
    pub fn status(&self) -> Result<VoteStatus, String> {
        VoteStatus::from_str_value(&self.status)
    }
}

/// DTO for creating a vote. New votes always start in `draft`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateVote {
    pub title: String,
    pub description: Option<String>,
    #[serde(flatten)]
    pub windows: StageWindows,
    pub outcome_summary: Option<String>,
    pub detail_summary: Option<String>,
}

/// Request body for a status transition.
#[derive(Debug, Clone, Deserialize)]
pub struct ChangeStatusRequest {
    pub status: VoteStatus,
}
