//! Vote status lifecycle and the readiness check for opening a vote.
//!
//! Statuses are stored as strings. Allowed transitions are
//! draft -> open, open -> closed and closed -> open (administrative reopen).

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const STATUS_DRAFT: &str = "draft";
pub const STATUS_OPEN: &str = "open";
pub const STATUS_CLOSED: &str = "closed";

/// All valid vote status strings.
pub const VALID_STATUSES: &[&str] = &[STATUS_DRAFT, STATUS_OPEN, STATUS_CLOSED];

/// Minimum number of stage-1 issues before a vote may open.
pub const MIN_ISSUES_TO_OPEN: usize = 2;

/// Minimum number of well-formed knowledge questions per issue.
pub const MIN_QUESTIONS_PER_OPTION: usize = 3;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteStatus {
    Draft,
    Open,
    Closed,
}

impl VoteStatus {
    /// Convert from a database string value.
    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s {
            STATUS_DRAFT => Ok(Self::Draft),
            STATUS_OPEN => Ok(Self::Open),
            STATUS_CLOSED => Ok(Self::Closed),
            _ => Err(format!(
                "Invalid vote status '{s}'. Must be one of: {}",
                VALID_STATUSES.join(", ")
            )),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => STATUS_DRAFT,
            Self::Open => STATUS_OPEN,
            Self::Closed => STATUS_CLOSED,
        }
    }

    /// Votes voters can see on their dashboard.
    pub fn is_visible_to_voters(self) -> bool {
        matches!(self, Self::Open | Self::Closed)
    }
}

impl std::fmt::Display for VoteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check that `from -> to` is an allowed status transition.
pub fn validate_transition(from: VoteStatus, to: VoteStatus) -> Result<(), CoreError> {
    use VoteStatus::*;
    match (from, to) {
        (Draft, Open) | (Open, Closed) | (Closed, Open) => Ok(()),
        _ => Err(CoreError::InvalidTransition {
            from: from.as_str().to_string(),
            to: to.as_str().to_string(),
        }),
    }
}

// ---------------------------------------------------------------------------
// Readiness to open
// ---------------------------------------------------------------------------

/// Facts about a vote gathered before it may move to `open`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpenReadiness {
    pub stage1_start_set: bool,
    pub population_count: usize,
    /// `(issue_id, well-formed question count)` for every stage-1 issue.
    pub issue_questions: Vec<(DbId, usize)>,
}

impl OpenReadiness {
    /// Every unmet requirement, in a fixed order.
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if !self.stage1_start_set {
            problems.push("stage 1 start time must be set".to_string());
        }
        if self.population_count == 0 {
            problems.push("at least one voter population must be assigned".to_string());
        }
        if self.issue_questions.len() < MIN_ISSUES_TO_OPEN {
            problems.push(format!(
                "at least {MIN_ISSUES_TO_OPEN} issues are required (found {})",
                self.issue_questions.len()
            ));
        }
        for (issue_id, count) in &self.issue_questions {
            if *count < MIN_QUESTIONS_PER_OPTION {
                problems.push(format!(
                    "issue {issue_id} needs at least {MIN_QUESTIONS_PER_OPTION} valid knowledge questions (found {count})"
                ));
            }
        }
        problems
    }

    /// All problems reported together as one validation error.
    pub fn check(&self) -> Result<(), CoreError> {
        let problems = self.problems();
        if problems.is_empty() {
            Ok(())
        } else {
            Err(CoreError::Validation(format!(
                "Vote cannot be opened: {}",
                problems.join("; ")
            )))
        }
    }
}
