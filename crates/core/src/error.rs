use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),

    /// A ballot arrived outside the stage's active window (voting closed or not yet open).
    #[error("Voting is closed: stage {stage} is not currently active")]
    StageNotActive { stage: i16 },

    /// One or more knowledge questions for the chosen option were left unanswered.
    #[error("Quiz incomplete: missing answers for questions {}", join_ids(.missing))]
    IncompleteQuiz { missing: Vec<DbId> },

    /// The chosen option is not part of the stage's resolved option set.
    #[error("Option {option_id} is not eligible for stage {stage}")]
    IneligibleOption { option_id: DbId, stage: i16 },

    /// A later stage was requested before its predecessor produced a winner.
    #[error("No winner yet: stage {stage} cannot proceed until the previous stage is tallied")]
    NoWinnerYet { stage: i16 },

    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },
}

fn join_ids(ids: &[DbId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incomplete_quiz_lists_missing_ids() {
        let err = CoreError::IncompleteQuiz {
            missing: vec![4, 9],
        };
        assert_eq!(
            err.to_string(),
            "Quiz incomplete: missing answers for questions 4, 9"
        );
    }

    #[test]
    fn stage_not_active_reads_as_voting_closed() {
        let err = CoreError::StageNotActive { stage: 2 };
        assert!(err.to_string().starts_with("Voting is closed"));
    }
}
