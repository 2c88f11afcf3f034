//! Vote status transitions.

use agora_core::error::CoreError;
use agora_core::lifecycle::{validate_transition, OpenReadiness, VoteStatus};
use agora_core::stage::{validate_windows, Stage};
use agora_core::types::DbId;
use agora_db::models::vote::Vote;
use agora_db::repositories::{KnowledgeQuestionRepo, OptionRepo, PopulationRepo, VoteRepo};
use sqlx::PgPool;

use crate::ballot::prepare_quiz;
use crate::eligibility::load_vote;
use crate::error::EngineError;

/// Gather what the readiness check needs to know about a vote.
pub async fn open_readiness(pool: &PgPool, vote: &Vote) -> Result<OpenReadiness, EngineError> {
    let populations = PopulationRepo::ids_for_vote(pool, vote.id).await?;
    let issues = OptionRepo::list_for_vote(pool, Stage::Issues, vote.id).await?;
    let issue_ids: Vec<DbId> = issues.iter().map(|i| i.id).collect();
    let stored = KnowledgeQuestionRepo::list_for_options(pool, Stage::Issues, &issue_ids).await?;
    let quiz = prepare_quiz(&stored);

    let issue_questions = issue_ids
        .iter()
        .map(|&issue_id| {
            let well_formed = stored
                .iter()
                .zip(&quiz)
                .filter(|(row, q)| row.related_id == issue_id && q.is_well_formed())
                .count();
            (issue_id, well_formed)
        })
        .collect();

    Ok(OpenReadiness {
        stage1_start_set: vote.stage1_start.is_some(),
        population_count: populations.len(),
        issue_questions,
    })
}

/// Move a vote to `target`.
///
/// Opening a vote requires valid stage windows and a passing readiness
/// check. The write is conditional on the status read here, so a
/// concurrent change surfaces as a conflict.
pub async fn change_status(
    pool: &PgPool,
    vote_id: DbId,
    target: VoteStatus,
) -> Result<Vote, EngineError> {
    let vote = load_vote(pool, vote_id).await?;
    let current = vote.status().map_err(CoreError::Internal)?;
    validate_transition(current, target)?;

    if target == VoteStatus::Open {
        validate_windows(&vote.windows()).map_err(CoreError::Validation)?;
        open_readiness(pool, &vote).await?.check()?;
    }

    let updated = VoteRepo::transition_status(pool, vote_id, current, target)
        .await?
        .ok_or_else(|| {
            CoreError::Conflict(format!("Vote {vote_id} changed status concurrently"))
        })?;

    tracing::info!(
        vote_id,
        from = %current,
        to = %target,
        "Vote status changed"
    );

    Ok(updated)
}
