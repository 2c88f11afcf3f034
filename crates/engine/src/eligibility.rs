//! Option resolution and voter access.
//!
//! A stage's options depend on the persisted winner of the stage before
//! it: approaches under the winning issue, plans under the winning approach
//! of that issue. Until the previous stage has been tallied the later stage
//! has nothing to vote on, whatever its time window says.

use agora_core::eligibility::{shares_population, OptionScope};
use agora_core::error::CoreError;
use agora_core::stage::Stage;
use agora_core::types::DbId;
use agora_db::models::knowledge_question::QuestionView;
use agora_db::models::option::VoteOption;
use agora_db::models::vote::Vote;
use agora_db::repositories::{KnowledgeQuestionRepo, OptionRepo, PopulationRepo, VoteRepo};
use serde::Serialize;
use sqlx::{PgConnection, PgPool};

use crate::error::EngineError;

/// An eligible option together with its quiz, answer keys withheld.
#[derive(Debug, Clone, Serialize)]
pub struct OptionWithQuestions {
    #[serde(flatten)]
    pub option: VoteOption,
    pub questions: Vec<QuestionView>,
}

/// Follow the winner chain to the scope of `stage`.
///
/// `None` when a required predecessor winner does not exist yet.
pub async fn resolve_scope(
    conn: &mut PgConnection,
    vote_id: DbId,
    stage: Stage,
) -> Result<Option<OptionScope>, sqlx::Error> {
    let winner = match stage {
        Stage::Issues => None,
        Stage::Approaches => {
            OptionRepo::find_winner(&mut *conn, Stage::Issues, vote_id, OptionScope::Vote)
                .await?
                .map(|issue| issue.id)
        }
        Stage::Plans => {
            let Some(issue) =
                OptionRepo::find_winner(&mut *conn, Stage::Issues, vote_id, OptionScope::Vote)
                    .await?
            else {
                return Ok(None);
            };
            OptionRepo::find_winner(
                &mut *conn,
                Stage::Approaches,
                vote_id,
                OptionScope::UnderIssue(issue.id),
            )
            .await?
            .map(|approach| approach.id)
        }
    };
    Ok(OptionScope::for_stage(stage, winner))
}

/// Options votable in `stage`, empty while the previous stage has no winner.
pub async fn options_for_stage(
    pool: &PgPool,
    vote_id: DbId,
    stage: Stage,
) -> Result<Vec<VoteOption>, EngineError> {
    let mut conn = pool.acquire().await?;
    scoped_options(&mut conn, vote_id, stage).await
}

/// Like [`options_for_stage`], but a missing predecessor winner is an error.
pub async fn require_options_for_stage(
    conn: &mut PgConnection,
    vote_id: DbId,
    stage: Stage,
) -> Result<Vec<VoteOption>, EngineError> {
    let scope = resolve_scope(&mut *conn, vote_id, stage)
        .await?
        .ok_or(CoreError::NoWinnerYet {
            stage: stage.number(),
        })?;
    Ok(OptionRepo::list_in_scope(&mut *conn, stage, vote_id, scope).await?)
}

pub(crate) async fn scoped_options(
    conn: &mut PgConnection,
    vote_id: DbId,
    stage: Stage,
) -> Result<Vec<VoteOption>, EngineError> {
    match resolve_scope(&mut *conn, vote_id, stage).await? {
        Some(scope) => Ok(OptionRepo::list_in_scope(&mut *conn, stage, vote_id, scope).await?),
        None => Ok(Vec::new()),
    }
}

/// Eligible options of a stage with their questions, for the voting page.
pub async fn options_with_questions(
    pool: &PgPool,
    vote_id: DbId,
    stage: Stage,
) -> Result<Vec<OptionWithQuestions>, EngineError> {
    let options = options_for_stage(pool, vote_id, stage).await?;
    let ids: Vec<DbId> = options.iter().map(|o| o.id).collect();
    let questions = KnowledgeQuestionRepo::list_for_options(pool, stage, &ids).await?;

    Ok(options
        .into_iter()
        .map(|option| {
            let questions = questions
                .iter()
                .filter(|q| q.related_id == option.id)
                .map(QuestionView::from)
                .collect();
            OptionWithQuestions { option, questions }
        })
        .collect())
}

/// Votes the user may see: open or closed, sharing a population.
pub async fn visible_votes(pool: &PgPool, user_id: DbId) -> Result<Vec<Vote>, EngineError> {
    Ok(VoteRepo::list_visible_to_user(pool, user_id).await?)
}

/// Reject a voter who shares no population with the vote.
pub async fn ensure_voter_access(
    pool: &PgPool,
    user_id: DbId,
    vote_id: DbId,
) -> Result<(), EngineError> {
    let voter = PopulationRepo::ids_for_user(pool, user_id).await?;
    let vote = PopulationRepo::ids_for_vote(pool, vote_id).await?;
    if shares_population(&voter, &vote) {
        Ok(())
    } else {
        Err(CoreError::Forbidden(format!("Vote {vote_id} is not open to your population")).into())
    }
}

/// Load a vote or fail with `NotFound`.
pub async fn load_vote(pool: &PgPool, vote_id: DbId) -> Result<Vote, EngineError> {
    VoteRepo::find_by_id(pool, vote_id)
        .await?
        .ok_or_else(|| EngineError::not_found("vote", vote_id))
}
