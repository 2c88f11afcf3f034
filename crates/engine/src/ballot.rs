//! Ballot submission.

use std::collections::HashMap;

use agora_core::ballot::BallotChoice;
use agora_core::error::CoreError;
use agora_core::lifecycle::VoteStatus;
use agora_core::quiz::{missing_answers, score_answers, QuizQuestion};
use agora_core::stage::{active_stage, Stage};
use agora_core::types::{DbId, Timestamp};
use agora_db::models::ballot::{Ballot, UpsertBallot};
use agora_db::models::knowledge_question::KnowledgeQuestion;
use agora_db::repositories::{BallotRepo, KnowledgeQuestionRepo};
use sqlx::PgPool;

use crate::config::EngineConfig;
use crate::eligibility::{ensure_voter_access, load_vote, scoped_options};
use crate::error::EngineError;

/// A voter's ballot as submitted.
#[derive(Debug, Clone)]
pub struct SubmitBallot {
    pub voter_id: DbId,
    pub vote_id: DbId,
    pub stage: Stage,
    pub option_id: DbId,
    /// Answer text keyed by knowledge question id.
    pub answers: HashMap<DbId, String>,
}

/// Classify stored questions for scoring, logging any unusable answer key.
pub(crate) fn prepare_quiz(questions: &[KnowledgeQuestion]) -> Vec<QuizQuestion> {
    questions
        .iter()
        .map(|q| {
            let quiz = q.to_quiz();
            if quiz.key.is_malformed() {
                tracing::warn!(
                    question_id = q.id,
                    related_type = %q.related_type,
                    related_id = q.related_id,
                    "Malformed answer key; question always scores as incorrect"
                );
            }
            quiz
        })
        .collect()
}

/// Validate, score and record a ballot.
///
/// Checks run in order: the vote exists, the voter shares a population with
/// it, the vote is open and `stage` is its active stage at `now`, the option
/// is eligible in that stage, and every question of the option is answered.
/// A resubmission for the same stage replaces the earlier ballot.
pub async fn submit_ballot(
    pool: &PgPool,
    config: &EngineConfig,
    input: &SubmitBallot,
    now: Timestamp,
) -> Result<Ballot, EngineError> {
    let stage = input.stage;
    let vote = load_vote(pool, input.vote_id).await?;
    ensure_voter_access(pool, input.voter_id, vote.id).await?;

    let is_open = vote.status().is_ok_and(|s| s == VoteStatus::Open);
    if !is_open || active_stage(&vote.windows(), now) != Some(stage) {
        return Err(CoreError::StageNotActive {
            stage: stage.number(),
        }
        .into());
    }

    let mut conn = pool.acquire().await?;
    let options = scoped_options(&mut conn, vote.id, stage).await?;
    drop(conn);
    if !options.iter().any(|o| o.id == input.option_id) {
        return Err(CoreError::IneligibleOption {
            option_id: input.option_id,
            stage: stage.number(),
        }
        .into());
    }

    let questions = KnowledgeQuestionRepo::list_for_option(pool, stage, input.option_id).await?;
    let quiz = prepare_quiz(&questions);
    let missing = missing_answers(&quiz, &input.answers);
    if !missing.is_empty() {
        return Err(CoreError::IncompleteQuiz { missing }.into());
    }

    let knowledge_score = score_answers(&quiz, &input.answers, config.scoring);
    let ballot = BallotRepo::upsert(
        pool,
        &UpsertBallot {
            user_id: input.voter_id,
            vote_id: vote.id,
            stage,
            choice: BallotChoice::for_stage(stage, input.option_id),
            knowledge_score,
        },
    )
    .await?;

    tracing::info!(
        vote_id = vote.id,
        stage = stage.number(),
        voter_id = input.voter_id,
        option_id = input.option_id,
        knowledge_score,
        question_count = quiz.len(),
        "Ballot recorded"
    );

    Ok(ballot)
}

/// The voter's current ballot for a stage, if any.
pub async fn find_ballot(
    pool: &PgPool,
    voter_id: DbId,
    vote_id: DbId,
    stage: Stage,
) -> Result<Option<Ballot>, EngineError> {
    Ok(BallotRepo::find(pool, voter_id, vote_id, stage).await?)
}
