//! Option revision.
//!
//! Once an option's stage has ended its row is frozen: ballots and result
//! snapshots reference it by id. Editing a frozen option creates a new
//! revision carrying the edits and a copy of the original's questions.

use agora_core::eligibility::option_is_frozen;
use agora_core::stage::Stage;
use agora_core::types::{DbId, Timestamp};
use agora_db::models::knowledge_question::CreateKnowledgeQuestion;
use agora_db::models::option::{CreateOption, UpdateOption, VoteOption};
use agora_db::repositories::{KnowledgeQuestionRepo, OptionRepo};
use serde::Serialize;
use sqlx::PgPool;

use crate::eligibility::load_vote;
use crate::error::EngineError;

/// The option after an edit.
#[derive(Debug, Clone, Serialize)]
pub struct RevisionOutcome {
    pub option: VoteOption,
    /// `true` when the edit produced a new row instead of updating in place.
    pub created_revision: bool,
}

/// Apply `edit` to an option, creating a revision if the option is frozen.
pub async fn revise_option(
    pool: &PgPool,
    vote_id: DbId,
    stage: Stage,
    option_id: DbId,
    edit: &UpdateOption,
    now: Timestamp,
) -> Result<RevisionOutcome, EngineError> {
    let vote = load_vote(pool, vote_id).await?;
    let original = OptionRepo::find_by_id(pool, stage, option_id)
        .await?
        .filter(|o| o.vote_id == vote_id)
        .ok_or_else(|| EngineError::not_found(stage.related_type(), option_id))?;

    if !option_is_frozen(&vote.windows(), stage, now) {
        let option = OptionRepo::update(pool, stage, option_id, edit)
            .await?
            .ok_or_else(|| EngineError::not_found(stage.related_type(), option_id))?;
        return Ok(RevisionOutcome {
            option,
            created_revision: false,
        });
    }

    let mut tx = pool.begin().await?;

    let revision = OptionRepo::create(
        &mut *tx,
        stage,
        &CreateOption {
            vote_id,
            parent_id: original.parent_id,
            title: edit.title.clone().unwrap_or_else(|| original.title.clone()),
            description: edit.description.clone().or_else(|| original.description.clone()),
            revised_from_id: Some(original.id),
        },
    )
    .await?;

    let questions = KnowledgeQuestionRepo::list_for_option(&mut *tx, stage, original.id).await?;
    for q in &questions {
        KnowledgeQuestionRepo::create(
            &mut *tx,
            &CreateKnowledgeQuestion {
                related_type: q.related_type.clone(),
                related_id: revision.id,
                question: q.question.clone(),
                options: q.options.clone(),
                correct_answer: q.correct_answer.clone(),
            },
        )
        .await?;
    }

    tx.commit().await?;

    tracing::info!(
        vote_id,
        stage = stage.number(),
        original_id = original.id,
        revision_id = revision.id,
        copied_questions = questions.len(),
        "Frozen option revised as a new row"
    );

    Ok(RevisionOutcome {
        option: revision,
        created_revision: true,
    })
}
