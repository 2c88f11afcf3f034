//! Shared fixtures for engine integration tests.

#![allow(dead_code)]

use std::collections::HashMap;

use agora_core::ballot::BallotChoice;
use agora_core::lifecycle::VoteStatus;
use agora_core::stage::{Stage, StageWindows};
use agora_core::types::{DbId, Timestamp};
use agora_db::models::ballot::UpsertBallot;
use agora_db::models::knowledge_question::{CreateKnowledgeQuestion, KnowledgeQuestion};
use agora_db::models::option::{CreateOption, VoteOption};
use agora_db::models::population::CreatePopulation;
use agora_db::models::vote::{CreateVote, Vote};
use agora_db::repositories::{
    BallotRepo, KnowledgeQuestionRepo, OptionRepo, PopulationRepo, VoteRepo,
};
use chrono::{Duration, Utc};
use serde_json::json;
use sqlx::PgPool;

/// Voter ids seeded into the vote's population.
pub const VOTERS: std::ops::RangeInclusive<DbId> = 1..=20;

/// A voter outside every population.
pub const OUTSIDER: DbId = 999;

pub fn hours(h: i64) -> Duration {
    Duration::hours(h)
}

/// Windows with stage 1 running now and later stages in the future.
pub fn stage1_running(now: Timestamp) -> StageWindows {
    StageWindows {
        stage1_start: Some(now - hours(1)),
        stage1_end: Some(now + hours(1)),
        stage2_start: Some(now + hours(2)),
        stage2_end: Some(now + hours(3)),
        stage3_start: Some(now + hours(4)),
        stage3_end: Some(now + hours(5)),
    }
}

/// Windows with stage 1 over and stage 2 running now.
pub fn stage2_running(now: Timestamp) -> StageWindows {
    StageWindows {
        stage1_start: Some(now - hours(3)),
        stage1_end: Some(now - hours(2)),
        stage2_start: Some(now - hours(1)),
        stage2_end: Some(now + hours(1)),
        stage3_start: Some(now + hours(2)),
        stage3_end: Some(now + hours(3)),
    }
}

/// Create a vote in `draft`, assigned to a population holding [`VOTERS`].
pub async fn seed_vote(pool: &PgPool, title: &str, windows: StageWindows) -> Vote {
    let vote = VoteRepo::create(
        pool,
        &CreateVote {
            title: title.to_string(),
            windows,
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let pop = PopulationRepo::create(
        pool,
        &CreatePopulation {
            name: format!("{title} residents"),
            description: None,
        },
    )
    .await
    .unwrap();
    PopulationRepo::assign_to_vote(pool, vote.id, pop.id).await.unwrap();
    for voter in VOTERS {
        PopulationRepo::add_user(pool, voter, pop.id).await.unwrap();
    }
    vote
}

/// Move a vote straight to `open`, skipping the readiness check.
pub async fn force_open(pool: &PgPool, vote_id: DbId) -> Vote {
    VoteRepo::transition_status(pool, vote_id, VoteStatus::Draft, VoteStatus::Open)
        .await
        .unwrap()
        .unwrap()
}

pub async fn add_option(
    pool: &PgPool,
    stage: Stage,
    vote_id: DbId,
    parent_id: Option<DbId>,
    title: &str,
) -> VoteOption {
    OptionRepo::create(
        pool,
        stage,
        &CreateOption {
            vote_id,
            parent_id,
            title: title.to_string(),
            ..Default::default()
        },
    )
    .await
    .unwrap()
}

/// Add `n` questions whose correct answer is choice 0 ("right").
pub async fn add_questions(
    pool: &PgPool,
    stage: Stage,
    option_id: DbId,
    n: usize,
) -> Vec<KnowledgeQuestion> {
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let q = KnowledgeQuestionRepo::create(
            pool,
            &CreateKnowledgeQuestion {
                related_type: stage.related_type().to_string(),
                related_id: option_id,
                question: format!("Question {i}?"),
                options: json!(["right", "wrong"]),
                correct_answer: Some(json!(0)),
            },
        )
        .await
        .unwrap();
        out.push(q);
    }
    out
}

/// Answers for every question, all right or all wrong.
pub fn answers(questions: &[KnowledgeQuestion], correct: bool) -> HashMap<DbId, String> {
    let text = if correct { "right" } else { "wrong" };
    questions.iter().map(|q| (q.id, text.to_string())).collect()
}

/// Store a ballot directly, bypassing submission checks.
pub async fn cast(
    pool: &PgPool,
    voter: DbId,
    vote_id: DbId,
    stage: Stage,
    option_id: DbId,
    knowledge_score: i32,
) {
    BallotRepo::upsert(
        pool,
        &UpsertBallot {
            user_id: voter,
            vote_id,
            stage,
            choice: BallotChoice::for_stage(stage, option_id),
            knowledge_score,
        },
    )
    .await
    .unwrap();
}

pub fn now() -> Timestamp {
    Utc::now()
}
