//! Shared helpers for API integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use agora_api::auth::jwt::{generate_access_token, JwtConfig};
use agora_api::config::ServerConfig;
use agora_api::routes;
use agora_api::state::AppState;
use agora_core::ballot::BallotChoice;
use agora_core::lifecycle::VoteStatus;
use agora_core::roles::{ROLE_ADMIN, ROLE_VOTER};
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
use agora_engine::EngineConfig;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method, Request, Response, StatusCode};
use axum::Router;
use chrono::{Duration as ChronoDuration, Utc};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::PgPool;
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Voter ids placed in every seeded vote's population.
pub const VOTERS: std::ops::RangeInclusive<DbId> = 1..=5;

/// A voter outside every population.
pub const OUTSIDER: DbId = 999;

/// Admin user id used for admin tokens.
pub const ADMIN: DbId = 500;

/// Build a test `ServerConfig` with safe defaults and the in-process loop off.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 15,
        },
        engine: EngineConfig::default(),
        auto_tally_interval_secs: None,
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool. Mirrors the construction in `main.rs`.
pub fn build_test_app(pool: PgPool) -> Router {
    let state = AppState {
        pool,
        config: Arc::new(test_config()),
    };

    let cors = CorsLayer::new()
        .allow_origin(["http://localhost:5173".parse().unwrap()])
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600));

    let request_id_header = HeaderName::from_static("x-request-id");

    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors)
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

pub fn voter_token(user_id: DbId) -> String {
    generate_access_token(user_id, ROLE_VOTER, &test_config().jwt).unwrap()
}

pub fn admin_token() -> String {
    generate_access_token(ADMIN, ROLE_ADMIN, &test_config().jwt).unwrap()
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn put_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn hours(h: i64) -> ChronoDuration {
    ChronoDuration::hours(h)
}

pub fn now() -> Timestamp {
    Utc::now()
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

/// Create a draft vote assigned to a population holding [`VOTERS`].
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
pub async fn force_open(pool: &PgPool, vote_id: DbId) {
    VoteRepo::transition_status(pool, vote_id, VoteStatus::Draft, VoteStatus::Open)
        .await
        .unwrap()
        .unwrap();
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

/// A ballot body answering every question right or wrong.
pub fn ballot_body(option_id: DbId, questions: &[KnowledgeQuestion], correct: bool) -> Value {
    let text = if correct { "right" } else { "wrong" };
    let answers: serde_json::Map<String, Value> = questions
        .iter()
        .map(|q| (q.id.to_string(), json!(text)))
        .collect();
    json!({ "option_id": option_id, "answers": answers })
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
