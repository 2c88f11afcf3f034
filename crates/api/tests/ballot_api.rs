//! HTTP-level tests for the voter endpoints: listing, options, ballots.

mod common;

use agora_core::stage::Stage;
use axum::http::StatusCode;
use common::*;
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Listing and visibility
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_votes_only_shows_open_votes_in_population(pool: PgPool) {
    let now = now();
    let open = seed_vote(&pool, "Transit", stage1_running(now)).await;
    force_open(&pool, open.id).await;
    seed_vote(&pool, "Draft plan", stage1_running(now)).await;

    let app = build_test_app(pool.clone());
    let json = body_json(get_auth(app, "/api/v1/votes", &voter_token(1)).await).await;
    let ids: Vec<i64> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![open.id]);

    let app = build_test_app(pool);
    let json = body_json(get_auth(app, "/api/v1/votes", &voter_token(OUTSIDER)).await).await;
    assert!(json["data"].as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_draft_vote_is_hidden_from_voters(pool: PgPool) {
    let vote = seed_vote(&pool, "Draft", stage1_running(now())).await;

    let app = build_test_app(pool);
    let uri = format!("/api/v1/votes/{}/stage", vote.id);
    let response = get_auth(app, &uri, &voter_token(1)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_active_stage_reported(pool: PgPool) {
    let vote = seed_vote(&pool, "Parks", stage2_running(now())).await;
    force_open(&pool, vote.id).await;

    let app = build_test_app(pool);
    let uri = format!("/api/v1/votes/{}/stage", vote.id);
    let response = get_auth(app, &uri, &voter_token(2)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["active_stage"], 2);
    assert_eq!(json["data"]["status"], "open");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_invalid_stage_number_is_bad_request(pool: PgPool) {
    let vote = seed_vote(&pool, "Parks", stage1_running(now())).await;
    force_open(&pool, vote.id).await;

    let app = build_test_app(pool);
    let uri = format!("/api/v1/votes/{}/stages/4/options", vote.id);
    let response = get_auth(app, &uri, &voter_token(1)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_options_include_questions_without_answer_keys(pool: PgPool) {
    let vote = seed_vote(&pool, "Library", stage1_running(now())).await;
    force_open(&pool, vote.id).await;
    let issue = add_option(&pool, Stage::Issues, vote.id, None, "Opening hours").await;
    add_questions(&pool, Stage::Issues, issue.id, 3).await;

    let app = build_test_app(pool);
    let uri = format!("/api/v1/votes/{}/stages/1/options", vote.id);
    let json = body_json(get_auth(app, &uri, &voter_token(1)).await).await;

    let options = json["data"].as_array().unwrap();
    assert_eq!(options.len(), 1);
    assert_eq!(options[0]["title"], "Opening hours");
    let questions = options[0]["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 3);
    for q in questions {
        assert!(q.get("correct_answer").is_none());
        assert_eq!(q["choices"], json!(["right", "wrong"]));
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_later_stage_options_empty_without_winner(pool: PgPool) {
    let vote = seed_vote(&pool, "Library", stage2_running(now())).await;
    force_open(&pool, vote.id).await;
    let issue = add_option(&pool, Stage::Issues, vote.id, None, "Hours").await;
    add_option(&pool, Stage::Approaches, vote.id, Some(issue.id), "Extend").await;

    let app = build_test_app(pool);
    let uri = format!("/api/v1/votes/{}/stages/2/options", vote.id);
    let json = body_json(get_auth(app, &uri, &voter_token(1)).await).await;
    assert!(json["data"].as_array().unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Ballots
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_submit_and_read_back_ballot(pool: PgPool) {
    let vote = seed_vote(&pool, "Library", stage1_running(now())).await;
    force_open(&pool, vote.id).await;
    let issue = add_option(&pool, Stage::Issues, vote.id, None, "Hours").await;
    let questions = add_questions(&pool, Stage::Issues, issue.id, 3).await;

    let uri = format!("/api/v1/votes/{}/stages/1/ballot", vote.id);
    let app = build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        &uri,
        ballot_body(issue.id, &questions, true),
        &voter_token(3),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["issue_id"], issue.id);
    assert_eq!(json["data"]["knowledge_score"], 3);

    let app = build_test_app(pool);
    let json = body_json(get_auth(app, &uri, &voter_token(3)).await).await;
    assert_eq!(json["data"]["issue_id"], issue.id);
    assert_eq!(json["data"]["user_id"], 3);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_missing_ballot_reads_as_null(pool: PgPool) {
    let vote = seed_vote(&pool, "Library", stage1_running(now())).await;
    force_open(&pool, vote.id).await;

    let app = build_test_app(pool);
    let uri = format!("/api/v1/votes/{}/stages/1/ballot", vote.id);
    let response = get_auth(app, &uri, &voter_token(1)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_json(response).await["data"].is_null());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_incomplete_quiz_is_unprocessable(pool: PgPool) {
    let vote = seed_vote(&pool, "Library", stage1_running(now())).await;
    force_open(&pool, vote.id).await;
    let issue = add_option(&pool, Stage::Issues, vote.id, None, "Hours").await;
    let questions = add_questions(&pool, Stage::Issues, issue.id, 3).await;

    let app = build_test_app(pool);
    let uri = format!("/api/v1/votes/{}/stages/1/ballot", vote.id);
    let response = post_json_auth(
        app,
        &uri,
        ballot_body(issue.id, &questions[..2], true),
        &voter_token(1),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert_eq!(json["code"], "INCOMPLETE_QUIZ");
    assert!(json["error"]
        .as_str()
        .unwrap()
        .contains(&questions[2].id.to_string()));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_ballot_for_inactive_stage_is_conflict(pool: PgPool) {
    let vote = seed_vote(&pool, "Library", stage1_running(now())).await;
    force_open(&pool, vote.id).await;
    let issue = add_option(&pool, Stage::Issues, vote.id, None, "Hours").await;
    let approach = add_option(&pool, Stage::Approaches, vote.id, Some(issue.id), "Extend").await;

    let app = build_test_app(pool);
    let uri = format!("/api/v1/votes/{}/stages/2/ballot", vote.id);
    let response = post_json_auth(
        app,
        &uri,
        json!({ "option_id": approach.id, "answers": {} }),
        &voter_token(1),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "STAGE_NOT_ACTIVE");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_ineligible_option_is_unprocessable(pool: PgPool) {
    let vote = seed_vote(&pool, "Library", stage1_running(now())).await;
    force_open(&pool, vote.id).await;
    add_option(&pool, Stage::Issues, vote.id, None, "Hours").await;

    let other = seed_vote(&pool, "Elsewhere", stage1_running(now())).await;
    let foreign = add_option(&pool, Stage::Issues, other.id, None, "Foreign").await;

    let app = build_test_app(pool);
    let uri = format!("/api/v1/votes/{}/stages/1/ballot", vote.id);
    let response = post_json_auth(
        app,
        &uri,
        json!({ "option_id": foreign.id, "answers": {} }),
        &voter_token(1),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(response).await["code"], "INELIGIBLE_OPTION");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_outsider_cannot_vote(pool: PgPool) {
    let vote = seed_vote(&pool, "Library", stage1_running(now())).await;
    force_open(&pool, vote.id).await;
    let issue = add_option(&pool, Stage::Issues, vote.id, None, "Hours").await;
    let questions = add_questions(&pool, Stage::Issues, issue.id, 3).await;

    let app = build_test_app(pool);
    let uri = format!("/api/v1/votes/{}/stages/1/ballot", vote.id);
    let response = post_json_auth(
        app,
        &uri,
        ballot_body(issue.id, &questions, true),
        &voter_token(OUTSIDER),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
