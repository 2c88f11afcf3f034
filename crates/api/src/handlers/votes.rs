//! Voter-facing handlers: vote listing, stage options, ballots and results.
//!
//! Every handler requires authentication. Voters only reach votes that are
//! open or closed and share one of their populations; admins reach any vote.

use std::collections::HashMap;

use agora_core::error::CoreError;
use agora_core::lifecycle::VoteStatus;
use agora_core::roles::ROLE_ADMIN;
use agora_core::stage::{active_stage, results_visible, Stage};
use agora_core::types::DbId;
use agora_db::models::result::StageResult;
use agora_db::models::vote::Vote;
use agora_engine::ballot::{self, SubmitBallot};
use agora_engine::{eligibility, tally};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::handlers::parse_stage;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for a ballot submission.
#[derive(Debug, Deserialize)]
pub struct SubmitBallotRequest {
    pub option_id: DbId,
    /// Answer text keyed by knowledge question id.
    #[serde(default)]
    pub answers: HashMap<DbId, String>,
}

/// The stage currently accepting ballots.
#[derive(Debug, Serialize)]
pub struct ActiveStageResponse {
    pub vote_id: DbId,
    pub status: String,
    /// `None` outside every stage window or when the vote is not open.
    pub active_stage: Option<Stage>,
}

/// Latest tally snapshot of one stage.
#[derive(Debug, Serialize)]
pub struct StageResultsView {
    pub stage: Stage,
    /// `false` while the stage is still accepting ballots.
    pub visible: bool,
    pub rows: Vec<StageResult>,
}

/// Load a vote the caller is allowed to see.
///
/// Draft votes are reported as missing to voters so their existence does
/// not leak.
async fn load_visible_vote(state: &AppState, auth: &AuthUser, vote_id: DbId) -> AppResult<Vote> {
    let vote = eligibility::load_vote(&state.pool, vote_id).await?;
    if auth.role == ROLE_ADMIN {
        return Ok(vote);
    }

    let visible = vote.status().is_ok_and(VoteStatus::is_visible_to_voters);
    if !visible {
        return Err(CoreError::NotFound {
            entity: "vote",
            id: vote_id,
        }
        .into());
    }
    eligibility::ensure_voter_access(&state.pool, auth.user_id, vote_id).await?;
    Ok(vote)
}

/// GET /api/v1/votes
pub async fn list_votes(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let votes = eligibility::visible_votes(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse { data: votes }))
}

/// GET /api/v1/votes/{vote_id}/stage
pub async fn get_active_stage(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(vote_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let vote = load_visible_vote(&state, &auth, vote_id).await?;
    let is_open = vote.status().is_ok_and(|s| s == VoteStatus::Open);
    let active = if is_open {
        active_stage(&vote.windows(), Utc::now())
    } else {
        None
    };

    Ok(Json(DataResponse {
        data: ActiveStageResponse {
            vote_id: vote.id,
            status: vote.status,
            active_stage: active,
        },
    }))
}

/// GET /api/v1/votes/{vote_id}/stages/{stage}/options
///
/// Eligible options with their questions. Answer keys are never included.
/// Empty for a later stage whose predecessor has no winner yet.
pub async fn list_stage_options(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((vote_id, stage)): Path<(DbId, i16)>,
) -> AppResult<impl IntoResponse> {
    let stage = parse_stage(stage)?;
    load_visible_vote(&state, &auth, vote_id).await?;
    let options = eligibility::options_with_questions(&state.pool, vote_id, stage).await?;
    Ok(Json(DataResponse { data: options }))
}

/// POST /api/v1/votes/{vote_id}/stages/{stage}/ballot
///
/// Submit or replace the caller's ballot for a stage.
pub async fn submit_ballot(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((vote_id, stage)): Path<(DbId, i16)>,
    Json(input): Json<SubmitBallotRequest>,
) -> AppResult<impl IntoResponse> {
    let stage = parse_stage(stage)?;
    let submission = SubmitBallot {
        voter_id: auth.user_id,
        vote_id,
        stage,
        option_id: input.option_id,
        answers: input.answers,
    };

    let ballot =
        ballot::submit_ballot(&state.pool, &state.config.engine, &submission, Utc::now()).await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: ballot })))
}

/// GET /api/v1/votes/{vote_id}/stages/{stage}/ballot
///
/// The caller's current ballot, or `null` if they have not voted.
pub async fn get_my_ballot(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((vote_id, stage)): Path<(DbId, i16)>,
) -> AppResult<impl IntoResponse> {
    let stage = parse_stage(stage)?;
    load_visible_vote(&state, &auth, vote_id).await?;
    let ballot = ballot::find_ballot(&state.pool, auth.user_id, vote_id, stage).await?;
    Ok(Json(DataResponse { data: ballot }))
}

/// GET /api/v1/votes/{vote_id}/results
///
/// Latest snapshot of each stage. A stage still accepting ballots is
/// reported with `visible: false` and no rows, except to admins.
pub async fn get_results(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(vote_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let vote = load_visible_vote(&state, &auth, vote_id).await?;
    let windows = vote.windows();
    let now = Utc::now();

    let mut stages = Vec::with_capacity(Stage::ALL.len());
    for stage in Stage::ALL {
        let visible = auth.role == ROLE_ADMIN || results_visible(&windows, stage, now);
        let rows = if visible {
            tally::latest_results(&state.pool, vote_id, stage).await?
        } else {
            Vec::new()
        };
        stages.push(StageResultsView {
            stage,
            visible,
            rows,
        });
    }

    Ok(Json(DataResponse { data: stages }))
}

/// GET /api/v1/votes/{vote_id}/stages/{stage}/results/runs
///
/// Tally run history, newest first. Withheld from voters while the stage
/// is active.
pub async fn list_runs(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((vote_id, stage)): Path<(DbId, i16)>,
) -> AppResult<impl IntoResponse> {
    let stage = parse_stage(stage)?;
    let vote = load_visible_vote(&state, &auth, vote_id).await?;

    if auth.role != ROLE_ADMIN && !results_visible(&vote.windows(), stage, Utc::now()) {
        return Err(CoreError::Forbidden(format!(
            "Results for stage {} are hidden while voting is in progress",
            stage.number()
        ))
        .into());
    }

    let runs = tally::list_runs(&state.pool, vote_id, stage).await?;
    Ok(Json(DataResponse { data: runs }))
}
