//! Admin handlers: tally runs, status transitions, option revision and
//! on-demand auto-tally sweeps.

use agora_core::types::DbId;
use agora_db::models::option::UpdateOption;
use agora_db::models::vote::ChangeStatusRequest;
use agora_engine::{lifecycle, options, sweep, tally};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;

use crate::error::AppResult;
use crate::handlers::parse_stage;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/admin/votes/{vote_id}/stages/{stage}/tally
///
/// Compute and store a new tally run. Always appends; earlier runs are kept.
pub async fn run_tally(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path((vote_id, stage)): Path<(DbId, i16)>,
) -> AppResult<impl IntoResponse> {
    let stage = parse_stage(stage)?;
    let run = tally::run_tally(&state.pool, &state.config.engine, vote_id, stage).await?;

    tracing::info!(
        admin_id = admin.user_id,
        vote_id,
        stage = stage.number(),
        tally_run = run.tally_run,
        "Manual tally requested"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: run })))
}

/// POST /api/v1/admin/votes/{vote_id}/status
pub async fn change_status(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(vote_id): Path<DbId>,
    Json(input): Json<ChangeStatusRequest>,
) -> AppResult<impl IntoResponse> {
    let vote = lifecycle::change_status(&state.pool, vote_id, input.status).await?;

    tracing::info!(
        admin_id = admin.user_id,
        vote_id,
        status = %input.status,
        "Vote status changed"
    );

    Ok(Json(DataResponse { data: vote }))
}

/// PUT /api/v1/admin/votes/{vote_id}/stages/{stage}/options/{option_id}
///
/// Edits in place while the option's stage is running; afterwards a new
/// revision row is created and `201 Created` is returned.
pub async fn revise_option(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path((vote_id, stage, option_id)): Path<(DbId, i16, DbId)>,
    Json(input): Json<UpdateOption>,
) -> AppResult<impl IntoResponse> {
    let stage = parse_stage(stage)?;
    let outcome =
        options::revise_option(&state.pool, vote_id, stage, option_id, &input, Utc::now()).await?;

    tracing::info!(
        admin_id = admin.user_id,
        vote_id,
        stage = stage.number(),
        option_id,
        result_id = outcome.option.id,
        created_revision = outcome.created_revision,
        "Option edited"
    );

    let status = if outcome.created_revision {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(DataResponse { data: outcome })))
}

/// POST /api/v1/admin/auto-tally
///
/// Run one auto-tally sweep now and return its report.
pub async fn run_auto_tally(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let report = sweep::run_sweep(&state.pool, &state.config.engine, Utc::now()).await?;

    tracing::info!(
        admin_id = admin.user_id,
        processed = report.processed,
        failed = report.failed,
        "Manual auto-tally sweep finished"
    );

    Ok(Json(DataResponse { data: report }))
}
