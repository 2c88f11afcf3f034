//! Voter-facing routes, nested under `/votes`.

use axum::routing::get;
use axum::Router;

use crate::handlers::votes;
use crate::state::AppState;

/// ```text
/// GET    /                                          list_votes
/// GET    /{vote_id}/stage                           get_active_stage
/// GET    /{vote_id}/stages/{stage}/options          list_stage_options
/// GET    /{vote_id}/stages/{stage}/ballot           get_my_ballot
/// POST   /{vote_id}/stages/{stage}/ballot           submit_ballot
/// GET    /{vote_id}/results                         get_results
/// GET    /{vote_id}/stages/{stage}/results/runs     list_runs
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(votes::list_votes))
        .route("/{vote_id}/stage", get(votes::get_active_stage))
        .route(
            "/{vote_id}/stages/{stage}/options",
            get(votes::list_stage_options),
        )
        .route(
            "/{vote_id}/stages/{stage}/ballot",
            get(votes::get_my_ballot).post(votes::submit_ballot),
        )
        .route("/{vote_id}/results", get(votes::get_results))
        .route(
            "/{vote_id}/stages/{stage}/results/runs",
            get(votes::list_runs),
        )
}
