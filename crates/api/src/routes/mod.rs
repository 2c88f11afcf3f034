pub mod admin;
pub mod health;
pub mod votes;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /votes                                               voter endpoints (auth)
/// /votes/{vote_id}/stage                               active stage
/// /votes/{vote_id}/stages/{stage}/options              eligible options + questions
/// /votes/{vote_id}/stages/{stage}/ballot               get, submit ballot
/// /votes/{vote_id}/results                             latest snapshot per stage
/// /votes/{vote_id}/stages/{stage}/results/runs         tally history
///
/// /admin/votes/{vote_id}/stages/{stage}/tally          run tally (admin only)
/// /admin/votes/{vote_id}/status                        status transition
/// /admin/votes/{vote_id}/stages/{stage}/options/{id}   option revision
/// /admin/auto-tally                                    one sweep
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/votes", votes::router())
        .nest("/admin", admin::router())
}
