//! Admin routes, nested under `/admin`. Every handler requires the `admin` role.

use axum::routing::{post, put};
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// ```text
/// POST   /votes/{vote_id}/stages/{stage}/tally                   run_tally
/// POST   /votes/{vote_id}/status                                 change_status
/// PUT    /votes/{vote_id}/stages/{stage}/options/{option_id}     revise_option
/// POST   /auto-tally                                             run_auto_tally
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/votes/{vote_id}/stages/{stage}/tally",
            post(admin::run_tally),
        )
        .route("/votes/{vote_id}/status", post(admin::change_status))
        .route(
            "/votes/{vote_id}/stages/{stage}/options/{option_id}",
            put(admin::revise_option),
        )
        .route("/auto-tally", post(admin::run_auto_tally))
}
