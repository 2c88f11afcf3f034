pub mod admin;
pub mod votes;

use agora_core::stage::Stage;

use crate::error::AppResult;

/// Parse the `{stage}` path segment.
pub(crate) fn parse_stage(n: i16) -> AppResult<Stage> {
    Ok(Stage::from_number(n)?)
}
