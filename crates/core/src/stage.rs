//! Stage model and the time-based stage resolver.
//!
//! A vote runs through three sequential stages (Issues, Approaches, Plans),
//! each bounded by an optional start and end timestamp. Everything here is
//! pure and deterministic in the supplied `now`; callers pass UTC
//! timestamps only, so no timezone conversion happens in this module.
//!
//! Option availability depends on tally winners and lives in the engine
//! crate; nothing in this module looks at winners.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

/// Related-type strings used by knowledge questions.
pub const RELATED_ISSUE: &str = "issue";
pub const RELATED_APPROACH: &str = "approach";
pub const RELATED_PLAN: &str = "plan";

/// One of the three sequential phases of a vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "i16", try_from = "i16")]
pub enum Stage {
    Issues = 1,
    Approaches = 2,
    Plans = 3,
}

impl Stage {
    /// All stages in voting order.
    pub const ALL: [Stage; 3] = [Stage::Issues, Stage::Approaches, Stage::Plans];

    /// Parse a stage number (1, 2 or 3).
    pub fn from_number(n: i16) -> Result<Self, CoreError> {
        match n {
            1 => Ok(Self::Issues),
            2 => Ok(Self::Approaches),
            3 => Ok(Self::Plans),
            other => Err(CoreError::Validation(format!(
                "Invalid stage {other}. Must be 1, 2 or 3"
            ))),
        }
    }

    /// The stage number as stored in the database.
    pub fn number(self) -> i16 {
        self as i16
    }

    /// The `related_type` value knowledge questions use for this stage's options.
    pub fn related_type(self) -> &'static str {
        match self {
            Self::Issues => RELATED_ISSUE,
            Self::Approaches => RELATED_APPROACH,
            Self::Plans => RELATED_PLAN,
        }
    }

    /// Human-readable stage name.
    pub fn label(self) -> &'static str {
        match self {
            Self::Issues => "Issues",
            Self::Approaches => "Approaches",
            Self::Plans => "Plans",
        }
    }

    /// The stage whose winner gates this one, if any.
    pub fn previous(self) -> Option<Self> {
        match self {
            Self::Issues => None,
            Self::Approaches => Some(Self::Issues),
            Self::Plans => Some(Self::Approaches),
        }
    }

    fn index(self) -> usize {
        self as usize - 1
    }
}

impl From<Stage> for i16 {
    fn from(stage: Stage) -> Self {
        stage.number()
    }
}

impl TryFrom<i16> for Stage {
    type Error = CoreError;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        Stage::from_number(value)
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.number())
    }
}

// ---------------------------------------------------------------------------
// Stage windows
// ---------------------------------------------------------------------------

/// The six nullable stage-boundary timestamps of a vote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageWindows {
    pub stage1_start: Option<Timestamp>,
    pub stage1_end: Option<Timestamp>,
    pub stage2_start: Option<Timestamp>,
    pub stage2_end: Option<Timestamp>,
    pub stage3_start: Option<Timestamp>,
    pub stage3_end: Option<Timestamp>,
}

impl StageWindows {
    pub fn start(&self, stage: Stage) -> Option<Timestamp> {
        match stage {
            Stage::Issues => self.stage1_start,
            Stage::Approaches => self.stage2_start,
            Stage::Plans => self.stage3_start,
        }
    }

    pub fn end(&self, stage: Stage) -> Option<Timestamp> {
        match stage {
            Stage::Issues => self.stage1_end,
            Stage::Approaches => self.stage2_end,
            Stage::Plans => self.stage3_end,
        }
    }

    /// Whether any later stage has already started at `now`.
    fn superseded(&self, stage: Stage, now: Timestamp) -> bool {
        Stage::ALL[stage.index() + 1..]
            .iter()
            .any(|later| self.start(*later).is_some_and(|s| now >= s))
    }

    fn is_configured(&self, stage: Stage) -> bool {
        self.start(stage).is_some() || self.end(stage).is_some()
    }
}

/// Resolve the stage that is open for voting at `now`, if any.
///
/// A stage is active when its start has been reached, its end (if set) has
/// not, and no later stage has started yet. A start without an end stays
/// open until the next stage starts, or forever if none follows. Because an
/// earlier stage always yields to a started later one, at most one stage is
/// active even for overlapping configurations.
pub fn active_stage(windows: &StageWindows, now: Timestamp) -> Option<Stage> {
    Stage::ALL.into_iter().find(|&stage| {
        let Some(start) = windows.start(stage) else {
            return false;
        };
        let before_end = windows.end(stage).map_or(true, |end| now < end);
        now >= start && before_end && !windows.superseded(stage, now)
    })
}

/// Validate that each stage's start does not come after its end.
pub fn validate_windows(windows: &StageWindows) -> Result<(), String> {
    for stage in Stage::ALL {
        if let (Some(start), Some(end)) = (windows.start(stage), windows.end(stage)) {
            if start > end {
                return Err(format!(
                    "Stage {stage} start ({start}) must not be after its end ({end})"
                ));
            }
        }
    }
    Ok(())
}

/// Stages whose end boundary fell inside `(now - lookback, now]`.
///
/// Used by the auto-tally sweep; every matching stage is returned in
/// voting order.
pub fn stages_due_for_tally(
    windows: &StageWindows,
    now: Timestamp,
    lookback: chrono::Duration,
) -> Vec<Stage> {
    let window_start = now - lookback;
    Stage::ALL
        .into_iter()
        .filter(|&stage| {
            windows
                .end(stage)
                .is_some_and(|end| end > window_start && end <= now)
        })
        .collect()
}

/// Whether every configured stage has an end that has already elapsed.
///
/// Returns `false` when no stage is configured or when a configured stage
/// is open-ended.
pub fn all_stages_elapsed(windows: &StageWindows, now: Timestamp) -> bool {
    let configured: Vec<Stage> = Stage::ALL
        .into_iter()
        .filter(|&s| windows.is_configured(s))
        .collect();
    !configured.is_empty()
        && configured
            .iter()
            .all(|&s| windows.end(s).is_some_and(|end| end <= now))
}

/// Results for a stage are withheld while that stage is still accepting ballots.
pub fn results_visible(windows: &StageWindows, stage: Stage, now: Timestamp) -> bool {
    active_stage(windows, now) != Some(stage)
}
