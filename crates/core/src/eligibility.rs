//! Winner-gated option eligibility, population checks, and option freezing.
//!
//! These predicates are pure; the engine crate supplies the persisted
//! winners and memberships. Time-based stage activity is a separate concern
//! (see [`crate::stage::active_stage`]) and the two are composed explicitly
//! wherever "is this stage votable" is needed.

use std::collections::HashSet;

use crate::stage::{Stage, StageWindows};
use crate::types::{DbId, Timestamp};

/// Which options are eligible in a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionScope {
    /// Every issue of the vote.
    Vote,
    /// Approaches under the winning issue.
    UnderIssue(DbId),
    /// Plans under the winning approach.
    UnderApproach(DbId),
}

impl OptionScope {
    /// Scope for `stage` given the previous stage's winner.
    ///
    /// Stage 1 is always scoped to the vote. Later stages return `None`
    /// until the previous stage has a winner.
    pub fn for_stage(stage: Stage, previous_winner: Option<DbId>) -> Option<Self> {
        match stage {
            Stage::Issues => Some(Self::Vote),
            Stage::Approaches => previous_winner.map(Self::UnderIssue),
            Stage::Plans => previous_winner.map(Self::UnderApproach),
        }
    }

    /// Parent option id the scope filters on, if any.
    pub fn parent_id(self) -> Option<DbId> {
        match self {
            Self::Vote => None,
            Self::UnderIssue(id) | Self::UnderApproach(id) => Some(id),
        }
    }
}

/// A voter may see a vote when they share at least one population with it.
pub fn shares_population(voter_populations: &[DbId], vote_populations: &[DbId]) -> bool {
    let voter: HashSet<DbId> = voter_populations.iter().copied().collect();
    vote_populations.iter().any(|id| voter.contains(id))
}

/// An option is frozen once its stage's end has elapsed.
///
/// Frozen options keep their ballot history; edits must create a new
/// revision instead of mutating the row.
pub fn option_is_frozen(windows: &StageWindows, stage: Stage, now: Timestamp) -> bool {
    windows.end(stage).is_some_and(|end| end <= now)
}
