//! Pure tally aggregation.
//!
//! Turns the ballots of one vote stage into per-option totals, weighted
//! totals and knowledge-score breakdowns, then ranks the options and picks
//! a single winner. Persistence and run numbering live in the engine crate.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;

use crate::types::{DbId, Timestamp};
use crate::weighting::WeightCurve;

/// Number of knowledge-score buckets (0, 1, 2, and 3 or more correct).
pub const KNOWLEDGE_BUCKETS: usize = 4;

/// An option taking part in the tally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TallyOption {
    pub id: DbId,
    pub created_at: Timestamp,
}

/// The parts of a ballot the tally needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BallotScore {
    pub option_id: DbId,
    pub knowledge_score: i32,
}

/// Aggregate for one option.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionTally {
    pub option_id: DbId,
    pub total_votes: i32,
    pub weighted_votes: f64,
    pub knowledge_breakdown: [i32; KNOWLEDGE_BUCKETS],
    pub is_winner: bool,
}

/// Result of aggregating one stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TallyOutcome {
    /// One row per option, ranked best first.
    pub rows: Vec<OptionTally>,
    /// `None` when no ballot counted toward any option.
    pub winner_id: Option<DbId>,
    /// Ballots naming an option outside the resolved set.
    pub ignored_ballots: i32,
}

/// Bucket index for a knowledge score. Negative scores land in bucket 0.
pub fn knowledge_bucket(score: i32) -> usize {
    usize::try_from(score.max(0))
        .unwrap_or(0)
        .min(KNOWLEDGE_BUCKETS - 1)
}

/// Aggregate `ballots` over `options`.
///
/// `question_counts` maps an option to its number of knowledge questions;
/// options missing from the map have none, so their ballots carry no
/// weight. Every option gets a row even without ballots.
///
/// Ranking is weighted votes descending, then earliest `created_at`, then
/// lowest id. The top row is the winner when at least one ballot counted.
pub fn aggregate(
    options: &[TallyOption],
    ballots: &[BallotScore],
    question_counts: &HashMap<DbId, i32>,
    curve: WeightCurve,
) -> TallyOutcome {
    let mut rows: Vec<OptionTally> = options
        .iter()
        .map(|opt| OptionTally {
            option_id: opt.id,
            total_votes: 0,
            weighted_votes: 0.0,
            knowledge_breakdown: [0; KNOWLEDGE_BUCKETS],
            is_winner: false,
        })
        .collect();
    let index: HashMap<DbId, usize> = options
        .iter()
        .enumerate()
        .map(|(i, opt)| (opt.id, i))
        .collect();

    let mut ignored_ballots = 0;
    let mut counted = 0;
    for ballot in ballots {
        let Some(&slot) = index.get(&ballot.option_id) else {
            ignored_ballots += 1;
            continue;
        };
        let total = question_counts.get(&ballot.option_id).copied().unwrap_or(0);
        let row = &mut rows[slot];
        row.total_votes += 1;
        row.weighted_votes += curve.ballot_weight(ballot.knowledge_score, total);
        row.knowledge_breakdown[knowledge_bucket(ballot.knowledge_score)] += 1;
        counted += 1;
    }

    let created: HashMap<DbId, Timestamp> =
        options.iter().map(|opt| (opt.id, opt.created_at)).collect();
    rows.sort_by(|a, b| {
        b.weighted_votes
            .partial_cmp(&a.weighted_votes)
            .unwrap_or(Ordering::Equal)
            .then_with(|| created[&a.option_id].cmp(&created[&b.option_id]))
            .then_with(|| a.option_id.cmp(&b.option_id))
    });

    let winner_id = if counted > 0 {
        rows.first_mut().map(|row| {
            row.is_winner = true;
            row.option_id
        })
    } else {
        None
    };

    TallyOutcome {
        rows,
        winner_id,
        ignored_ballots,
    }
}
