//! Knowledge-weighted ballot weights.
//!
//! A ballot's weight is derived from the voter's quiz score for the option
//! they chose. The curve is a deployment setting; every curve maps into
//! `[0, 1]` and gives zero weight when the option has no questions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How a quiz score turns into ballot weight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightCurve {
    /// `correct / total`.
    #[default]
    Linear,
    /// Full weight only for a perfect score.
    AllOrNothing,
}

impl WeightCurve {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::AllOrNothing => "all_or_nothing",
        }
    }

    /// Weight of one ballot whose voter answered `correct` of `total` questions.
    pub fn ballot_weight(self, correct: i32, total: i32) -> f64 {
        if total <= 0 {
            return 0.0;
        }
        let correct = correct.clamp(0, total);
        match self {
            Self::Linear => f64::from(correct) / f64::from(total),
            Self::AllOrNothing => {
                if correct == total {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }
}

impl fmt::Display for WeightCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WeightCurve {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" => Ok(Self::Linear),
            "all_or_nothing" | "all-or-nothing" => Ok(Self::AllOrNothing),
            other => Err(format!(
                "Unknown weight curve '{other}'. Must be one of: linear, all_or_nothing"
            )),
        }
    }
}
