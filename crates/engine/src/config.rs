use agora_core::quiz::ScoringPolicy;
use agora_core::weighting::WeightCurve;

/// Default auto-tally detection window: 5 minutes.
const DEFAULT_LOOKBACK_SECS: i64 = 300;

/// Voting engine settings shared by the API and the worker.
///
/// Fixed per deployment; tests construct it directly.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// How quiz scores turn into ballot weight (default: linear).
    pub weight_curve: WeightCurve,
    /// Answer-key scoring switches.
    pub scoring: ScoringPolicy,
    /// How far back a sweep looks for elapsed stage ends.
    pub auto_tally_lookback: chrono::Duration,
    /// Close an open vote once all of its stages have elapsed.
    pub auto_close_votes: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            weight_curve: WeightCurve::default(),
            scoring: ScoringPolicy::default(),
            auto_tally_lookback: chrono::Duration::seconds(DEFAULT_LOOKBACK_SECS),
            auto_close_votes: true,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default  |
    /// |----------------------------|----------|
    /// | `TALLY_WEIGHT_CURVE`       | `linear` |
    /// | `QUIZ_LENIENT_FALLBACK`    | `true`   |
    /// | `AUTO_TALLY_LOOKBACK_SECS` | `300`    |
    /// | `AUTO_CLOSE_VOTES`         | `true`   |
    pub fn from_env() -> Self {
        let weight_curve: WeightCurve = std::env::var("TALLY_WEIGHT_CURVE")
            .unwrap_or_else(|_| "linear".into())
            .parse()
            .expect("TALLY_WEIGHT_CURVE must be linear or all_or_nothing");

        let lenient_fallback: bool = std::env::var("QUIZ_LENIENT_FALLBACK")
            .unwrap_or_else(|_| "true".into())
            .parse()
            .expect("QUIZ_LENIENT_FALLBACK must be true or false");

        let lookback_secs: i64 = std::env::var("AUTO_TALLY_LOOKBACK_SECS")
            .unwrap_or_else(|_| DEFAULT_LOOKBACK_SECS.to_string())
            .parse()
            .expect("AUTO_TALLY_LOOKBACK_SECS must be a valid i64");

        let auto_close_votes: bool = std::env::var("AUTO_CLOSE_VOTES")
            .unwrap_or_else(|_| "true".into())
            .parse()
            .expect("AUTO_CLOSE_VOTES must be true or false");

        Self {
            weight_curve,
            scoring: ScoringPolicy { lenient_fallback },
            auto_tally_lookback: chrono::Duration::seconds(lookback_secs),
            auto_close_votes,
        }
    }
}
