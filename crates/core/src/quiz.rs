//! Basic-knowledge quiz scoring.
//!
//! Knowledge questions store their correct-answer marker in whatever shape
//! the authoring tool produced over time: a numeric index into the choices,
//! a bare string, a JSON array of acceptable strings, or a JSON-encoded
//! string. [`AnswerKey::classify`] resolves the shape once when a question
//! is loaded, so scoring is a plain match over a tagged union.
//!
//! Scoring never fails. A marker that cannot be classified becomes
//! [`AnswerKey::Malformed`] and every submission against it is incorrect;
//! callers are expected to log such questions for operators.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

use crate::types::DbId;

/// Minimum number of answer choices for a well-formed question.
pub const MIN_CHOICES: usize = 2;

// ---------------------------------------------------------------------------
// Answer key
// ---------------------------------------------------------------------------

/// The classified correct-answer marker of a knowledge question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AnswerKey {
    /// Zero-based index into the question's choices.
    Index(usize),
    /// A single accepted answer, compared case-insensitively.
    Text(String),
    /// Any of several accepted answers, compared case-insensitively.
    Choices(Vec<String>),
    /// The marker could not be interpreted; always scores as incorrect.
    Malformed,
}

impl AnswerKey {
    /// Classify a stored marker.
    ///
    /// Resolution order: JSON array, non-negative integer, then strings
    /// (a bracketed JSON array, a quoted JSON string, a run of digits, and
    /// finally the literal text). Null, booleans, objects, negative or
    /// fractional numbers, and blank strings are malformed.
    pub fn classify(raw: &Value) -> Self {
        match raw {
            Value::Array(items) => Self::from_list(items),
            Value::Number(n) => match n.as_u64() {
                Some(idx) => usize::try_from(idx).map_or(Self::Malformed, Self::Index),
                None => Self::Malformed,
            },
            Value::String(s) => Self::from_text(s),
            Value::Null | Value::Bool(_) | Value::Object(_) => Self::Malformed,
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed)
    }

    fn from_list(items: &[Value]) -> Self {
        let accepted: Vec<String> = items
            .iter()
            .map(scalar_text)
            .filter(|s| !s.is_empty())
            .collect();
        if accepted.is_empty() {
            Self::Malformed
        } else {
            Self::Choices(accepted)
        }
    }

    fn from_text(raw: &str) -> Self {
        let txt = raw.trim();
        if txt.is_empty() {
            return Self::Malformed;
        }

        if txt.starts_with('[') && txt.ends_with(']') {
            if let Ok(items) = serde_json::from_str::<Vec<Value>>(txt) {
                return Self::from_list(&items);
            }
        }

        if txt.len() >= 2 && txt.starts_with('"') && txt.ends_with('"') {
            if let Ok(inner) = serde_json::from_str::<String>(txt) {
                let inner = inner.trim();
                return if inner.is_empty() {
                    Self::Malformed
                } else {
                    Self::Text(inner.to_string())
                };
            }
        }

        if txt.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(idx) = txt.parse::<usize>() {
                return Self::Index(idx);
            }
        }

        Self::Text(txt.to_string())
    }
}

/// Render a JSON scalar as trimmed text (strings without their quotes).
fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Case-insensitive comparison of two answers, ignoring surrounding whitespace.
fn same_answer(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

/// Normalize stored answer choices into a list of strings.
///
/// Accepts a JSON array, a string holding a JSON array, a comma-separated
/// string, or a single scalar. Null yields no choices.
pub fn normalize_choices(raw: &Value) -> Vec<String> {
    match raw {
        Value::Null => Vec::new(),
        Value::Array(items) => items.iter().map(scalar_text).collect(),
        Value::String(s) => {
            let txt = s.trim();
            if txt.is_empty() {
                return Vec::new();
            }
            match serde_json::from_str::<Value>(txt) {
                Ok(Value::Array(items)) => items.iter().map(scalar_text).collect(),
                Ok(other) => vec![scalar_text(&other)],
                Err(_) if txt.contains(',') => {
                    txt.split(',').map(|part| part.trim().to_string()).collect()
                }
                Err(_) => vec![txt.to_string()],
            }
        }
        other => vec![scalar_text(other)],
    }
}

// ---------------------------------------------------------------------------
// Scoring policy
// ---------------------------------------------------------------------------

/// Deployment-level scoring switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringPolicy {
    /// When a plain-text key does not match, accept any submission that
    /// equals one of the configured choices.
    ///
    /// This reproduces how legacy data has always been scored. It makes a
    /// text-keyed question accept every listed choice, so deployments that
    /// want strict scoring should turn it off.
    pub lenient_fallback: bool,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            lenient_fallback: true,
        }
    }
}

impl ScoringPolicy {
    pub fn strict() -> Self {
        Self {
            lenient_fallback: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Questions
// ---------------------------------------------------------------------------

/// A knowledge question prepared for scoring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizQuestion {
    pub id: DbId,
    pub text: String,
    pub choices: Vec<String>,
    pub key: AnswerKey,
}

impl QuizQuestion {
    /// Build a question from its stored columns, classifying the key once.
    pub fn from_parts(id: DbId, text: &str, choices: &Value, correct: &Value) -> Self {
        Self {
            id,
            text: text.to_string(),
            choices: normalize_choices(choices),
            key: AnswerKey::classify(correct),
        }
    }

    /// Whether `submitted` answers this question correctly.
    pub fn is_correct(&self, submitted: &str, policy: ScoringPolicy) -> bool {
        let sel = submitted.trim();
        if sel.is_empty() {
            return false;
        }

        match &self.key {
            AnswerKey::Choices(accepted) => accepted.iter().any(|a| same_answer(a, sel)),
            AnswerKey::Index(idx) => match self.choices.get(*idx) {
                Some(choice) => same_answer(choice, sel),
                None => idx.to_string() == sel,
            },
            AnswerKey::Text(expected) => {
                same_answer(expected, sel)
                    || (policy.lenient_fallback
                        && self.choices.iter().any(|c| same_answer(c, sel)))
            }
            AnswerKey::Malformed => false,
        }
    }

    /// A question counts toward vote readiness when it has text, at least
    /// two choices, and an interpretable answer key.
    pub fn is_well_formed(&self) -> bool {
        !self.text.trim().is_empty() && self.choices.len() >= MIN_CHOICES && !self.key.is_malformed()
    }
}

/// Count the questions answered correctly.
///
/// Questions with no entry in `answers` count as incorrect.
pub fn score_answers(
    questions: &[QuizQuestion],
    answers: &HashMap<DbId, String>,
    policy: ScoringPolicy,
) -> i32 {
    let correct = questions
        .iter()
        .filter(|q| {
            answers
                .get(&q.id)
                .is_some_and(|answer| q.is_correct(answer, policy))
        })
        .count();
    i32::try_from(correct).unwrap_or(i32::MAX)
}

/// Ids of questions without a non-blank answer, in question order.
pub fn missing_answers(questions: &[QuizQuestion], answers: &HashMap<DbId, String>) -> Vec<DbId> {
    questions
        .iter()
        .filter(|q| answers.get(&q.id).map_or(true, |a| a.trim().is_empty()))
        .map(|q| q.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn question(choices: Value, correct: Value) -> QuizQuestion {
        QuizQuestion::from_parts(1, "Which one?", &choices, &correct)
    }

    // -----------------------------------------------------------------------
    // classify
    // -----------------------------------------------------------------------

    #[test]
    fn array_marker_is_choices() {
        assert_eq!(
            AnswerKey::classify(&json!(["B", " b "])),
            AnswerKey::Choices(vec!["B".into(), "b".into()])
        );
    }

    #[test]
    fn integer_marker_is_index() {
        assert_eq!(AnswerKey::classify(&json!(1)), AnswerKey::Index(1));
    }

    #[test]
    fn digit_string_is_index() {
        assert_eq!(AnswerKey::classify(&json!(" 2 ")), AnswerKey::Index(2));
    }

    #[test]
    fn json_array_string_is_choices() {
        assert_eq!(
            AnswerKey::classify(&json!("[\"Yes\", \"Y\"]")),
            AnswerKey::Choices(vec!["Yes".into(), "Y".into()])
        );
    }

    #[test]
    fn json_quoted_string_is_text() {
        assert_eq!(
            AnswerKey::classify(&json!("\"Paris\"")),
            AnswerKey::Text("Paris".into())
        );
    }

    #[test]
    fn plain_string_is_text() {
        assert_eq!(
            AnswerKey::classify(&json!("Paris")),
            AnswerKey::Text("Paris".into())
        );
    }

    #[test]
    fn broken_bracket_string_falls_back_to_text() {
        assert_eq!(
            AnswerKey::classify(&json!("[not json]")),
            AnswerKey::Text("[not json]".into())
        );
    }

    #[test]
    fn unusable_markers_are_malformed() {
        for raw in [
            json!(null),
            json!(true),
            json!({"answer": "A"}),
            json!(-1),
            json!(1.5),
            json!("   "),
            json!([]),
            json!("\"\""),
        ] {
            assert!(AnswerKey::classify(&raw).is_malformed(), "{raw} should be malformed");
        }
    }

    // -----------------------------------------------------------------------
    // normalize_choices
    // -----------------------------------------------------------------------

    #[test]
    fn choices_from_array() {
        assert_eq!(normalize_choices(&json!(["X", 2])), vec!["X", "2"]);
    }

    #[test]
    fn choices_from_json_string() {
        assert_eq!(normalize_choices(&json!("[\"X\",\"Y\"]")), vec!["X", "Y"]);
    }

    #[test]
    fn choices_from_comma_list() {
        assert_eq!(normalize_choices(&json!("X, Y ,Z")), vec!["X", "Y", "Z"]);
    }

    #[test]
    fn choices_from_null_is_empty() {
        assert!(normalize_choices(&json!(null)).is_empty());
    }

    // -----------------------------------------------------------------------
    // is_correct
    // -----------------------------------------------------------------------

    #[test]
    fn array_key_accepts_any_member_case_insensitively() {
        let q = question(json!(["A", "B"]), json!(["B", "b"]));
        assert!(q.is_correct("b", ScoringPolicy::default()));
        assert!(q.is_correct("B", ScoringPolicy::strict()));
        assert!(!q.is_correct("A", ScoringPolicy::default()));
    }

    #[test]
    fn index_key_resolves_through_choices() {
        let q = question(json!(["X", "Y", "Z"]), json!(1));
        assert!(q.is_correct("Y", ScoringPolicy::default()));
        assert!(q.is_correct(" y", ScoringPolicy::default()));
        assert!(!q.is_correct("X", ScoringPolicy::default()));
    }

    #[test]
    fn out_of_range_index_compares_literal_digits() {
        let q = question(json!(["X", "Y"]), json!("5"));
        assert!(q.is_correct("5", ScoringPolicy::default()));
        assert!(!q.is_correct("X", ScoringPolicy::default()));
    }

    #[test]
    fn text_key_matches_ignoring_case() {
        let q = question(json!(["Paris", "Rome"]), json!("paris"));
        assert!(q.is_correct("PARIS", ScoringPolicy::strict()));
        assert!(!q.is_correct("Rome", ScoringPolicy::strict()));
    }

    #[test]
    fn lenient_fallback_accepts_any_listed_choice() {
        let q = question(json!(["Paris", "Rome"]), json!("Paris"));
        assert!(q.is_correct("Rome", ScoringPolicy::default()));
        assert!(!q.is_correct("Berlin", ScoringPolicy::default()));
    }

    #[test]
    fn malformed_key_is_always_incorrect() {
        let q = question(json!(["A", "B"]), json!(null));
        assert!(!q.is_correct("A", ScoringPolicy::default()));
    }

    #[test]
    fn blank_submission_is_incorrect() {
        let q = question(json!(["A", "B"]), json!("A"));
        assert!(!q.is_correct("  ", ScoringPolicy::default()));
    }

    // -----------------------------------------------------------------------
    // well-formedness, scoring, completeness
    // -----------------------------------------------------------------------

    #[test]
    fn well_formed_requires_text_choices_and_key() {
        assert!(question(json!(["A", "B"]), json!(0)).is_well_formed());
        assert!(!question(json!(["A"]), json!(0)).is_well_formed());
        assert!(!question(json!(["A", "B"]), json!(null)).is_well_formed());
        let blank = QuizQuestion::from_parts(2, " ", &json!(["A", "B"]), &json!(0));
        assert!(!blank.is_well_formed());
    }

    fn three_questions() -> Vec<QuizQuestion> {
        vec![
            QuizQuestion::from_parts(10, "q1", &json!(["A", "B"]), &json!(0)),
            QuizQuestion::from_parts(11, "q2", &json!(["A", "B"]), &json!(1)),
            QuizQuestion::from_parts(12, "q3", &json!(["A", "B"]), &json!(["A"])),
        ]
    }

    #[test]
    fn score_counts_correct_answers() {
        let answers = HashMap::from([
            (10, "A".to_string()),
            (11, "A".to_string()),
            (12, "a".to_string()),
        ]);
        assert_eq!(score_answers(&three_questions(), &answers, ScoringPolicy::strict()), 2);
    }

    #[test]
    fn unanswered_questions_score_zero() {
        assert_eq!(
            score_answers(&three_questions(), &HashMap::new(), ScoringPolicy::default()),
            0
        );
    }

    #[test]
    fn missing_answers_lists_blank_and_absent() {
        let answers = HashMap::from([(10, "A".to_string()), (11, " ".to_string())]);
        assert_eq!(missing_answers(&three_questions(), &answers), vec![11, 12]);
    }
}
