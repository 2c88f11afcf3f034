//! Knowledge question models.

use agora_core::quiz::QuizQuestion;
use agora_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

/// A row from the `knowledge_questions` table.
///
/// `options` and `correct_answer` are stored as raw JSON; call
/// [`KnowledgeQuestion::to_quiz`] to classify them for scoring.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct KnowledgeQuestion {
    pub id: DbId,
    pub related_type: String,
    pub related_id: DbId,
    pub question: String,
    pub options: Value,
    pub correct_answer: Option<Value>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl KnowledgeQuestion {
    pub fn to_quiz(&self) -> QuizQuestion {
        QuizQuestion::from_parts(
            self.id,
            &self.question,
            &self.options,
            self.correct_answer.as_ref().unwrap_or(&Value::Null),
        )
    }
}

/// DTO for creating a knowledge question.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateKnowledgeQuestion {
    pub related_type: String,
    pub related_id: DbId,
    pub question: String,
    pub options: Value,
    pub correct_answer: Option<Value>,
}

/// A question as shown to voters: choices normalized, answer key withheld.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionView {
    pub id: DbId,
    pub question: String,
    pub choices: Vec<String>,
}

impl From<&KnowledgeQuestion> for QuestionView {
    fn from(q: &KnowledgeQuestion) -> Self {
        Self {
            id: q.id,
            question: q.question.clone(),
            choices: agora_core::quiz::normalize_choices(&q.options),
        }
    }
}
