//! Repository for the `knowledge_questions` table.

use agora_core::stage::Stage;
use agora_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::knowledge_question::{CreateKnowledgeQuestion, KnowledgeQuestion};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, related_type, related_id, question, options, correct_answer, created_at, updated_at";

/// Provides CRUD operations for knowledge questions.
pub struct KnowledgeQuestionRepo;

impl KnowledgeQuestionRepo {
    /// Insert a new question, returning the created row.
    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        input: &CreateKnowledgeQuestion,
    ) -> Result<KnowledgeQuestion, sqlx::Error> {
        let query = format!(
            "INSERT INTO knowledge_questions (related_type, related_id, question, options, correct_answer)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, KnowledgeQuestion>(&query)
            .bind(&input.related_type)
            .bind(input.related_id)
            .bind(&input.question)
            .bind(&input.options)
            .bind(&input.correct_answer)
            .fetch_one(executor)
            .await
    }

    /// Questions quizzing one option, in creation order.
    pub async fn list_for_option<'e>(
        executor: impl PgExecutor<'e>,
        stage: Stage,
        option_id: DbId,
    ) -> Result<Vec<KnowledgeQuestion>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM knowledge_questions
             WHERE related_type = $1 AND related_id = $2
             ORDER BY id ASC"
        );
        sqlx::query_as::<_, KnowledgeQuestion>(&query)
            .bind(stage.related_type())
            .bind(option_id)
            .fetch_all(executor)
            .await
    }

    /// Questions for several options of the same stage, grouped by option.
    pub async fn list_for_options(
        pool: &PgPool,
        stage: Stage,
        option_ids: &[DbId],
    ) -> Result<Vec<KnowledgeQuestion>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM knowledge_questions
             WHERE related_type = $1 AND related_id = ANY($2)
             ORDER BY related_id ASC, id ASC"
        );
        sqlx::query_as::<_, KnowledgeQuestion>(&query)
            .bind(stage.related_type())
            .bind(option_ids)
            .fetch_all(pool)
            .await
    }

    /// Number of questions per option. Options without questions are absent.
    pub async fn count_by_option<'e>(
        executor: impl PgExecutor<'e>,
        stage: Stage,
        option_ids: &[DbId],
    ) -> Result<Vec<(DbId, i64)>, sqlx::Error> {
        sqlx::query_as::<_, (DbId, i64)>(
            "SELECT related_id, COUNT(*) FROM knowledge_questions
             WHERE related_type = $1 AND related_id = ANY($2)
             GROUP BY related_id",
        )
        .bind(stage.related_type())
        .bind(option_ids)
        .fetch_all(executor)
        .await
    }
}
