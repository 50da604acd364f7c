use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;

use super::repository::{AttemptRepository, QuizRepository, StatisticsRepository};
use crate::error::{Error, Result};
use crate::models::answer::{Answer, NewAnswer};
use crate::models::attempt::{Attempt, NewAttempt};
use crate::models::question::{NewQuestion, Question, QuestionUpdate};
use crate::models::quiz::{NewQuiz, Quiz, QuizUpdate};
use crate::models::statistics::CategoryStat;
use crate::models::tag::{QuizTagRow, Tag};

const QUESTION_COLUMNS: &str = "id, quiz_id, type, content, options, correct_answer, explanation, difficulty, created_at, updated_at";
const ATTEMPT_COLUMNS: &str = "id, quiz_id, started_at, completed_at, score, total_questions";

#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn link_quiz_tags(&self, quiz_id: i32, tag_ids: Vec<i32>) -> Result<()> {
        if tag_ids.is_empty() {
            return Ok(());
        }
        sqlx::query(
            r#"
            INSERT INTO quiz_tags (quiz_id, tag_id)
            SELECT $1, tag_id FROM UNNEST($2::integer[]) AS tag_id
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(quiz_id)
        .bind(tag_ids)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn link_question_tags(&self, question_id: i32, tag_ids: Vec<i32>) -> Result<()> {
        if tag_ids.is_empty() {
            return Ok(());
        }
        sqlx::query(
            r#"
            INSERT INTO question_tags (question_id, tag_id)
            SELECT $1, tag_id FROM UNNEST($2::integer[]) AS tag_id
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(question_id)
        .bind(tag_ids)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db| db.code())
        .map(|code| code == "23505")
        .unwrap_or(false)
}

#[async_trait]
impl AttemptRepository for PgRepository {
    async fn count_questions(&self, quiz_id: i32) -> Result<i32> {
        let count: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM questions WHERE quiz_id = $1"#)
            .bind(quiz_id)
            .fetch_one(&self.pool)
            .await?;

        i32::try_from(count)
            .map_err(|_| Error::Internal(format!("Question count out of range: {}", count)))
    }

    async fn correct_answer(&self, question_id: i32) -> Result<String> {
        let answer: Option<String> =
            sqlx::query_scalar(r#"SELECT correct_answer FROM questions WHERE id = $1"#)
                .bind(question_id)
                .fetch_optional(&self.pool)
                .await?;

        answer.ok_or_else(|| Error::NotFound(format!("Question {} not found", question_id)))
    }

    async fn insert_attempt(&self, attempt: NewAttempt) -> Result<i32> {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO attempts (quiz_id, started_at, completed_at, score, total_questions)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(attempt.quiz_id)
        .bind(attempt.started_at)
        .bind(attempt.completed_at)
        .bind(attempt.score)
        .bind(attempt.total_questions)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    async fn insert_answer(&self, answer: NewAnswer) -> Result<()> {
        sqlx::query(
            r#"INSERT INTO answers (attempt_id, question_id, user_answer, is_correct) VALUES ($1, $2, $3, $4)"#,
        )
        .bind(answer.attempt_id)
        .bind(answer.question_id)
        .bind(answer.user_answer)
        .bind(answer.is_correct)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_attempt_score(&self, attempt_id: i32, score: i32) -> Result<()> {
        sqlx::query(r#"UPDATE attempts SET score = $1 WHERE id = $2"#)
            .bind(score)
            .bind(attempt_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_attempt(&self, attempt_id: i32) -> Result<Attempt> {
        let attempt = sqlx::query_as::<_, Attempt>(&format!(
            "SELECT {} FROM attempts WHERE id = $1",
            ATTEMPT_COLUMNS
        ))
        .bind(attempt_id)
        .fetch_optional(&self.pool)
        .await?;

        attempt.ok_or_else(|| Error::NotFound(format!("Attempt {} not found", attempt_id)))
    }

    async fn list_attempts(&self, quiz_id: Option<i32>) -> Result<Vec<Attempt>> {
        let rows = sqlx::query_as::<_, Attempt>(&format!(
            r#"
            SELECT {} FROM attempts
            WHERE ($1::integer IS NULL OR quiz_id = $1)
            ORDER BY started_at DESC, id DESC
            "#,
            ATTEMPT_COLUMNS
        ))
        .bind(quiz_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_answers(&self, attempt_id: i32) -> Result<Vec<Answer>> {
        let rows = sqlx::query_as::<_, Answer>(
            r#"
            SELECT id, attempt_id, question_id, user_answer, is_correct
            FROM answers
            WHERE attempt_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(attempt_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

#[async_trait]
impl QuizRepository for PgRepository {
    async fn list_quizzes(&self) -> Result<Vec<Quiz>> {
        let rows = sqlx::query_as::<_, Quiz>(
            r#"SELECT id, title, description, created_at, updated_at FROM quizzes ORDER BY created_at DESC, id DESC"#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn find_quiz(&self, quiz_id: i32) -> Result<Option<Quiz>> {
        let quiz = sqlx::query_as::<_, Quiz>(
            r#"SELECT id, title, description, created_at, updated_at FROM quizzes WHERE id = $1"#,
        )
        .bind(quiz_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(quiz)
    }

    async fn insert_quiz(&self, quiz: NewQuiz) -> Result<Quiz> {
        let created = sqlx::query_as::<_, Quiz>(
            r#"
            INSERT INTO quizzes (title, description)
            VALUES ($1, $2)
            RETURNING id, title, description, created_at, updated_at
            "#,
        )
        .bind(quiz.title)
        .bind(quiz.description)
        .fetch_one(&self.pool)
        .await?;

        self.link_quiz_tags(created.id, quiz.tag_ids).await?;
        Ok(created)
    }

    async fn update_quiz(&self, quiz_id: i32, update: QuizUpdate) -> Result<Option<Quiz>> {
        let updated = sqlx::query_as::<_, Quiz>(
            r#"
            UPDATE quizzes
            SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, title, description, created_at, updated_at
            "#,
        )
        .bind(quiz_id)
        .bind(update.title)
        .bind(update.description)
        .fetch_optional(&self.pool)
        .await?;

        let Some(quiz) = updated else {
            return Ok(None);
        };

        if let Some(tag_ids) = update.tag_ids {
            sqlx::query(r#"DELETE FROM quiz_tags WHERE quiz_id = $1"#)
                .bind(quiz_id)
                .execute(&self.pool)
                .await?;
            self.link_quiz_tags(quiz_id, tag_ids).await?;
        }

        Ok(Some(quiz))
    }

    async fn delete_quiz(&self, quiz_id: i32) -> Result<bool> {
        let result = sqlx::query(r#"DELETE FROM quizzes WHERE id = $1"#)
            .bind(quiz_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn questions_by_quiz_ids(
        &self,
        quiz_ids: Vec<i32>,
    ) -> Result<HashMap<i32, Vec<Question>>> {
        let rows = sqlx::query_as::<_, Question>(&format!(
            r#"
            SELECT {} FROM questions
            WHERE quiz_id = ANY($1)
            ORDER BY quiz_id ASC, created_at ASC, id ASC
            "#,
            QUESTION_COLUMNS
        ))
        .bind(quiz_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<i32, Vec<Question>> = HashMap::new();
        for question in rows {
            if let Some(quiz_id) = question.quiz_id {
                grouped.entry(quiz_id).or_default().push(question);
            }
        }
        Ok(grouped)
    }

    async fn tags_by_quiz_ids(&self, quiz_ids: Vec<i32>) -> Result<HashMap<i32, Vec<Tag>>> {
        let rows = sqlx::query_as::<_, QuizTagRow>(
            r#"
            SELECT qt.quiz_id, t.id, t.name
            FROM tags t
            JOIN quiz_tags qt ON t.id = qt.tag_id
            WHERE qt.quiz_id = ANY($1)
            ORDER BY qt.quiz_id ASC, t.name ASC
            "#,
        )
        .bind(quiz_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<i32, Vec<Tag>> = HashMap::new();
        for row in rows {
            grouped.entry(row.quiz_id).or_default().push(row.into());
        }
        Ok(grouped)
    }

    async fn question_by_id(&self, question_id: i32) -> Result<Option<Question>> {
        let question = sqlx::query_as::<_, Question>(&format!(
            "SELECT {} FROM questions WHERE id = $1",
            QUESTION_COLUMNS
        ))
        .bind(question_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(question)
    }

    async fn insert_question(&self, question: NewQuestion) -> Result<Question> {
        let created = sqlx::query_as::<_, Question>(&format!(
            r#"
            INSERT INTO questions (quiz_id, type, content, options, correct_answer, explanation, difficulty)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            QUESTION_COLUMNS
        ))
        .bind(question.quiz_id)
        .bind(question.question_type.as_str())
        .bind(question.content)
        .bind(question.options)
        .bind(question.correct_answer)
        .bind(question.explanation)
        .bind(question.difficulty.as_str())
        .fetch_one(&self.pool)
        .await?;

        self.link_question_tags(created.id, question.tag_ids).await?;
        Ok(created)
    }

    async fn list_questions(&self, quiz_id: Option<i32>) -> Result<Vec<Question>> {
        let rows = sqlx::query_as::<_, Question>(&format!(
            r#"
            SELECT {} FROM questions
            WHERE ($1::integer IS NULL OR quiz_id = $1)
            ORDER BY created_at ASC, id ASC
            "#,
            QUESTION_COLUMNS
        ))
        .bind(quiz_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn update_question(
        &self,
        question_id: i32,
        update: QuestionUpdate,
    ) -> Result<Option<Question>> {
        let updated = sqlx::query_as::<_, Question>(&format!(
            r#"
            UPDATE questions
            SET
                type = COALESCE($2, type),
                content = COALESCE($3, content),
                options = COALESCE($4, options),
                correct_answer = COALESCE($5, correct_answer),
                explanation = COALESCE($6, explanation),
                difficulty = COALESCE($7, difficulty),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            QUESTION_COLUMNS
        ))
        .bind(question_id)
        .bind(update.question_type.map(|t| t.as_str()))
        .bind(update.content)
        .bind(update.options)
        .bind(update.correct_answer)
        .bind(update.explanation)
        .bind(update.difficulty.map(|d| d.as_str()))
        .fetch_optional(&self.pool)
        .await?;

        let Some(question) = updated else {
            return Ok(None);
        };

        if let Some(tag_ids) = update.tag_ids {
            sqlx::query(r#"DELETE FROM question_tags WHERE question_id = $1"#)
                .bind(question_id)
                .execute(&self.pool)
                .await?;
            self.link_question_tags(question_id, tag_ids).await?;
        }

        Ok(Some(question))
    }

    async fn delete_question(&self, question_id: i32) -> Result<bool> {
        let result = sqlx::query(r#"DELETE FROM questions WHERE id = $1"#)
            .bind(question_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn tags_by_question_id(&self, question_id: i32) -> Result<Vec<Tag>> {
        let rows = sqlx::query_as::<_, Tag>(
            r#"
            SELECT t.id, t.name
            FROM tags t
            JOIN question_tags qt ON t.id = qt.tag_id
            WHERE qt.question_id = $1
            ORDER BY t.name ASC
            "#,
        )
        .bind(question_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn wrong_questions(&self) -> Result<Vec<Question>> {
        let rows = sqlx::query_as::<_, Question>(&format!(
            r#"
            SELECT {} FROM questions q
            WHERE EXISTS (
                SELECT 1 FROM answers a WHERE a.question_id = q.id AND NOT a.is_correct
            )
            ORDER BY created_at DESC, id DESC
            "#,
            QUESTION_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_tags(&self) -> Result<Vec<Tag>> {
        let rows = sqlx::query_as::<_, Tag>(r#"SELECT id, name FROM tags ORDER BY name ASC"#)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn insert_tag(&self, name: String) -> Result<Tag> {
        sqlx::query_as::<_, Tag>(r#"INSERT INTO tags (name) VALUES ($1) RETURNING id, name"#)
            .bind(&name)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    Error::BadRequest(format!("Tag '{}' already exists", name))
                } else {
                    e.into()
                }
            })
    }
}

#[async_trait]
impl StatisticsRepository for PgRepository {
    async fn count_attempts(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM attempts"#)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn average_score(&self) -> Result<f64> {
        let avg: f64 = sqlx::query_scalar(
            r#"SELECT COALESCE(AVG(score)::FLOAT8, 0) FROM attempts WHERE total_questions > 0"#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(avg)
    }

    async fn category_stats(&self) -> Result<Vec<CategoryStat>> {
        let rows = sqlx::query_as::<_, CategoryStat>(
            r#"
            SELECT
                t.name AS tag_name,
                (AVG(CASE WHEN a.is_correct THEN 1.0 ELSE 0.0 END) * 100)::FLOAT8 AS correct_rate,
                COUNT(*) AS total_answers
            FROM tags t
            JOIN question_tags qt ON t.id = qt.tag_id
            JOIN answers a ON qt.question_id = a.question_id
            GROUP BY t.name
            ORDER BY t.name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
