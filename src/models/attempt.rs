use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::question::Question;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Attempt {
    pub id: i32,
    pub quiz_id: Option<i32>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Percentage, derived from the answers at submission time.
    pub score: i32,
    /// Question count of the quiz when the attempt was taken.
    pub total_questions: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAttempt {
    pub quiz_id: i32,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub score: i32,
    pub total_questions: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedAnswer {
    pub question_id: i32,
    pub user_answer: String,
}

#[derive(Debug, Clone)]
pub struct SubmitAttempt {
    pub quiz_id: i32,
    pub answers: Vec<SubmittedAnswer>,
}

/// Outcome of grading one submission.
#[derive(Debug, Clone)]
pub struct AttemptResult {
    pub attempt: Attempt,
    pub score: i32,
    pub total_questions: i32,
    pub correct_count: i32,
    /// Missed questions in the order they were answered.
    pub wrong_questions: Vec<Question>,
}
