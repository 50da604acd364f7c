use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Quiz {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuiz {
    pub title: String,
    pub description: Option<String>,
    pub tag_ids: Vec<i32>,
}

/// Partial update; `None` fields keep their stored value. `Some` tag ids
/// replace the quiz's tag links, an empty list clears them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuizUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub tag_ids: Option<Vec<i32>>,
}
