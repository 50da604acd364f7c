use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Answer {
    pub id: i32,
    pub attempt_id: i32,
    pub question_id: i32,
    pub user_answer: String,
    pub is_correct: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAnswer {
    pub attempt_id: i32,
    pub question_id: i32,
    pub user_answer: String,
    pub is_correct: bool,
}
