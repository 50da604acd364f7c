use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::attempt::Attempt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct CategoryStat {
    pub tag_name: String,
    pub correct_rate: f64,
    pub total_answers: i64,
}

#[derive(Debug, Clone)]
pub struct Statistics {
    pub total_attempts: i64,
    pub average_score: f64,
    pub category_stats: Vec<CategoryStat>,
    pub recent_attempts: Vec<Attempt>,
}
