use serde::{Deserialize, Serialize};

use super::attempt_dto::AttemptResponse;
use crate::models::statistics::{CategoryStat, Statistics};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatisticsResponse {
    pub total_attempts: i64,
    pub average_score: f64,
    pub category_stats: Vec<CategoryStat>,
    pub recent_attempts: Vec<AttemptResponse>,
}

impl From<Statistics> for StatisticsResponse {
    fn from(stats: Statistics) -> Self {
        Self {
            total_attempts: stats.total_attempts,
            average_score: stats.average_score,
            category_stats: stats.category_stats,
            recent_attempts: stats
                .recent_attempts
                .into_iter()
                .map(AttemptResponse::from)
                .collect(),
        }
    }
}
