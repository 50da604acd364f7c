use std::sync::Arc;

use crate::database::repository::{AttemptRepository, StatisticsRepository};
use crate::error::Result;
use crate::models::statistics::Statistics;

const RECENT_ATTEMPTS: usize = 10;

#[derive(Clone)]
pub struct StatisticsService {
    stats: Arc<dyn StatisticsRepository>,
    attempts: Arc<dyn AttemptRepository>,
}

impl StatisticsService {
    pub fn new(stats: Arc<dyn StatisticsRepository>, attempts: Arc<dyn AttemptRepository>) -> Self {
        Self { stats, attempts }
    }

    pub async fn get_statistics(&self) -> Result<Statistics> {
        let total_attempts = self.stats.count_attempts().await?;
        let average_score = self.stats.average_score().await?;
        let category_stats = self.stats.category_stats().await?;

        let mut recent_attempts = self.attempts.list_attempts(None).await?;
        recent_attempts.truncate(RECENT_ATTEMPTS);

        Ok(Statistics {
            total_attempts,
            average_score,
            category_stats,
            recent_attempts,
        })
    }
}
