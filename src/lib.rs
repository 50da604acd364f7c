pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod loader;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;

use sqlx::PgPool;

use crate::database::{
    pg_repository::PgRepository,
    repository::{AttemptRepository, QuizRepository, StatisticsRepository},
};
use crate::loader::{LoaderConfig, Loaders};
use crate::services::{
    attempt_service::AttemptService, quiz_service::QuizService,
    statistics_service::StatisticsService,
};

#[derive(Clone)]
pub struct AppState {
    pub quiz_repository: Arc<dyn QuizRepository>,
    pub attempt_service: AttemptService,
    pub quiz_service: QuizService,
    pub statistics_service: StatisticsService,
    pub loader_config: LoaderConfig,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let config = crate::config::get_config();
        let repo = Arc::new(PgRepository::new(pool));
        Self::from_repositories(repo.clone(), repo.clone(), repo, config.loader_config())
    }

    pub fn from_repositories(
        attempts: Arc<dyn AttemptRepository>,
        quizzes: Arc<dyn QuizRepository>,
        stats: Arc<dyn StatisticsRepository>,
        loader_config: LoaderConfig,
    ) -> Self {
        Self {
            attempt_service: AttemptService::new(attempts.clone(), quizzes.clone()),
            quiz_service: QuizService::new(quizzes.clone()),
            statistics_service: StatisticsService::new(stats, attempts),
            quiz_repository: quizzes,
            loader_config,
        }
    }

    /// A fresh loader set; build one per request.
    pub fn loaders(&self) -> Loaders {
        Loaders::new(self.quiz_repository.clone(), self.loader_config)
    }
}
