use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use super::batch::{BatchFn, Loader, LoaderConfig};
use crate::database::repository::QuizRepository;
use crate::error::Result;
use crate::models::question::Question;
use crate::models::tag::Tag;

pub struct QuestionsByQuiz {
    repo: Arc<dyn QuizRepository>,
}

#[async_trait]
impl BatchFn<i32, Vec<Question>> for QuestionsByQuiz {
    fn name(&self) -> &'static str {
        "questions_by_quiz"
    }

    async fn load(&self, quiz_ids: Vec<i32>) -> Result<HashMap<i32, Vec<Question>>> {
        self.repo.questions_by_quiz_ids(quiz_ids).await
    }
}

pub struct TagsByQuiz {
    repo: Arc<dyn QuizRepository>,
}

#[async_trait]
impl BatchFn<i32, Vec<Tag>> for TagsByQuiz {
    fn name(&self) -> &'static str {
        "tags_by_quiz"
    }

    async fn load(&self, quiz_ids: Vec<i32>) -> Result<HashMap<i32, Vec<Tag>>> {
        self.repo.tags_by_quiz_ids(quiz_ids).await
    }
}

/// The loader set for one inbound request.
///
/// Build one per request and hand it to whatever resolves quiz relations;
/// dropping it stops the dispatchers and discards their caches.
#[derive(Clone)]
pub struct Loaders {
    pub questions_by_quiz: Loader<i32, Vec<Question>>,
    pub tags_by_quiz: Loader<i32, Vec<Tag>>,
}

impl Loaders {
    pub fn new(repo: Arc<dyn QuizRepository>, config: LoaderConfig) -> Self {
        Self {
            questions_by_quiz: Loader::new(QuestionsByQuiz { repo: repo.clone() }, config),
            tags_by_quiz: Loader::new(TagsByQuiz { repo }, config),
        }
    }
}
