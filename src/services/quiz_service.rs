use std::sync::Arc;

use futures::future::try_join_all;
use tracing::info;

use crate::database::repository::QuizRepository;
use crate::error::{Error, Result};
use crate::loader::Loaders;
use crate::models::question::{NewQuestion, Question, QuestionUpdate};
use crate::models::quiz::{NewQuiz, Quiz, QuizUpdate};
use crate::models::tag::Tag;

/// A quiz with its relations resolved.
#[derive(Debug, Clone)]
pub struct QuizDetails {
    pub quiz: Quiz,
    pub questions: Vec<Question>,
    pub tags: Vec<Tag>,
}

#[derive(Clone)]
pub struct QuizService {
    repo: Arc<dyn QuizRepository>,
}

impl QuizService {
    pub fn new(repo: Arc<dyn QuizRepository>) -> Self {
        Self { repo }
    }

    /// Every quiz, newest first. Relations for all quizzes are resolved
    /// concurrently, so the loaders see them in one window.
    pub async fn list_quizzes(&self, loaders: &Loaders) -> Result<Vec<QuizDetails>> {
        let quizzes = self.repo.list_quizzes().await?;
        try_join_all(quizzes.into_iter().map(|quiz| resolve(quiz, loaders))).await
    }

    pub async fn get_quiz(&self, quiz_id: i32, loaders: &Loaders) -> Result<QuizDetails> {
        let quiz = self
            .repo
            .find_quiz(quiz_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Quiz {} not found", quiz_id)))?;
        resolve(quiz, loaders).await
    }

    pub async fn create_quiz(&self, quiz: NewQuiz) -> Result<Quiz> {
        let created = self.repo.insert_quiz(quiz).await?;
        info!(quiz_id = created.id, "Quiz created");
        Ok(created)
    }

    /// Applies the update and returns the quiz with its relations as they
    /// stand afterwards.
    pub async fn update_quiz(
        &self,
        quiz_id: i32,
        update: QuizUpdate,
        loaders: &Loaders,
    ) -> Result<QuizDetails> {
        let quiz = self
            .repo
            .update_quiz(quiz_id, update)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Quiz {} not found", quiz_id)))?;
        info!(quiz_id, "Quiz updated");
        resolve(quiz, loaders).await
    }

    pub async fn delete_quiz(&self, quiz_id: i32) -> Result<()> {
        if !self.repo.delete_quiz(quiz_id).await? {
            return Err(Error::NotFound(format!("Quiz {} not found", quiz_id)));
        }
        info!(quiz_id, "Quiz deleted");
        Ok(())
    }

    pub async fn create_question(&self, question: NewQuestion) -> Result<Question> {
        self.repo.insert_question(question).await
    }

    pub async fn get_question(&self, question_id: i32) -> Result<Question> {
        self.repo
            .question_by_id(question_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Question {} not found", question_id)))
    }

    pub async fn list_questions(&self, quiz_id: Option<i32>) -> Result<Vec<Question>> {
        self.repo.list_questions(quiz_id).await
    }

    pub async fn update_question(
        &self,
        question_id: i32,
        update: QuestionUpdate,
    ) -> Result<Question> {
        let question = self
            .repo
            .update_question(question_id, update)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Question {} not found", question_id)))?;
        info!(question_id, "Question updated");
        Ok(question)
    }

    pub async fn delete_question(&self, question_id: i32) -> Result<()> {
        if !self.repo.delete_question(question_id).await? {
            return Err(Error::NotFound(format!(
                "Question {} not found",
                question_id
            )));
        }
        info!(question_id, "Question deleted");
        Ok(())
    }

    pub async fn question_tags(&self, question_id: i32) -> Result<Vec<Tag>> {
        self.get_question(question_id).await?;
        self.repo.tags_by_question_id(question_id).await
    }

    /// Questions answered incorrectly at least once.
    pub async fn wrong_questions(&self) -> Result<Vec<Question>> {
        self.repo.wrong_questions().await
    }

    pub async fn list_tags(&self) -> Result<Vec<Tag>> {
        self.repo.list_tags().await
    }

    pub async fn create_tag(&self, name: String) -> Result<Tag> {
        self.repo.insert_tag(name).await
    }
}

async fn resolve(quiz: Quiz, loaders: &Loaders) -> Result<QuizDetails> {
    let (questions, tags) = tokio::try_join!(
        loaders.questions_by_quiz.load(quiz.id),
        loaders.tags_by_quiz.load(quiz.id)
    )?;
    Ok(QuizDetails {
        quiz,
        questions,
        tags,
    })
}
