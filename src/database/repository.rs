//! Storage seams used by the services and the batch loaders.
//!
//! `PgRepository` implements all three traits against Postgres; unit tests
//! substitute the `mockall` mocks generated here.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::answer::{Answer, NewAnswer};
use crate::models::attempt::{Attempt, NewAttempt};
use crate::models::question::{NewQuestion, Question, QuestionUpdate};
use crate::models::quiz::{NewQuiz, Quiz, QuizUpdate};
use crate::models::statistics::CategoryStat;
use crate::models::tag::Tag;

/// Attempt and answer persistence.
///
/// Every method is an independently committed statement; callers that chain
/// several of them get no atomicity across the chain.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AttemptRepository: Send + Sync {
    async fn count_questions(&self, quiz_id: i32) -> Result<i32>;

    /// `Error::NotFound` when the question does not exist.
    async fn correct_answer(&self, question_id: i32) -> Result<String>;

    /// Returns the id of the new attempt.
    async fn insert_attempt(&self, attempt: NewAttempt) -> Result<i32>;

    async fn insert_answer(&self, answer: NewAnswer) -> Result<()>;

    async fn update_attempt_score(&self, attempt_id: i32, score: i32) -> Result<()>;

    async fn find_attempt(&self, attempt_id: i32) -> Result<Attempt>;

    /// Newest start time first.
    async fn list_attempts(&self, quiz_id: Option<i32>) -> Result<Vec<Attempt>>;

    /// Ascending id order.
    async fn list_answers(&self, attempt_id: i32) -> Result<Vec<Answer>>;
}

/// Quizzes, questions and tags.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuizRepository: Send + Sync {
    async fn list_quizzes(&self) -> Result<Vec<Quiz>>;

    async fn find_quiz(&self, quiz_id: i32) -> Result<Option<Quiz>>;

    /// Inserts the quiz and links the given tags to it.
    async fn insert_quiz(&self, quiz: NewQuiz) -> Result<Quiz>;

    /// `None` when no quiz had that id. `Some` tag ids replace the links.
    async fn update_quiz(&self, quiz_id: i32, update: QuizUpdate) -> Result<Option<Quiz>>;

    /// `false` when no quiz had that id.
    async fn delete_quiz(&self, quiz_id: i32) -> Result<bool>;

    /// Questions grouped per quiz, each group ordered by creation time.
    /// Quizzes without questions are absent from the map.
    async fn questions_by_quiz_ids(&self, quiz_ids: Vec<i32>)
        -> Result<HashMap<i32, Vec<Question>>>;

    /// Tags grouped per quiz, each group ordered by name.
    async fn tags_by_quiz_ids(&self, quiz_ids: Vec<i32>) -> Result<HashMap<i32, Vec<Tag>>>;

    async fn question_by_id(&self, question_id: i32) -> Result<Option<Question>>;

    /// Oldest first; restricted to one quiz when `quiz_id` is given.
    async fn list_questions(&self, quiz_id: Option<i32>) -> Result<Vec<Question>>;

    /// Inserts the question and links the given tags to it.
    async fn insert_question(&self, question: NewQuestion) -> Result<Question>;

    /// `None` when no question had that id. `Some` tag ids replace the links.
    async fn update_question(
        &self,
        question_id: i32,
        update: QuestionUpdate,
    ) -> Result<Option<Question>>;

    /// `false` when no question had that id. Its answers go with it.
    async fn delete_question(&self, question_id: i32) -> Result<bool>;

    /// Ordered by name.
    async fn tags_by_question_id(&self, question_id: i32) -> Result<Vec<Tag>>;

    /// Questions with at least one incorrect recorded answer, newest first.
    async fn wrong_questions(&self) -> Result<Vec<Question>>;

    async fn list_tags(&self) -> Result<Vec<Tag>>;

    async fn insert_tag(&self, name: String) -> Result<Tag>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatisticsRepository: Send + Sync {
    async fn count_attempts(&self) -> Result<i64>;

    /// Mean score of attempts that had at least one question; `0.0` when none.
    async fn average_score(&self) -> Result<f64>;

    /// Per-tag share of correct answers, ordered by tag name.
    async fn category_stats(&self) -> Result<Vec<CategoryStat>>;
}
