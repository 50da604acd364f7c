use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::database::repository::{AttemptRepository, QuizRepository};
use crate::error::Result;
use crate::models::answer::{Answer, NewAnswer};
use crate::models::attempt::{Attempt, AttemptResult, NewAttempt, SubmitAttempt, SubmittedAnswer};
use crate::models::question::Question;
use crate::services::grading_service::GradingService;

#[derive(Clone)]
pub struct AttemptService {
    attempts: Arc<dyn AttemptRepository>,
    quizzes: Arc<dyn QuizRepository>,
}

impl AttemptService {
    pub fn new(attempts: Arc<dyn AttemptRepository>, quizzes: Arc<dyn QuizRepository>) -> Self {
        Self { attempts, quizzes }
    }

    /// Grades a submission and persists it as a new attempt.
    ///
    /// The attempt row, each answer row and the score update are separate
    /// statements. If grading stops partway, the attempt keeps the answers
    /// written so far and a score of zero, and the error is returned as is.
    pub async fn submit_attempt(&self, submission: SubmitAttempt) -> Result<AttemptResult> {
        let SubmitAttempt { quiz_id, answers } = submission;
        let total_questions = self.attempts.count_questions(quiz_id).await?;

        let now = Utc::now();
        let attempt_id = self
            .attempts
            .insert_attempt(NewAttempt {
                quiz_id,
                started_at: now,
                completed_at: now,
                score: 0,
                total_questions,
            })
            .await?;

        let graded = self.grade_answers(attempt_id, answers).await;
        let (correct_count, wrong_question_ids) = match graded {
            Ok(graded) => graded,
            Err(e) => {
                warn!(attempt_id, quiz_id, error = %e, "Grading aborted; attempt left partially graded");
                return Err(e);
            }
        };

        let score = GradingService::score(correct_count, total_questions);
        self.attempts.update_attempt_score(attempt_id, score).await?;

        let attempt = self.attempts.find_attempt(attempt_id).await?;
        let wrong_questions = self.fetch_questions(&wrong_question_ids).await;

        info!(
            attempt_id,
            quiz_id, score, correct_count, total_questions, "Attempt graded"
        );

        Ok(AttemptResult {
            attempt,
            score,
            total_questions,
            correct_count,
            wrong_questions,
        })
    }

    /// Checks and stores each answer in submission order. Returns the number
    /// of correct answers and the ids of missed questions, repeats included.
    async fn grade_answers(
        &self,
        attempt_id: i32,
        answers: Vec<SubmittedAnswer>,
    ) -> Result<(i32, Vec<i32>)> {
        let mut correct_count = 0;
        let mut wrong_question_ids = Vec::new();

        for answer in answers {
            let correct_answer = self.attempts.correct_answer(answer.question_id).await?;
            let is_correct = GradingService::is_correct(&answer.user_answer, &correct_answer);
            if is_correct {
                correct_count += 1;
            } else {
                wrong_question_ids.push(answer.question_id);
            }

            self.attempts
                .insert_answer(NewAnswer {
                    attempt_id,
                    question_id: answer.question_id,
                    user_answer: answer.user_answer,
                    is_correct,
                })
                .await?;
        }

        Ok((correct_count, wrong_question_ids))
    }

    // Questions that cannot be fetched are left out of the result.
    async fn fetch_questions(&self, question_ids: &[i32]) -> Vec<Question> {
        let mut questions = Vec::with_capacity(question_ids.len());
        for &question_id in question_ids {
            match self.quizzes.question_by_id(question_id).await {
                Ok(Some(question)) => questions.push(question),
                Ok(None) => {
                    warn!(question_id, "Missed question no longer exists; skipping");
                }
                Err(e) => {
                    warn!(question_id, error = %e, "Failed to fetch missed question; skipping");
                }
            }
        }
        questions
    }

    pub async fn list_attempts(&self, quiz_id: Option<i32>) -> Result<Vec<Attempt>> {
        self.attempts.list_attempts(quiz_id).await
    }

    pub async fn list_answers(&self, attempt_id: i32) -> Result<Vec<Answer>> {
        self.attempts.list_answers(attempt_id).await
    }
}
