use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::quiz_dto::QuestionResponse;
use crate::error::{Error, Result};
use crate::models::answer::Answer;
use crate::models::attempt::{Attempt, AttemptResult, SubmitAttempt, SubmittedAnswer};
use crate::utils::ids::parse_id;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerInput {
    pub question_id: String,
    pub user_answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitAttemptPayload {
    pub quiz_id: String,
    #[serde(default)]
    pub answers: Vec<AnswerInput>,
}

impl TryFrom<SubmitAttemptPayload> for SubmitAttempt {
    type Error = Error;

    fn try_from(payload: SubmitAttemptPayload) -> Result<Self> {
        let quiz_id = parse_id(&payload.quiz_id, "quiz_id")?;
        let answers = payload
            .answers
            .into_iter()
            .map(|a| {
                Ok(SubmittedAnswer {
                    question_id: parse_id(&a.question_id, "question_id")?,
                    user_answer: a.user_answer,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(SubmitAttempt { quiz_id, answers })
    }
}

#[derive(Debug, Deserialize)]
pub struct AttemptListQuery {
    pub quiz_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptResponse {
    pub id: String,
    pub quiz_id: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub score: i32,
    pub total_questions: i32,
}

impl From<Attempt> for AttemptResponse {
    fn from(attempt: Attempt) -> Self {
        Self {
            id: attempt.id.to_string(),
            quiz_id: attempt.quiz_id.map(|id| id.to_string()),
            started_at: attempt.started_at,
            completed_at: attempt.completed_at,
            score: attempt.score,
            total_questions: attempt.total_questions,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerResponse {
    pub id: String,
    pub attempt_id: String,
    pub question_id: String,
    pub user_answer: String,
    pub is_correct: bool,
}

impl From<Answer> for AnswerResponse {
    fn from(answer: Answer) -> Self {
        Self {
            id: answer.id.to_string(),
            attempt_id: answer.attempt_id.to_string(),
            question_id: answer.question_id.to_string(),
            user_answer: answer.user_answer,
            is_correct: answer.is_correct,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptResultResponse {
    pub attempt: AttemptResponse,
    pub score: i32,
    pub total_questions: i32,
    pub correct_count: i32,
    pub wrong_questions: Vec<QuestionResponse>,
}

// The attempt is already stored when this runs, so a missed question whose
// stored enum text cannot be rendered is left out rather than failing the reply.
impl From<AttemptResult> for AttemptResultResponse {
    fn from(result: AttemptResult) -> Self {
        let wrong_questions = result
            .wrong_questions
            .into_iter()
            .filter_map(|question| {
                let question_id = question.id;
                match QuestionResponse::try_from(question) {
                    Ok(response) => Some(response),
                    Err(e) => {
                        warn!(question_id, error = %e, "Skipping unrenderable missed question");
                        None
                    }
                }
            })
            .collect();

        Self {
            attempt: result.attempt.into(),
            score: result.score,
            total_questions: result.total_questions,
            correct_count: result.correct_count,
            wrong_questions,
        }
    }
}
