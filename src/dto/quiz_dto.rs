use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{Error, Result};
use crate::models::question::{Difficulty, NewQuestion, Question, QuestionType, QuestionUpdate};
use crate::models::quiz::{NewQuiz, Quiz, QuizUpdate};
use crate::models::tag::Tag;
use crate::services::quiz_service::QuizDetails;
use crate::utils::ids::{parse_ids, parse_optional_id};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateQuizPayload {
    #[validate(length(min = 1))]
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub tag_ids: Vec<String>,
}

impl TryFrom<CreateQuizPayload> for NewQuiz {
    type Error = Error;

    fn try_from(payload: CreateQuizPayload) -> Result<Self> {
        Ok(NewQuiz {
            tag_ids: parse_ids(&payload.tag_ids, "tag_ids")?,
            title: payload.title,
            description: payload.description,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateQuestionPayload {
    pub quiz_id: Option<String>,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    #[validate(length(min = 1))]
    pub content: String,
    #[serde(default)]
    pub options: Vec<String>,
    pub correct_answer: String,
    pub explanation: Option<String>,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub tag_ids: Vec<String>,
}

impl TryFrom<CreateQuestionPayload> for NewQuestion {
    type Error = Error;

    fn try_from(payload: CreateQuestionPayload) -> Result<Self> {
        if payload.question_type.uses_options() && payload.options.is_empty() {
            return Err(Error::BadRequest(format!(
                "{} questions need at least one option",
                payload.question_type
            )));
        }

        Ok(NewQuestion {
            quiz_id: parse_optional_id(payload.quiz_id.as_deref(), "quiz_id")?,
            tag_ids: parse_ids(&payload.tag_ids, "tag_ids")?,
            question_type: payload.question_type,
            content: payload.content,
            options: payload.options,
            correct_answer: payload.correct_answer,
            explanation: payload.explanation,
            difficulty: payload.difficulty,
        })
    }
}

/// Absent fields are left unchanged. `tag_ids`, when present, replaces the
/// quiz's tags.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateQuizPayload {
    #[validate(length(min = 1))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub tag_ids: Option<Vec<String>>,
}

impl TryFrom<UpdateQuizPayload> for QuizUpdate {
    type Error = Error;

    fn try_from(payload: UpdateQuizPayload) -> Result<Self> {
        Ok(QuizUpdate {
            tag_ids: payload
                .tag_ids
                .map(|ids| parse_ids(&ids, "tag_ids"))
                .transpose()?,
            title: payload.title,
            description: payload.description,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateQuestionPayload {
    #[serde(rename = "type")]
    pub question_type: Option<QuestionType>,
    #[validate(length(min = 1))]
    pub content: Option<String>,
    pub options: Option<Vec<String>>,
    pub correct_answer: Option<String>,
    pub explanation: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub tag_ids: Option<Vec<String>>,
}

impl TryFrom<UpdateQuestionPayload> for QuestionUpdate {
    type Error = Error;

    fn try_from(payload: UpdateQuestionPayload) -> Result<Self> {
        if let (Some(question_type), Some(options)) = (payload.question_type, &payload.options) {
            if question_type.uses_options() && options.is_empty() {
                return Err(Error::BadRequest(format!(
                    "{} questions need at least one option",
                    question_type
                )));
            }
        }

        Ok(QuestionUpdate {
            tag_ids: payload
                .tag_ids
                .map(|ids| parse_ids(&ids, "tag_ids"))
                .transpose()?,
            question_type: payload.question_type,
            content: payload.content,
            options: payload.options,
            correct_answer: payload.correct_answer,
            explanation: payload.explanation,
            difficulty: payload.difficulty,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct QuestionListQuery {
    pub quiz_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateTagPayload {
    #[validate(length(min = 1))]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagResponse {
    pub id: String,
    pub name: String,
}

impl From<Tag> for TagResponse {
    fn from(tag: Tag) -> Self {
        Self {
            id: tag.id.to_string(),
            name: tag.name,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionResponse {
    pub id: String,
    pub quiz_id: Option<String>,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub content: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub explanation: Option<String>,
    pub difficulty: Difficulty,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Fails only when the stored enum text is not a known symbolic name.
impl TryFrom<Question> for QuestionResponse {
    type Error = Error;

    fn try_from(q: Question) -> Result<Self> {
        Ok(Self {
            id: q.id.to_string(),
            quiz_id: q.quiz_id.map(|id| id.to_string()),
            question_type: q.question_type.parse()?,
            content: q.content,
            options: q.options,
            correct_answer: q.correct_answer,
            explanation: q.explanation,
            difficulty: q.difficulty.parse()?,
            created_at: q.created_at,
            updated_at: q.updated_at,
        })
    }
}

pub fn question_responses(questions: Vec<Question>) -> Result<Vec<QuestionResponse>> {
    questions.into_iter().map(QuestionResponse::try_from).collect()
}

/// A quiz without its relations, returned on creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizSummaryResponse {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Quiz> for QuizSummaryResponse {
    fn from(quiz: Quiz) -> Self {
        Self {
            id: quiz.id.to_string(),
            title: quiz.title,
            description: quiz.description,
            created_at: quiz.created_at,
            updated_at: quiz.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizResponse {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub questions: Vec<QuestionResponse>,
    pub tags: Vec<TagResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<QuizDetails> for QuizResponse {
    type Error = Error;

    fn try_from(details: QuizDetails) -> Result<Self> {
        let QuizDetails {
            quiz,
            questions,
            tags,
        } = details;
        Ok(Self {
            id: quiz.id.to_string(),
            title: quiz.title,
            description: quiz.description,
            questions: question_responses(questions)?,
            tags: tags.into_iter().map(TagResponse::from).collect(),
            created_at: quiz.created_at,
            updated_at: quiz.updated_at,
        })
    }
}
