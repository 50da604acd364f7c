use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use validator::Validate;

use crate::{
    dto::quiz_dto::{
        question_responses, CreateQuestionPayload, CreateQuizPayload, CreateTagPayload,
        QuestionListQuery, QuestionResponse, QuizResponse, QuizSummaryResponse, TagResponse,
        UpdateQuestionPayload, UpdateQuizPayload,
    },
    error::Result,
    utils::ids::{parse_id, parse_optional_id},
    AppState,
};

#[axum::debug_handler]
pub async fn list_quizzes(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let loaders = state.loaders();
    let quizzes = state.quiz_service.list_quizzes(&loaders).await?;
    let body = quizzes
        .into_iter()
        .map(QuizResponse::try_from)
        .collect::<Result<Vec<_>>>()?;
    Ok(Json(body))
}

#[axum::debug_handler]
pub async fn get_quiz(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let quiz_id = parse_id(&id, "quiz id")?;
    let loaders = state.loaders();
    let quiz = state.quiz_service.get_quiz(quiz_id, &loaders).await?;
    Ok(Json(QuizResponse::try_from(quiz)?))
}

#[axum::debug_handler]
pub async fn create_quiz(
    State(state): State<AppState>,
    Json(payload): Json<CreateQuizPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let quiz = state.quiz_service.create_quiz(payload.try_into()?).await?;
    Ok((StatusCode::CREATED, Json(QuizSummaryResponse::from(quiz))))
}

#[axum::debug_handler]
pub async fn update_quiz(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateQuizPayload>,
) -> Result<impl IntoResponse> {
    let quiz_id = parse_id(&id, "quiz id")?;
    payload.validate()?;
    let loaders = state.loaders();
    let quiz = state
        .quiz_service
        .update_quiz(quiz_id, payload.try_into()?, &loaders)
        .await?;
    Ok(Json(QuizResponse::try_from(quiz)?))
}

#[axum::debug_handler]
pub async fn delete_quiz(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let quiz_id = parse_id(&id, "quiz id")?;
    state.quiz_service.delete_quiz(quiz_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
pub async fn list_questions(
    State(state): State<AppState>,
    Query(query): Query<QuestionListQuery>,
) -> Result<impl IntoResponse> {
    let quiz_id = parse_optional_id(query.quiz_id.as_deref(), "quiz_id")?;
    let questions = state.quiz_service.list_questions(quiz_id).await?;
    Ok(Json(question_responses(questions)?))
}

#[axum::debug_handler]
pub async fn create_question(
    State(state): State<AppState>,
    Json(payload): Json<CreateQuestionPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let question = state
        .quiz_service
        .create_question(payload.try_into()?)
        .await?;
    Ok((StatusCode::CREATED, Json(QuestionResponse::try_from(question)?)))
}

#[axum::debug_handler]
pub async fn get_question(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let question_id = parse_id(&id, "question id")?;
    let question = state.quiz_service.get_question(question_id).await?;
    Ok(Json(QuestionResponse::try_from(question)?))
}

#[axum::debug_handler]
pub async fn update_question(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateQuestionPayload>,
) -> Result<impl IntoResponse> {
    let question_id = parse_id(&id, "question id")?;
    payload.validate()?;
    let question = state
        .quiz_service
        .update_question(question_id, payload.try_into()?)
        .await?;
    Ok(Json(QuestionResponse::try_from(question)?))
}

#[axum::debug_handler]
pub async fn delete_question(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let question_id = parse_id(&id, "question id")?;
    state.quiz_service.delete_question(question_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
pub async fn question_tags(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let question_id = parse_id(&id, "question id")?;
    let tags = state.quiz_service.question_tags(question_id).await?;
    Ok(Json(
        tags.into_iter().map(TagResponse::from).collect::<Vec<_>>(),
    ))
}

#[axum::debug_handler]
pub async fn wrong_questions(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let questions = state.quiz_service.wrong_questions().await?;
    Ok(Json(question_responses(questions)?))
}

#[axum::debug_handler]
pub async fn list_tags(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let tags = state.quiz_service.list_tags().await?;
    Ok(Json(
        tags.into_iter().map(TagResponse::from).collect::<Vec<_>>(),
    ))
}

#[axum::debug_handler]
pub async fn create_tag(
    State(state): State<AppState>,
    Json(payload): Json<CreateTagPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let tag = state.quiz_service.create_tag(payload.name).await?;
    Ok((StatusCode::CREATED, Json(TagResponse::from(tag))))
}
