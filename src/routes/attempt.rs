use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};

use crate::{
    dto::attempt_dto::{
        AnswerResponse, AttemptListQuery, AttemptResponse, AttemptResultResponse,
        SubmitAttemptPayload,
    },
    error::Result,
    utils::ids::{parse_id, parse_optional_id},
    AppState,
};

#[axum::debug_handler]
pub async fn submit_attempt(
    State(state): State<AppState>,
    Json(payload): Json<SubmitAttemptPayload>,
) -> Result<impl IntoResponse> {
    let result = state
        .attempt_service
        .submit_attempt(payload.try_into()?)
        .await?;
    Ok((StatusCode::CREATED, Json(AttemptResultResponse::from(result))))
}

#[axum::debug_handler]
pub async fn list_attempts(
    State(state): State<AppState>,
    Query(query): Query<AttemptListQuery>,
) -> Result<impl IntoResponse> {
    let quiz_id = parse_optional_id(query.quiz_id.as_deref(), "quiz_id")?;
    let attempts = state.attempt_service.list_attempts(quiz_id).await?;
    Ok(Json(
        attempts
            .into_iter()
            .map(AttemptResponse::from)
            .collect::<Vec<_>>(),
    ))
}

#[axum::debug_handler]
pub async fn list_answers(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let attempt_id = parse_id(&id, "attempt id")?;
    let answers = state.attempt_service.list_answers(attempt_id).await?;
    Ok(Json(
        answers
            .into_iter()
            .map(AnswerResponse::from)
            .collect::<Vec<_>>(),
    ))
}
