use axum::{
    extract::State,
    response::{IntoResponse, Json},
};

use crate::{dto::statistics_dto::StatisticsResponse, error::Result, AppState};

#[axum::debug_handler]
pub async fn get_statistics(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let stats = state.statistics_service.get_statistics().await?;
    Ok(Json(StatisticsResponse::from(stats)))
}
