pub mod attempt;
pub mod health;
pub mod quiz;
pub mod statistics;

use axum::{
    routing::get,
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .route(
            "/api/quizzes",
            get(quiz::list_quizzes).post(quiz::create_quiz),
        )
        .route(
            "/api/quizzes/:id",
            get(quiz::get_quiz)
                .patch(quiz::update_quiz)
                .delete(quiz::delete_quiz),
        )
        .route(
            "/api/questions",
            get(quiz::list_questions).post(quiz::create_question),
        )
        .route("/api/questions/wrong", get(quiz::wrong_questions))
        .route(
            "/api/questions/:id",
            get(quiz::get_question)
                .patch(quiz::update_question)
                .delete(quiz::delete_question),
        )
        .route("/api/questions/:id/tags", get(quiz::question_tags))
        .route("/api/tags", get(quiz::list_tags).post(quiz::create_tag))
        .route(
            "/api/attempts",
            get(attempt::list_attempts).post(attempt::submit_attempt),
        )
        .route("/api/attempts/:id/answers", get(attempt::list_answers))
        .route("/api/statistics", get(statistics::get_statistics));

    Router::new()
        .route("/health", get(health::health))
        .merge(api)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
