use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post, put},
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/export", get(handlers::export))
        .route("/meds/:slot/toggle", post(handlers::toggle_meds_form))
        .route("/api/today", get(handlers::get_today))
        .route("/api/history", get(handlers::get_history))
        .route("/api/meds/:slot/toggle", post(handlers::toggle_meds))
        .route("/api/glucose", post(handlers::add_glucose))
        .route("/api/notes", put(handlers::save_notes))
        .route("/api/schedule", put(handlers::save_schedule))
        .route("/api/reminders/:slot/toggle", post(handlers::toggle_reminder))
        .with_state(state)
}
