use crate::errors::SessionExpired;
use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, post, put},
    Router,
};
use tracing::{info, warn};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/session", get(handlers::get_session))
        .route("/api/auth/sign-in", post(handlers::sign_in))
        .route("/api/auth/sign-up", post(handlers::sign_up))
        .route("/api/auth/sign-out", post(handlers::sign_out))
        .route("/api/workouts", get(handlers::list_workouts).post(handlers::create_workout))
        .route("/api/workouts/:id", delete(handlers::delete_workout))
        .route(
            "/api/daily-stats/today",
            get(handlers::get_today_stats).put(handlers::put_today_stats),
        )
        .route("/api/goals", get(handlers::list_goals).post(handlers::create_goal))
        .route(
            "/api/goals/:id",
            put(handlers::edit_goal).delete(handlers::delete_goal),
        )
        .route("/api/goals/:id/progress", put(handlers::update_goal_progress))
        .route("/api/goals/:id/archive", post(handlers::archive_goal))
        .route("/api/progress", get(handlers::get_progress))
        .layer(middleware::from_fn_with_state(state.clone(), expire_refused_session))
        .with_state(state)
}

/// Drops the session once the backend has refused its access token, so the
/// next page load shows the sign-in form instead of failing again.
async fn expire_refused_session(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let response = next.run(request).await;
    if response.extensions().get::<SessionExpired>().is_some() {
        match state.session.expire().await {
            Ok(()) => info!("session expired by backend"),
            Err(err) => warn!("failed to clear expired session: {err}"),
        }
    }
    response
}
