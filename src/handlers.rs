use crate::auth::{Session, SignUp};
use crate::errors::AppError;
use crate::models::{
    Credentials, DailyStat, DailyStatForm, GoalForm, GoalView, ProgressForm, SessionResponse,
    TodayStatsResponse, Workout, WorkoutForm,
};
use crate::progress::{Metric, ProgressReport};
use crate::state::AppState;
use crate::ui::{render_app, render_sign_in};
use crate::{daily_stats, goals, progress, workouts};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Html,
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    match state.session.current() {
        Some(session) => Html(render_app(&session.user)),
        None => Html(render_sign_in()),
    }
}

pub async fn get_session(State(state): State<AppState>) -> Json<SessionResponse> {
    Json(session_response(state.session.current().as_ref(), None))
}

pub async fn sign_in(
    State(state): State<AppState>,
    Json(payload): Json<Credentials>,
) -> Result<Json<SessionResponse>, AppError> {
    let (email, password) = credentials(&payload)?;
    let session = state.auth.sign_in_with_password(email, password).await?;
    state.session.sign_in(session.clone()).await?;
    info!(user_id = %session.user.id, "signed in");
    Ok(Json(session_response(Some(&session), None)))
}

pub async fn sign_up(
    State(state): State<AppState>,
    Json(payload): Json<Credentials>,
) -> Result<Json<SessionResponse>, AppError> {
    let (email, password) = credentials(&payload)?;
    match state.auth.sign_up(email, password).await? {
        SignUp::SignedIn(session) => {
            state.session.sign_in(session.clone()).await?;
            info!(user_id = %session.user.id, "signed up");
            Ok(Json(session_response(Some(&session), None)))
        }
        SignUp::ConfirmationRequired => Ok(Json(session_response(
            None,
            Some("Check your email to confirm your account, then sign in.".to_string()),
        ))),
    }
}

pub async fn sign_out(State(state): State<AppState>) -> Result<Json<SessionResponse>, AppError> {
    state.session.sign_out(&state.auth).await?;
    info!("signed out");
    Ok(Json(session_response(None, None)))
}

pub async fn list_workouts(State(state): State<AppState>) -> Result<Json<Vec<Workout>>, AppError> {
    let session = state.require_session().await?;
    Ok(Json(workouts::list_recent(&state.rest, &session).await?))
}

pub async fn create_workout(
    State(state): State<AppState>,
    Json(payload): Json<WorkoutForm>,
) -> Result<(StatusCode, Json<Workout>), AppError> {
    let session = state.require_session().await?;
    let row = workouts::validate(payload, session.user.id, today())?;
    let workout = workouts::create(&state.rest, &session, &row).await?;
    info!(workout_id = %workout.id, date = %workout.date, "workout logged");
    Ok((StatusCode::CREATED, Json(workout)))
}

pub async fn delete_workout(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let session = state.require_session().await?;
    workouts::delete(&state.rest, &session, id).await?;
    info!(workout_id = %id, "workout deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_today_stats(State(state): State<AppState>) -> Result<Json<TodayStatsResponse>, AppError> {
    let session = state.require_session().await?;
    let date = today();
    let stats = daily_stats::fetch_for(&state.rest, &session, date).await?;
    Ok(Json(TodayStatsResponse { date, stats }))
}

pub async fn put_today_stats(
    State(state): State<AppState>,
    Json(payload): Json<DailyStatForm>,
) -> Result<Json<DailyStat>, AppError> {
    let session = state.require_session().await?;
    daily_stats::validate(&payload)?;
    let stat = daily_stats::upsert(&state.rest, &session, today(), &payload, Utc::now()).await?;
    Ok(Json(stat))
}

pub async fn list_goals(State(state): State<AppState>) -> Result<Json<Vec<GoalView>>, AppError> {
    let session = state.require_session().await?;
    let active = goals::list_active(&state.rest, &session).await?;
    Ok(Json(active.into_iter().map(goals::to_view).collect()))
}

pub async fn create_goal(
    State(state): State<AppState>,
    Json(payload): Json<GoalForm>,
) -> Result<(StatusCode, Json<GoalView>), AppError> {
    let session = state.require_session().await?;
    goals::validate(&payload)?;
    let goal = goals::create(&state.rest, &session, &payload).await?;
    info!(goal_id = %goal.id, "goal created");
    Ok((StatusCode::CREATED, Json(goals::to_view(goal))))
}

pub async fn edit_goal(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<GoalForm>,
) -> Result<Json<GoalView>, AppError> {
    let session = state.require_session().await?;
    goals::validate(&payload)?;
    let goal = goals::edit(&state.rest, &session, id, &payload, Utc::now()).await?;
    Ok(Json(goals::to_view(goal)))
}

pub async fn update_goal_progress(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ProgressForm>,
) -> Result<Json<GoalView>, AppError> {
    if payload.current_value < 0 {
        return Err(AppError::bad_request("progress cannot be negative"));
    }
    let session = state.require_session().await?;
    let goal = goals::update_progress(&state.rest, &session, id, payload.current_value, Utc::now()).await?;
    Ok(Json(goals::to_view(goal)))
}

pub async fn archive_goal(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<GoalView>, AppError> {
    let session = state.require_session().await?;
    let goal = goals::archive(&state.rest, &session, id, Utc::now()).await?;
    info!(goal_id = %id, "goal archived");
    Ok(Json(goals::to_view(goal)))
}

pub async fn delete_goal(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let session = state.require_session().await?;
    goals::delete(&state.rest, &session, id).await?;
    info!(goal_id = %id, "goal deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct ProgressQuery {
    #[serde(default)]
    pub metric: Metric,
}

pub async fn get_progress(
    State(state): State<AppState>,
    Query(query): Query<ProgressQuery>,
) -> Result<Json<ProgressReport>, AppError> {
    let session = state.require_session().await?;
    let days = progress::fetch_window(&state.rest, &session, today()).await?;
    Ok(Json(progress::build_report(days, query.metric)))
}

fn credentials(payload: &Credentials) -> Result<(&str, &str), AppError> {
    let email = payload.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::bad_request("a valid email is required"));
    }
    if payload.password.is_empty() {
        return Err(AppError::bad_request("password is required"));
    }
    Ok((email, &payload.password))
}

fn session_response(session: Option<&Session>, notice: Option<String>) -> SessionResponse {
    SessionResponse {
        signed_in: session.is_some(),
        user_id: session.map(|s| s.user.id),
        email: session.and_then(|s| s.user.email.clone()),
        notice,
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}
