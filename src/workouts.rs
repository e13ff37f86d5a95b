use crate::auth::Session;
use crate::client::{BackendError, RestClient};
use crate::errors::AppError;
use crate::models::{NewWorkoutRow, Workout, WorkoutForm};
use chrono::NaiveDate;
use uuid::Uuid;

pub const TABLE: &str = "workouts";
pub const RECENT_LIMIT: usize = 10;

/// The most recent workouts, newest date first.
pub async fn list_recent(rest: &RestClient, session: &Session) -> Result<Vec<Workout>, BackendError> {
    rest.table(TABLE, &session.access_token)
        .select("*")
        .order("date", false)
        .order("created_at", false)
        .limit(RECENT_LIMIT)
        .fetch()
        .await
}

pub fn validate(form: WorkoutForm, user_id: Uuid, today: NaiveDate) -> Result<NewWorkoutRow, AppError> {
    let name = form.name.trim();
    if name.is_empty() {
        return Err(AppError::bad_request("workout name is required"));
    }
    if form.duration_minutes <= 0 {
        return Err(AppError::bad_request("duration must be at least one minute"));
    }
    if form.calories_burned < 0 {
        return Err(AppError::bad_request("calories burned cannot be negative"));
    }

    Ok(NewWorkoutRow {
        user_id,
        name: name.to_string(),
        duration_minutes: form.duration_minutes,
        calories_burned: form.calories_burned,
        notes: form.notes.trim().to_string(),
        date: form.date.unwrap_or(today),
    })
}

pub async fn create(rest: &RestClient, session: &Session, row: &NewWorkoutRow) -> Result<Workout, BackendError> {
    rest.table(TABLE, &session.access_token).insert(row).await
}

pub async fn delete(rest: &RestClient, session: &Session, id: Uuid) -> Result<(), BackendError> {
    rest.table(TABLE, &session.access_token).delete_by_id(id).await
}
