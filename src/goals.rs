use crate::auth::Session;
use crate::client::{BackendError, RestClient};
use crate::errors::AppError;
use crate::models::{Goal, GoalChanges, GoalForm, GoalView, NewGoalRow};
use crate::progress::round_half_up;
use chrono::{DateTime, Utc};
use uuid::Uuid;

pub const TABLE: &str = "goals";

/// Share of the target reached, as a whole percentage in `0..=100`.
pub fn progress_percentage(current: i64, target: i64) -> i64 {
    if target <= 0 {
        return 0;
    }
    let percent = round_half_up(current as f64 / target as f64 * 100.0);
    percent.clamp(0, 100)
}

pub fn to_view(goal: Goal) -> GoalView {
    GoalView {
        label: goal.goal_type.label().to_string(),
        percentage: progress_percentage(goal.current_value, goal.target_value),
        goal,
    }
}

pub fn validate(form: &GoalForm) -> Result<(), AppError> {
    if form.target_value <= 0 {
        return Err(AppError::bad_request("target must be greater than zero"));
    }
    Ok(())
}

/// Active goals, newest first.
pub async fn list_active(rest: &RestClient, session: &Session) -> Result<Vec<Goal>, BackendError> {
    rest.table(TABLE, &session.access_token)
        .select("*")
        .eq("is_active", true)
        .order("created_at", false)
        .fetch()
        .await
}

pub async fn create(rest: &RestClient, session: &Session, form: &GoalForm) -> Result<Goal, BackendError> {
    let row = NewGoalRow {
        user_id: session.user.id,
        goal_type: form.goal_type,
        target_value: form.target_value,
        current_value: 0,
        timeframe: form.timeframe,
        is_active: true,
    };
    rest.table(TABLE, &session.access_token).insert(&row).await
}

/// Changes type, target and timeframe. Recorded progress is kept.
pub async fn edit(
    rest: &RestClient,
    session: &Session,
    id: Uuid,
    form: &GoalForm,
    now: DateTime<Utc>,
) -> Result<Goal, BackendError> {
    let changes = GoalChanges {
        goal_type: Some(form.goal_type),
        target_value: Some(form.target_value),
        timeframe: Some(form.timeframe),
        ..GoalChanges::at(now)
    };
    rest.table(TABLE, &session.access_token).update_by_id(id, &changes).await
}

pub async fn update_progress(
    rest: &RestClient,
    session: &Session,
    id: Uuid,
    current_value: i64,
    now: DateTime<Utc>,
) -> Result<Goal, BackendError> {
    let changes = GoalChanges {
        current_value: Some(current_value),
        ..GoalChanges::at(now)
    };
    rest.table(TABLE, &session.access_token).update_by_id(id, &changes).await
}

/// Soft delete: the goal stays in the table but leaves the active list.
pub async fn archive(rest: &RestClient, session: &Session, id: Uuid, now: DateTime<Utc>) -> Result<Goal, BackendError> {
    let changes = GoalChanges {
        is_active: Some(false),
        ..GoalChanges::at(now)
    };
    rest.table(TABLE, &session.access_token).update_by_id(id, &changes).await
}

pub async fn delete(rest: &RestClient, session: &Session, id: Uuid) -> Result<(), BackendError> {
    rest.table(TABLE, &session.access_token).delete_by_id(id).await
}
