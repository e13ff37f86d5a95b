use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Workout {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub duration_minutes: i64,
    pub calories_burned: i64,
    #[serde(default)]
    pub notes: Option<String>,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewWorkoutRow {
    pub user_id: Uuid,
    pub name: String,
    pub duration_minutes: i64,
    pub calories_burned: i64,
    pub notes: String,
    pub date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct WorkoutForm {
    pub name: String,
    pub duration_minutes: i64,
    pub calories_burned: i64,
    #[serde(default)]
    pub notes: String,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyStat {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub steps: i64,
    pub calories_burned: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DailyStatRow {
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub steps: i64,
    pub calories_burned: i64,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct DailyStatForm {
    pub steps: i64,
    pub calories_burned: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TodayStatsResponse {
    pub date: NaiveDate,
    pub stats: Option<DailyStat>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalType {
    Steps,
    Calories,
    Workouts,
}

impl GoalType {
    pub fn label(self) -> &'static str {
        match self {
            Self::Steps => "Steps",
            Self::Calories => "Calories",
            Self::Workouts => "Workouts",
        }
    }
}

/// Renewal period of a goal. Informational; nothing resets progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    Daily,
    Weekly,
    Monthly,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Goal {
    pub id: Uuid,
    pub user_id: Uuid,
    pub goal_type: GoalType,
    pub target_value: i64,
    pub current_value: i64,
    pub timeframe: Timeframe,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewGoalRow {
    pub user_id: Uuid,
    pub goal_type: GoalType,
    pub target_value: i64,
    pub current_value: i64,
    pub timeframe: Timeframe,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct GoalChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal_type: Option<GoalType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_value: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_value: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeframe: Option<Timeframe>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    pub updated_at: DateTime<Utc>,
}

impl GoalChanges {
    pub fn at(updated_at: DateTime<Utc>) -> Self {
        Self {
            goal_type: None,
            target_value: None,
            current_value: None,
            timeframe: None,
            is_active: None,
            updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GoalForm {
    pub goal_type: GoalType,
    pub target_value: i64,
    pub timeframe: Timeframe,
}

#[derive(Debug, Deserialize)]
pub struct ProgressForm {
    pub current_value: i64,
}

/// A goal as the Goals view shows it.
#[derive(Debug, Serialize, Deserialize)]
pub struct GoalView {
    #[serde(flatten)]
    pub goal: Goal,
    pub label: String,
    pub percentage: i64,
}

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub signed_in: bool,
    pub user_id: Option<Uuid>,
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}
