use crate::auth::Session;
use crate::client::{BackendError, RestClient};
use crate::{daily_stats, workouts};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const WINDOW_DAYS: i64 = 7;
const TREND_SPAN: usize = 3;
/// Smallest bar height, in percent of the chart, for a non-zero value.
const MIN_BAR_PERCENT: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    #[default]
    Steps,
    Calories,
    Workouts,
}

impl Metric {
    pub fn label(self) -> &'static str {
        match self {
            Self::Steps => "Steps",
            Self::Calories => "Calories Burned",
            Self::Workouts => "Workouts",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayPoint {
    pub date: NaiveDate,
    pub steps: i64,
    pub calories: i64,
    pub workouts: i64,
}

impl DayPoint {
    pub fn value(&self, metric: Metric) -> i64 {
        match metric {
            Metric::Steps => self.steps,
            Metric::Calories => self.calories,
            Metric::Workouts => self.workouts,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatRow {
    pub date: NaiveDate,
    pub steps: i64,
    pub calories_burned: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkoutDate {
    pub date: NaiveDate,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub label: String,
    pub value: i64,
    pub height_percent: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProgressReport {
    pub metric: Metric,
    pub label: String,
    pub days: Vec<DayPoint>,
    pub bars: Vec<Bar>,
    pub average: i64,
    /// Percent change from the first three days to the last three; absent
    /// when the first three days are all zero.
    pub trend: Option<i64>,
}

/// Rounds like JavaScript's `Math.round`: halves go towards positive infinity.
pub fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

pub fn window_start(today: NaiveDate) -> NaiveDate {
    today - Duration::days(WINDOW_DAYS - 1)
}

/// Merges stat rows and workout dates into one point per day, oldest first,
/// ending on `today`. Days without data are zero.
pub fn build_window_at(today: NaiveDate, stats: &[StatRow], workouts: &[WorkoutDate]) -> Vec<DayPoint> {
    let mut workouts_by_date: HashMap<NaiveDate, i64> = HashMap::new();
    for workout in workouts {
        *workouts_by_date.entry(workout.date).or_default() += 1;
    }

    let mut days = Vec::with_capacity(WINDOW_DAYS as usize);
    for offset in (0..WINDOW_DAYS).rev() {
        let date = today - Duration::days(offset);
        let stat = stats.iter().find(|row| row.date == date);
        days.push(DayPoint {
            date,
            steps: stat.map_or(0, |row| row.steps),
            calories: stat.map_or(0, |row| row.calories_burned),
            workouts: workouts_by_date.get(&date).copied().unwrap_or(0),
        });
    }
    days
}

pub fn average(days: &[DayPoint], metric: Metric) -> i64 {
    if days.is_empty() {
        return 0;
    }
    let sum: i64 = days.iter().map(|day| day.value(metric)).sum();
    round_half_up(sum as f64 / days.len() as f64)
}

pub fn trend(days: &[DayPoint], metric: Metric) -> Option<i64> {
    if days.len() < TREND_SPAN {
        return None;
    }
    let span_average = |span: &[DayPoint]| {
        span.iter().map(|day| day.value(metric)).sum::<i64>() as f64 / TREND_SPAN as f64
    };
    let previous = span_average(&days[..TREND_SPAN]);
    let recent = span_average(&days[days.len() - TREND_SPAN..]);
    if previous == 0.0 {
        return None;
    }
    Some(round_half_up((recent - previous) / previous * 100.0))
}

pub fn bars(days: &[DayPoint], metric: Metric) -> Vec<Bar> {
    let max = days.iter().map(|day| day.value(metric)).max().unwrap_or(0);
    days.iter()
        .map(|day| {
            let value = day.value(metric);
            let height_percent = if max > 0 && value > 0 {
                (value as f64 / max as f64 * 100.0).max(MIN_BAR_PERCENT)
            } else {
                0.0
            };
            Bar {
                date: day.date,
                label: day.date.format("%b %-d").to_string(),
                value,
                height_percent,
            }
        })
        .collect()
}

pub fn build_report(days: Vec<DayPoint>, metric: Metric) -> ProgressReport {
    ProgressReport {
        metric,
        label: metric.label().to_string(),
        bars: bars(&days, metric),
        average: average(&days, metric),
        trend: trend(&days, metric),
        days,
    }
}

/// Loads the stats and workouts of the window ending on `today`.
pub async fn fetch_window(rest: &RestClient, session: &Session, today: NaiveDate) -> Result<Vec<DayPoint>, BackendError> {
    let start = window_start(today);

    let stats: Vec<StatRow> = rest
        .table(daily_stats::TABLE, &session.access_token)
        .select("date,steps,calories_burned")
        .gte("date", start)
        .order("date", true)
        .fetch()
        .await?;

    let workout_dates: Vec<WorkoutDate> = rest
        .table(workouts::TABLE, &session.access_token)
        .select("date")
        .gte("date", start)
        .fetch()
        .await?;

    Ok(build_window_at(today, &stats, &workout_dates))
}
