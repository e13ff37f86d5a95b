use crate::auth::Session;
use crate::client::{BackendError, RestClient};
use crate::errors::AppError;
use crate::models::{DailyStat, DailyStatForm, DailyStatRow};
use chrono::{DateTime, NaiveDate, Utc};

pub const TABLE: &str = "daily_stats";

/// The caller's row for `date`, if one exists.
pub async fn fetch_for(rest: &RestClient, session: &Session, date: NaiveDate) -> Result<Option<DailyStat>, BackendError> {
    rest.table(TABLE, &session.access_token)
        .select("*")
        .eq("user_id", session.user.id)
        .eq("date", date)
        .maybe_single()
        .await
}

pub fn validate(form: &DailyStatForm) -> Result<(), AppError> {
    if form.steps < 0 {
        return Err(AppError::bad_request("steps cannot be negative"));
    }
    if form.calories_burned < 0 {
        return Err(AppError::bad_request("calories burned cannot be negative"));
    }
    Ok(())
}

/// Writes the totals for `date`: updates the existing row, or inserts one.
pub async fn upsert(
    rest: &RestClient,
    session: &Session,
    date: NaiveDate,
    form: &DailyStatForm,
    now: DateTime<Utc>,
) -> Result<DailyStat, BackendError> {
    let row = DailyStatRow {
        user_id: session.user.id,
        date,
        steps: form.steps,
        calories_burned: form.calories_burned,
        updated_at: now,
    };

    let table = rest.table(TABLE, &session.access_token);
    match fetch_for(rest, session, date).await? {
        Some(existing) => table.update_by_id(existing.id, &row).await,
        None => table.insert(&row).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::User;
    use mockito::Matcher;
    use reqwest::Client;
    use url::Url;
    use uuid::Uuid;

    const EXISTING: &str = r#"[{
        "id": "6f1c1a2e-8f0e-4a47-9c3e-3a3c2b0f9d11",
        "user_id": "00000000-0000-0000-0000-000000000000",
        "date": "2024-01-01",
        "steps": 4000,
        "calories_burned": 150,
        "created_at": "2024-01-01T07:00:00Z",
        "updated_at": "2024-01-01T07:00:00Z"
    }]"#;

    const UPDATED: &str = r#"[{
        "id": "6f1c1a2e-8f0e-4a47-9c3e-3a3c2b0f9d11",
        "user_id": "00000000-0000-0000-0000-000000000000",
        "date": "2024-01-01",
        "steps": 9000,
        "calories_burned": 400,
        "created_at": "2024-01-01T07:00:00Z",
        "updated_at": "2024-01-01T20:00:00Z"
    }]"#;

    fn session() -> Session {
        Session {
            access_token: "token".into(),
            refresh_token: "refresh".into(),
            expires_at: Utc::now() + chrono::Duration::hours(1),
            user: User {
                id: Uuid::nil(),
                email: None,
            },
        }
    }

    #[tokio::test]
    async fn existing_row_is_updated_not_duplicated() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/rest/v1/daily_stats")
            .match_query(Matcher::UrlEncoded("date".into(), "eq.2024-01-01".into()))
            .with_body(EXISTING)
            .create_async()
            .await;
        let patch = server
            .mock("PATCH", "/rest/v1/daily_stats")
            .match_query(Matcher::UrlEncoded(
                "id".into(),
                "eq.6f1c1a2e-8f0e-4a47-9c3e-3a3c2b0f9d11".into(),
            ))
            .match_body(Matcher::PartialJson(serde_json::json!({ "steps": 9000, "calories_burned": 400 })))
            .with_body(UPDATED)
            .create_async()
            .await;
        let insert = server
            .mock("POST", "/rest/v1/daily_stats")
            .expect(0)
            .create_async()
            .await;

        let rest = RestClient::with_http(Client::new(), &Url::parse(&server.url()).unwrap(), "anon").unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let form = DailyStatForm {
            steps: 9000,
            calories_burned: 400,
        };
        let stat = upsert(&rest, &session(), date, &form, Utc::now()).await.unwrap();

        patch.assert_async().await;
        insert.assert_async().await;
        assert_eq!(stat.steps, 9000);
    }

    #[tokio::test]
    async fn missing_row_is_inserted() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/rest/v1/daily_stats")
            .match_query(Matcher::Any)
            .with_body("[]")
            .create_async()
            .await;
        let insert = server
            .mock("POST", "/rest/v1/daily_stats")
            .match_body(Matcher::Regex(r#""date":"2024-01-01""#.into()))
            .with_status(201)
            .with_body(UPDATED)
            .create_async()
            .await;

        let rest = RestClient::with_http(Client::new(), &Url::parse(&server.url()).unwrap(), "anon").unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let form = DailyStatForm {
            steps: 9000,
            calories_burned: 400,
        };
        upsert(&rest, &session(), date, &form, Utc::now()).await.unwrap();
        insert.assert_async().await;
    }

    #[test]
    fn negative_totals_are_rejected() {
        assert!(validate(&DailyStatForm { steps: -1, calories_burned: 0 }).is_err());
        assert!(validate(&DailyStatForm { steps: 0, calories_burned: -5 }).is_err());
        assert!(validate(&DailyStatForm { steps: 0, calories_burned: 0 }).is_ok());
    }
}
