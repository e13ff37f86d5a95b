//! In-process stand-in for the hosted backend: the auth endpoints and the
//! slice of the REST data API the tracker uses, kept in memory.

use axum::{
    extract::{Path, Query, RawQuery, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{any, post},
    Json, Router,
};
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Map, Value};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const USER_ID: &str = "7d4c2a6e-1111-4222-8333-944455556666";
pub const EMAIL: &str = "runner@example.com";
pub const PASSWORD: &str = "correct-horse";

type Tables = Arc<Mutex<HashMap<String, Vec<Value>>>>;

pub struct FakeBackend {
    pub url: String,
}

/// Serves the fake on its own thread so it outlives any single test runtime.
pub fn start() -> FakeBackend {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind fake backend");
    listener.set_nonblocking(true).expect("nonblocking listener");
    let url = format!("http://{}", listener.local_addr().unwrap());

    std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("fake backend runtime");
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(listener).unwrap();
            axum::serve(listener, router()).await.unwrap();
        });
    });

    FakeBackend { url }
}

fn router() -> Router {
    let tables: Tables = Arc::new(Mutex::new(HashMap::new()));
    Router::new()
        .route("/auth/v1/token", post(token))
        .route("/auth/v1/signup", post(signup))
        .route("/auth/v1/logout", post(|| async { StatusCode::NO_CONTENT }))
        .route("/rest/v1/:table", any(table))
        .with_state(tables)
}

fn session_body() -> Value {
    json!({
        "access_token": format!("access-{}", Utc::now().timestamp_micros()),
        "refresh_token": "refresh",
        "expires_in": 3600,
        "token_type": "bearer",
        "user": { "id": USER_ID, "email": EMAIL }
    })
}

async fn token(Query(params): Query<HashMap<String, String>>, Json(body): Json<Value>) -> Response {
    match params.get("grant_type").map(String::as_str) {
        Some("password") if body["email"] == EMAIL && body["password"] == PASSWORD => {
            Json(session_body()).into_response()
        }
        Some("refresh_token") => Json(session_body()).into_response(),
        _ => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "invalid_grant", "error_description": "Invalid login credentials" })),
        )
            .into_response(),
    }
}

async fn signup(Json(body): Json<Value>) -> Json<Value> {
    Json(json!({ "id": USER_ID, "email": body["email"] }))
}

fn cell(row: &Value, column: &str) -> String {
    match &row[column] {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn matches(row: &Value, filters: &[(String, String)]) -> bool {
    filters.iter().all(|(column, condition)| {
        let actual = cell(row, column);
        if let Some(expected) = condition.strip_prefix("eq.") {
            actual == expected
        } else if let Some(bound) = condition.strip_prefix("gte.") {
            actual.as_str() >= bound
        } else {
            false
        }
    })
}

fn project(row: &Value, select: &str) -> Value {
    if select == "*" {
        return row.clone();
    }
    let mut out = Map::new();
    for column in select.split(',') {
        out.insert(column.to_string(), row[column].clone());
    }
    Value::Object(out)
}

async fn table(
    State(tables): State<Tables>,
    Path(name): Path<String>,
    method: axum::http::Method,
    RawQuery(query): RawQuery,
    body: Option<Json<Value>>,
) -> Response {
    let pairs: Vec<(String, String)> = url::form_urlencoded::parse(query.unwrap_or_default().as_bytes())
        .into_owned()
        .collect();
    let param = |key: &str| pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone());
    let filters: Vec<(String, String)> = pairs
        .iter()
        .filter(|(k, _)| !matches!(k.as_str(), "select" | "order" | "limit"))
        .cloned()
        .collect();
    let select = param("select").unwrap_or_else(|| "*".to_string());
    let now = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);

    let mut tables = tables.lock().unwrap();
    let rows = tables.entry(name).or_default();

    match method.as_str() {
        "GET" => {
            let mut found: Vec<Value> = rows.iter().filter(|row| matches(row, &filters)).cloned().collect();
            if let Some(order) = param("order") {
                let keys: Vec<(String, bool)> = order
                    .split(',')
                    .map(|key| {
                        let (column, direction) = key.split_once('.').unwrap_or((key, "asc"));
                        (column.to_string(), direction == "desc")
                    })
                    .collect();
                found.sort_by(|a, b| {
                    keys.iter()
                        .map(|(column, desc)| {
                            let ord = cell(a, column).cmp(&cell(b, column));
                            if *desc { ord.reverse() } else { ord }
                        })
                        .find(|ord| *ord != Ordering::Equal)
                        .unwrap_or(Ordering::Equal)
                });
            }
            if let Some(limit) = param("limit").and_then(|l| l.parse::<usize>().ok()) {
                found.truncate(limit);
            }
            Json(Value::Array(found.iter().map(|row| project(row, &select)).collect())).into_response()
        }
        "POST" => {
            let Some(Json(Value::Array(new_rows))) = body else {
                return (StatusCode::BAD_REQUEST, "expected an array of rows").into_response();
            };
            let mut created = Vec::new();
            for mut row in new_rows {
                let object = row.as_object_mut().unwrap();
                object.insert("id".into(), json!(uuid::Uuid::new_v4()));
                object.entry("created_at").or_insert_with(|| json!(now));
                object.entry("updated_at").or_insert_with(|| json!(now));
                rows.push(row.clone());
                created.push(row);
            }
            (StatusCode::CREATED, Json(Value::Array(created))).into_response()
        }
        "PATCH" => {
            let Some(Json(Value::Object(changes))) = body else {
                return (StatusCode::BAD_REQUEST, "expected an object").into_response();
            };
            let mut updated = Vec::new();
            for row in rows.iter_mut().filter(|row| matches(row, &filters)) {
                let object = row.as_object_mut().unwrap();
                for (key, value) in &changes {
                    object.insert(key.clone(), value.clone());
                }
                updated.push(row.clone());
            }
            Json(Value::Array(updated)).into_response()
        }
        "DELETE" => {
            let (removed, kept): (Vec<Value>, Vec<Value>) =
                rows.drain(..).partition(|row| matches(row, &filters));
            *rows = kept;
            Json(Value::Array(removed.iter().map(|row| project(row, &select)).collect())).into_response()
        }
        _ => StatusCode::METHOD_NOT_ALLOWED.into_response(),
    }
}
