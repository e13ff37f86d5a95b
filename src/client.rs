//! Query client for the backend's REST data API.
//!
//! Every call carries the project key and the caller's access token; the
//! backend's row-level security decides which rows the caller may see.

use crate::config::Config;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{Serialize, de::DeserializeOwned};
use std::fmt::Display;
use std::time::Duration;
use url::Url;
use uuid::Uuid;

const REST_PATH: &str = "rest/v1/";
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("backend request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("backend returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("no {table} row with id {id}")]
    NotFound { table: &'static str, id: Uuid },

    #[error("expected at most one {table} row, got {count}")]
    MultipleRows { table: &'static str, count: usize },

    #[error("insert into {table} returned no row")]
    NothingInserted { table: &'static str },

    #[error("invalid backend url: {0}")]
    Url(#[from] url::ParseError),
}

/// Shared handle to the data API. Cheap to clone.
#[derive(Debug, Clone)]
pub struct RestClient {
    http: Client,
    base_url: Url,
    anon_key: String,
}

impl RestClient {
    pub fn new(config: &Config) -> Result<Self, BackendError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Self::with_http(http, &config.backend_url, &config.anon_key)
    }

    pub fn with_http(http: Client, backend_url: &Url, anon_key: &str) -> Result<Self, BackendError> {
        Ok(Self {
            http,
            base_url: join_dir(backend_url, REST_PATH)?,
            anon_key: anon_key.to_string(),
        })
    }

    /// Opens a table on behalf of the holder of `access_token`.
    pub fn table<'a>(&'a self, name: &'static str, access_token: &'a str) -> Table<'a> {
        Table {
            client: self,
            name,
            access_token,
        }
    }
}

pub struct Table<'a> {
    client: &'a RestClient,
    name: &'static str,
    access_token: &'a str,
}

impl<'a> Table<'a> {
    pub fn select(&self, columns: &str) -> Select<'a> {
        Select {
            table: Table {
                client: self.client,
                name: self.name,
                access_token: self.access_token,
            },
            columns: columns.to_string(),
            filters: Vec::new(),
            order: Vec::new(),
            limit: None,
        }
    }

    pub async fn insert<B, T>(&self, row: &B) -> Result<T, BackendError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .request(Method::POST, &[])?
            .header("Prefer", "return=representation")
            .json(&[row])
            .send()
            .await?;
        let mut rows: Vec<T> = decode(response).await?;
        if rows.is_empty() {
            return Err(BackendError::NothingInserted { table: self.name });
        }
        Ok(rows.remove(0))
    }

    pub async fn update_by_id<B, T>(&self, id: Uuid, changes: &B) -> Result<T, BackendError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .request(Method::PATCH, &[("id".to_string(), format!("eq.{id}"))])?
            .header("Prefer", "return=representation")
            .json(changes)
            .send()
            .await?;
        let mut rows: Vec<T> = decode(response).await?;
        if rows.is_empty() {
            return Err(BackendError::NotFound {
                table: self.name,
                id,
            });
        }
        Ok(rows.remove(0))
    }

    pub async fn delete_by_id(&self, id: Uuid) -> Result<(), BackendError> {
        let response = self
            .request(
                Method::DELETE,
                &[
                    ("id".to_string(), format!("eq.{id}")),
                    ("select".to_string(), "id".to_string()),
                ],
            )?
            .header("Prefer", "return=representation")
            .send()
            .await?;
        let rows: Vec<serde_json::Value> = decode(response).await?;
        if rows.is_empty() {
            return Err(BackendError::NotFound {
                table: self.name,
                id,
            });
        }
        Ok(())
    }

    fn request(&self, method: Method, query: &[(String, String)]) -> Result<RequestBuilder, BackendError> {
        let mut url = self.client.base_url.join(self.name)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(self
            .client
            .http
            .request(method, url)
            .header("apikey", &self.client.anon_key)
            .bearer_auth(self.access_token))
    }
}

/// A pending `select`, built up with filters before it is sent.
pub struct Select<'a> {
    table: Table<'a>,
    columns: String,
    filters: Vec<(String, String)>,
    order: Vec<String>,
    limit: Option<usize>,
}

impl Select<'_> {
    pub fn eq(mut self, column: &str, value: impl Display) -> Self {
        self.filters.push((column.to_string(), format!("eq.{value}")));
        self
    }

    pub fn gte(mut self, column: &str, value: impl Display) -> Self {
        self.filters.push((column.to_string(), format!("gte.{value}")));
        self
    }

    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        let direction = if ascending { "asc" } else { "desc" };
        self.order.push(format!("{column}.{direction}"));
        self
    }

    pub fn limit(mut self, count: usize) -> Self {
        self.limit = Some(count);
        self
    }

    pub async fn fetch<T: DeserializeOwned>(self) -> Result<Vec<T>, BackendError> {
        let query = self.query_pairs();
        let response = self.table.request(Method::GET, &query)?.send().await?;
        decode(response).await
    }

    /// Zero rows is `None`; more than one row is an error.
    pub async fn maybe_single<T: DeserializeOwned>(self) -> Result<Option<T>, BackendError> {
        let table = self.table.name;
        let mut rows: Vec<T> = self.limit(2).fetch().await?;
        match rows.len() {
            0 => Ok(None),
            1 => Ok(Some(rows.remove(0))),
            count => Err(BackendError::MultipleRows { table, count }),
        }
    }

    fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![("select".to_string(), self.columns.clone())];
        pairs.extend(self.filters.iter().cloned());
        if !self.order.is_empty() {
            pairs.push(("order".to_string(), self.order.join(",")));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        pairs
    }
}

/// Joins `dir` under `base`, keeping any path prefix `base` already has.
pub(crate) fn join_dir(base: &Url, dir: &str) -> Result<Url, url::ParseError> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(dir)
}

#[derive(serde::Deserialize)]
struct ApiMessage {
    message: Option<String>,
    msg: Option<String>,
    error_description: Option<String>,
}

pub(crate) async fn error_message(response: Response) -> String {
    let text = response.text().await.unwrap_or_default();
    serde_json::from_str::<ApiMessage>(&text)
        .ok()
        .and_then(|body| body.message.or(body.msg).or(body.error_description))
        .unwrap_or(text)
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
    let status = response.status();
    if !status.is_success() {
        let message = error_message(response).await;
        return Err(BackendError::Api {
            status: status.as_u16(),
            message,
        });
    }
    Ok(response.json().await?)
}
