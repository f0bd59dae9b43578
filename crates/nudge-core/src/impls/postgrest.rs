//! PostgrestTaskStore - Supabase tables read over the PostgREST HTTP API.
//!
//! # Tables
//! - `todos`: `user_id, content, due_date, planned_date, is_completed, is_deleted`
//! - `push_subscriptions`: `user_id, subscription` (browser JSON)
//!
//! `TaskFilter` is rendered into PostgREST operators (`col=eq.v`,
//! `or=(a.eq.x,b.eq.y)`); values are quoted where the grammar needs it.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::Config;
use crate::domain::{OwnerId, StoreError, Subscription, Task, TaskFilter, Value};
use crate::ports::TaskStore;

const TASKS_TABLE: &str = "todos";
const SUBSCRIPTIONS_TABLE: &str = "push_subscriptions";
const SUBSCRIPTION_COLUMNS: &str = "user_id,subscription";

pub struct PostgrestTaskStore {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl PostgrestTaskStore {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, StoreError> {
        Self::new(&config.store_url, &config.store_key, config.http_timeout)
    }

    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        params: Vec<(String, String)>,
    ) -> Result<Vec<T>, StoreError> {
        let url = format!("{}/rest/v1/{}", self.base_url, table);
        debug!(table, ?params, "querying store");

        let response = self
            .client
            .get(&url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(StoreError::Status {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| StoreError::Decode(format!("{table}: {e}")))
    }
}

#[async_trait]
impl TaskStore for PostgrestTaskStore {
    async fn query_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, StoreError> {
        let mut params = vec![("select".to_string(), "*".to_string())];
        params.extend(filter_params(filter));
        self.select(TASKS_TABLE, params).await
    }

    async fn query_subscription(
        &self,
        owner_id: &OwnerId,
    ) -> Result<Option<Subscription>, StoreError> {
        let params = vec![
            ("select".to_string(), SUBSCRIPTION_COLUMNS.to_string()),
            ("user_id".to_string(), format!("eq.{}", owner_id.as_str())),
            // several rows for one user: always take the same one
            ("order".to_string(), "subscription->>endpoint.asc".to_string()),
            ("limit".to_string(), "1".to_string()),
        ];
        let rows: Vec<Subscription> = self.select(SUBSCRIPTIONS_TABLE, params).await?;
        Ok(rows.into_iter().next())
    }

    async fn query_all_subscriptions(&self) -> Result<Vec<Subscription>, StoreError> {
        let params = vec![
            ("select".to_string(), SUBSCRIPTION_COLUMNS.to_string()),
            ("order".to_string(), "user_id.asc".to_string()),
        ];
        self.select(SUBSCRIPTIONS_TABLE, params).await
    }
}

/// Renders a filter as PostgREST query parameters.
///
/// Top-level `Eq` terms become `column=eq.value`. A single logic term becomes
/// `or=(...)`; several are wrapped in one `and=(...)`.
pub fn filter_params(filter: &TaskFilter) -> Vec<(String, String)> {
    let mut params = Vec::new();
    let mut logic = Vec::new();
    collect_top_level(filter, &mut params, &mut logic);

    match logic.as_slice() {
        [] => {}
        [TaskFilter::Or(children)] => {
            params.push(("or".to_string(), format!("({})", render_list(children))));
        }
        terms => {
            let rendered: Vec<String> = terms.iter().map(|t| render_condition(t)).collect();
            params.push(("and".to_string(), format!("({})", rendered.join(","))));
        }
    }
    params
}

fn collect_top_level<'a>(
    filter: &'a TaskFilter,
    params: &mut Vec<(String, String)>,
    logic: &mut Vec<&'a TaskFilter>,
) {
    match filter {
        TaskFilter::Eq(field, value) => {
            params.push((field.column().to_string(), format!("eq.{}", raw_value(value))));
        }
        TaskFilter::And(children) => {
            for child in children {
                collect_top_level(child, params, logic);
            }
        }
        TaskFilter::Or(_) => logic.push(filter),
    }
}

fn render_condition(filter: &TaskFilter) -> String {
    match filter {
        TaskFilter::Eq(field, value) => {
            format!("{}.eq.{}", field.column(), quoted_value(value))
        }
        TaskFilter::And(children) => format!("and({})", render_list(children)),
        TaskFilter::Or(children) => format!("or({})", render_list(children)),
    }
}

fn render_list(children: &[TaskFilter]) -> String {
    children
        .iter()
        .map(render_condition)
        .collect::<Vec<_>>()
        .join(",")
}

fn raw_value(value: &Value) -> String {
    match value {
        Value::Text(s) => s.clone(),
        Value::Date(d) => d.format("%Y-%m-%d").to_string(),
        Value::Bool(b) => b.to_string(),
    }
}

/// Inside `or(...)`/`and(...)` reserved characters must be double-quoted.
fn quoted_value(value: &Value) -> String {
    let raw = raw_value(value);
    if raw.chars().any(|c| matches!(c, ',' | '.' | ':' | '(' | ')' | '"' | '\\' | ' ')) {
        let escaped = raw.replace('\\', "\\\\").replace('"', "\\\"");
        format!("\"{escaped}\"")
    } else {
        raw
    }
}
