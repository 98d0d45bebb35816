use std::collections::VecDeque;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;
use tokio::time::Instant;

use crate::api::{ApiClient, ApiError, QueryResult};
use crate::dashboard::{Notification, NotificationSink};
use crate::transform::format::truncate_text;
use crate::transform::queries::{QueryType, classify_query_type};

pub const DEFAULT_DATABASE: &str = "pgpool";
const HISTORY_CAPACITY: usize = 50;
const SOURCE: &str = "console";

#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("Please enter a query")]
    EmptyQuery,
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl ConsoleError {
    pub fn user_message(&self) -> String {
        match self {
            Self::EmptyQuery => self.to_string(),
            Self::Api(error) => error.user_message(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryHistoryEntry {
    pub id: u64,
    pub query: String,
    pub database: String,
    pub query_type: QueryType,
    pub status: QueryStatus,
    pub row_count: u64,
    pub execution_ms: u64,
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// In-memory, newest first.
#[derive(Debug)]
pub struct QueryHistory {
    entries: VecDeque<QueryHistoryEntry>,
    capacity: usize,
    next_id: u64,
}

impl Default for QueryHistory {
    fn default() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }
}

impl QueryHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: capacity.max(1),
            next_id: 1,
        }
    }

    fn record(&mut self, mut entry: QueryHistoryEntry) -> u64 {
        entry.id = self.next_id;
        self.next_id += 1;
        let id = entry.id;
        self.entries.push_front(entry);
        self.entries.truncate(self.capacity);
        id
    }

    pub fn entries(&self) -> impl Iterator<Item = &QueryHistoryEntry> {
        self.entries.iter()
    }

    pub fn get(&self, id: u64) -> Option<&QueryHistoryEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Ad-hoc SQL against `/api/execute_query`. Every attempt past input
/// validation is recorded in the history.
pub struct QueryConsole {
    client: ApiClient,
    notifications: NotificationSink,
    history: QueryHistory,
}

impl QueryConsole {
    pub fn new(client: ApiClient, notifications: NotificationSink) -> Self {
        Self {
            client,
            notifications,
            history: QueryHistory::default(),
        }
    }

    pub fn history(&self) -> &QueryHistory {
        &self.history
    }

    pub async fn execute(&mut self, database: &str, sql: &str) -> Result<QueryResult, ConsoleError> {
        let query = sql.trim();
        if query.is_empty() {
            self.notifications
                .send(Notification::warning(SOURCE, "Please enter a query"));
            return Err(ConsoleError::EmptyQuery);
        }
        let database = match database.trim() {
            "" => DEFAULT_DATABASE,
            database => database,
        };

        let started = Instant::now();
        let outcome = self.client.execute_query(query, database).await;
        let execution_ms = whole_millis(started.elapsed());

        let mut entry = QueryHistoryEntry {
            id: 0,
            query: query.to_string(),
            database: database.to_string(),
            query_type: classify_query_type(query),
            status: QueryStatus::Success,
            row_count: 0,
            execution_ms,
            error: None,
            timestamp: Utc::now(),
        };

        match outcome {
            Ok(result) => {
                entry.row_count = result.row_count.unwrap_or(result.rows.len() as u64);
                let id = self.history.record(entry);
                log::info!(
                    "console_query_executed id={} database={} rows={} execution_ms={}",
                    id,
                    database,
                    result.row_count.unwrap_or_default(),
                    execution_ms
                );
                self.notifications
                    .send(Notification::success(SOURCE, "Query executed successfully"));
                Ok(result)
            }
            Err(error) => {
                let message = error.user_message();
                entry.status = QueryStatus::Error;
                entry.error = Some(message.clone());
                let id = self.history.record(entry);
                log::warn!(
                    "console_query_failed id={} database={} code={} error={}",
                    id,
                    database,
                    error.code(),
                    error
                );

                let text = match error {
                    ApiError::Transport { .. } => format!("Network error: {message}"),
                    _ => format!("Query failed: {message}"),
                };
                self.notifications.send(Notification::error(SOURCE, text));
                Err(error.into())
            }
        }
    }
}

/// Plain-text table of a query result, capped at `max_rows` rows.
pub fn render_result(result: &QueryResult, max_rows: usize) -> String {
    if result.columns.is_empty() {
        return result
            .message
            .clone()
            .unwrap_or_else(|| "Query executed successfully".to_string());
    }

    let mut lines = vec![result.columns.join(" | ")];
    lines.extend(result.rows.iter().take(max_rows).map(|row| match row {
        Value::Array(cells) => cells.iter().map(cell_text).collect::<Vec<_>>().join(" | "),
        Value::Object(fields) => result
            .columns
            .iter()
            .map(|column| fields.get(column).map(cell_text).unwrap_or_default())
            .collect::<Vec<_>>()
            .join(" | "),
        other => cell_text(other),
    }));

    let total = result.row_count.unwrap_or(result.rows.len() as u64);
    if result.rows.len() > max_rows {
        lines.push(format!("... {} more rows", result.rows.len() - max_rows));
    }
    let timing = result
        .execution_time
        .map(|secs| format!(" in {:.3}s", secs))
        .unwrap_or_default();
    lines.push(format!("({total} rows{timing})"));
    lines.join("\n")
}

/// One line per entry, newest first.
pub fn format_history(history: &QueryHistory, limit: usize) -> String {
    if history.is_empty() {
        return "No queries executed yet".to_string();
    }

    history
        .entries()
        .take(limit)
        .map(|entry| {
            let outcome = match (&entry.status, &entry.error) {
                (QueryStatus::Success, _) => format!("{} rows", entry.row_count),
                (QueryStatus::Error, Some(error)) => format!("error: {}", error),
                (QueryStatus::Error, None) => "error".to_string(),
            };
            format!(
                "#{} {} [{}] {} {}ms {} | {}",
                entry.id,
                entry.timestamp.format("%H:%M:%S"),
                entry.database,
                entry.query_type,
                entry.execution_ms,
                outcome,
                truncate_text(&entry.query, 60)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Saturates instead of truncating the `u128` millisecond count.
fn whole_millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::Api;
    use crate::dashboard::NotificationKind;

    fn console(base_url: &str) -> (QueryConsole, tokio::sync::mpsc::UnboundedReceiver<Notification>) {
        let (notifications, rx) = NotificationSink::channel();
        let client = ApiClient::new(&Api {
            base_url: base_url.to_string(),
            request_timeout_secs: 5,
        })
        .expect("client should build");
        (QueryConsole::new(client, notifications), rx)
    }

    #[tokio::test]
    async fn successful_query_is_recorded_newest_first() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/execute_query"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "data": {"columns": ["id", "name"], "rows": [[1, "a"], [2, null]],
                         "row_count": 2, "execution_time": 0.0042}
            })))
            .mount(&server)
            .await;

        let (mut console, mut rx) = console(&server.uri());
        console.execute("", "select 1").await.expect("first query");
        let result = console
            .execute("postgres", "  SHOW pool_nodes ")
            .await
            .expect("second query");

        let entries: Vec<&QueryHistoryEntry> = console.history().entries().collect();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].query, "SHOW pool_nodes");
        assert_eq!(entries[0].query_type, QueryType::Show);
        assert_eq!(entries[0].database, "postgres");
        assert_eq!(entries[1].database, DEFAULT_DATABASE);
        assert_eq!(entries[1].row_count, 2);
        assert_eq!(rx.recv().await.expect("notification").kind, NotificationKind::Success);

        assert_eq!(
            render_result(&result, 10),
            "id | name\n1 | a\n2 | NULL\n(2 rows in 0.004s)"
        );
    }

    #[tokio::test]
    async fn rejected_query_is_recorded_as_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/execute_query"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "status": "error",
                "message": "Only SELECT, SHOW, and EXPLAIN queries are allowed"
            })))
            .mount(&server)
            .await;

        let (mut console, mut rx) = console(&server.uri());
        let error = console
            .execute("postgres", "DELETE FROM users")
            .await
            .expect_err("delete is rejected");
        assert!(matches!(error, ConsoleError::Api(ApiError::Application { .. })));

        let entry = console.history().get(1).expect("entry recorded");
        assert_eq!(entry.status, QueryStatus::Error);
        assert_eq!(entry.query_type, QueryType::Delete);
        let notification = rx.recv().await.expect("notification");
        assert_eq!(
            notification.message,
            "Query failed: Only SELECT, SHOW, and EXPLAIN queries are allowed"
        );

        let listing = format_history(console.history(), 5);
        assert!(listing.starts_with("#1 "));
        assert!(listing.contains("[postgres] DELETE"));
        assert!(listing.ends_with("error: Only SELECT, SHOW, and EXPLAIN queries are allowed | DELETE FROM users"));
    }

    #[tokio::test]
    async fn empty_query_is_not_sent_or_recorded() {
        let (mut console, mut rx) = console("http://127.0.0.1:9");
        let error = console.execute("pgpool", "   ").await.expect_err("empty query");
        assert!(matches!(error, ConsoleError::EmptyQuery));
        assert!(console.history().is_empty());
        assert_eq!(rx.recv().await.expect("warning").kind, NotificationKind::Warning);
    }

    #[test]
    fn history_keeps_fifty_newest() {
        let mut history = QueryHistory::default();
        for index in 0..55 {
            history.record(QueryHistoryEntry {
                id: 0,
                query: format!("SELECT {index}"),
                database: DEFAULT_DATABASE.to_string(),
                query_type: QueryType::Select,
                status: QueryStatus::Success,
                row_count: 1,
                execution_ms: 1,
                error: None,
                timestamp: Utc::now(),
            });
        }

        assert_eq!(history.len(), 50);
        let newest = history.entries().next().expect("newest entry");
        assert_eq!(newest.query, "SELECT 54");
        assert_eq!(newest.id, 55);
        assert!(history.get(5).is_none());
    }

    #[test]
    fn statement_without_result_set_shows_message() {
        let result = QueryResult {
            message: Some("EXPLAIN completed".to_string()),
            ..QueryResult::default()
        };
        assert_eq!(render_result(&result, 5), "EXPLAIN completed");
    }

    #[test]
    fn execution_time_saturates_on_huge_durations() {
        assert_eq!(whole_millis(Duration::from_micros(2_500)), 2);
        assert_eq!(whole_millis(Duration::MAX), u64::MAX);
    }
}
