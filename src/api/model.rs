use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Payload of `GET /api/cluster_status`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClusterStatus {
    #[serde(default, deserialize_with = "lenient::number_or_zero")]
    pub cluster_health: f64,
    #[serde(default)]
    pub components: Vec<Component>,
    #[serde(default)]
    pub recent_events: Vec<ClusterEvent>,
    #[serde(default)]
    pub summary: ClusterSummary,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Component {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, deserialize_with = "lenient::number")]
    pub response_time_ms: Option<f64>,
    #[serde(default)]
    pub last_check: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClusterEvent {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub component: String,
    #[serde(default)]
    pub severity: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub timestamp: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClusterSummary {
    #[serde(default)]
    pub total_components: u32,
    #[serde(default)]
    pub online_components: u32,
    #[serde(default)]
    pub offline_components: u32,
    #[serde(default)]
    pub last_check: Option<String>,
}

/// One row of `GET /api/cluster_history?hours=N`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryRecord {
    #[serde(default)]
    pub component: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default, deserialize_with = "lenient::number")]
    pub response_time_ms: Option<f64>,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub error_message: Option<String>,
}

/// Payload of `GET /api/performance_metrics`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PerformanceMetrics {
    #[serde(default)]
    pub database: Option<DatabaseStats>,
    #[serde(default)]
    pub activity: Option<ActivityStats>,
    #[serde(default)]
    pub replication: Vec<ReplicationStat>,
    #[serde(default)]
    pub resources: Option<ResourceUsage>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub error_rate: Option<f64>,
    #[serde(default)]
    pub summary: Option<PerformanceSummary>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseStats {
    #[serde(default, deserialize_with = "lenient::number")]
    pub cache_hit_ratio: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub connections: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub database_size: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActivityStats {
    #[serde(default, deserialize_with = "lenient::number")]
    pub total_connections: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub active_queries: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub idle_connections: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub waiting_queries: Option<f64>,
    /// Seconds.
    #[serde(default, deserialize_with = "lenient::number")]
    pub avg_query_time: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReplicationStat {
    #[serde(default)]
    pub application_name: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub replay_lag_bytes: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResourceUsage {
    #[serde(default, deserialize_with = "lenient::number")]
    pub cpu_percent: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub memory_percent: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub disk_io_percent: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PerformanceSummary {
    #[serde(default, deserialize_with = "lenient::number")]
    pub queries_per_second: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub total_queries_today: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub performance_score: Option<f64>,
}

/// `GET /api/stats` answers with a bare object instead of an envelope.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PoolStats {
    #[serde(default)]
    pub pool_nodes: Vec<PoolNode>,
    #[serde(default)]
    pub pool_processes: Vec<PoolProcess>,
    #[serde(default)]
    pub error: Option<String>,
}

/// One row of `SHOW POOL_NODES`; pgpool reports every column as text.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PoolNode {
    #[serde(default, deserialize_with = "lenient::text")]
    pub node_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub hostname: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub port: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub select_cnt: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub replication_delay: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PoolProcess {
    #[serde(default, deserialize_with = "lenient::text")]
    pub pool_pid: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub database: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub username: Option<String>,
}

/// Payload of `GET /api/query_statistics`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryStatistics {
    #[serde(default)]
    pub summary: Option<QuerySummary>,
    #[serde(default)]
    pub top_queries: Vec<QueryStatRow>,
    #[serde(default)]
    pub slow_queries: Vec<QueryStatRow>,
    #[serde(default)]
    pub query_patterns: Vec<QueryStatRow>,
    #[serde(default)]
    pub pg_stat_statements: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuerySummary {
    #[serde(default, deserialize_with = "lenient::number")]
    pub total_queries: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub active_queries: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub waiting_queries: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryStatRow {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub calls: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub mean_exec_time: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub total_exec_time: Option<f64>,
}

/// One finding of `GET /api/performance_insights`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PerformanceInsight {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub severity: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub details: Option<Value>,
    #[serde(default)]
    pub recommendation: Option<String>,
}

/// Payload of `GET /api/database_statistics`. Aggregates may arrive as
/// numeric strings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseStatistics {
    #[serde(default)]
    pub database: Option<DatabaseInfo>,
    #[serde(default)]
    pub tables: Vec<TableStat>,
    #[serde(default)]
    pub indexes: Vec<IndexStat>,
    #[serde(default)]
    pub cache: Option<CacheStats>,
    #[serde(default)]
    pub connections: Option<ConnectionStats>,
    #[serde(default)]
    pub locks: Vec<LockStat>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseInfo {
    #[serde(default, deserialize_with = "lenient::number")]
    pub database_size: Option<f64>,
    #[serde(default)]
    pub database_size_pretty: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub table_count: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub index_count: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TableStat {
    #[serde(default)]
    pub schemaname: Option<String>,
    #[serde(default)]
    pub tablename: Option<String>,
    #[serde(default)]
    pub total_size: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub live_tuples: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub dead_tuples: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IndexStat {
    #[serde(default)]
    pub tablename: Option<String>,
    #[serde(default)]
    pub indexrelname: Option<String>,
    #[serde(default)]
    pub index_size: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub index_scans: Option<f64>,
    #[serde(default)]
    pub usage_status: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheStats {
    #[serde(default, deserialize_with = "lenient::number")]
    pub heap_read: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub heap_hit: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub cache_hit_ratio: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConnectionStats {
    #[serde(default, deserialize_with = "lenient::number")]
    pub total_connections: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub active_connections: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub idle_connections: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub idle_in_transaction: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub waiting_connections: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub oldest_connection_age: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LockStat {
    #[serde(default)]
    pub mode: String,
    #[serde(default, deserialize_with = "lenient::number")]
    pub count: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExecuteQueryRequest {
    pub query: String,
    pub database: String,
}

/// Payload of `POST /api/execute_query`; statements without a result set
/// only carry `message`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryResult {
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Value>,
    #[serde(default)]
    pub row_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub execution_time: Option<f64>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Accepts RFC 3339 as well as the naive `isoformat()` and SQLite forms the
/// backend emits; naive values are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}

mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub(super) fn number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value.as_ref().and_then(as_number))
    }

    pub(super) fn number_or_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(number(deserializer)?.unwrap_or(0.0))
    }

    pub(super) fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            Some(Value::String(text)) => Some(text),
            Some(Value::Number(number)) => Some(number.to_string()),
            Some(Value::Bool(flag)) => Some(flag.to_string()),
            _ => None,
        })
    }

    fn as_number(value: &Value) -> Option<f64> {
        match value {
            Value::Number(number) => number.as_f64(),
            Value::String(text) => text.trim().parse::<f64>().ok(),
            _ => None,
        }
        .filter(|number| number.is_finite())
    }
}
