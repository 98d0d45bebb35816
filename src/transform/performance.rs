use crate::api::{PerformanceMetrics, ReplicationStat};
use crate::dashboard::{
    CACHE_HIT_RATE, CONNECTIONS, CPU, ERROR_RATE, MEMORY, QUERY_TIME, REPLICATION_LAG,
    ThresholdTable,
};

/// Replication counts as lagging past 10 MiB of replay lag.
pub const LAGGING_REPLAY_BYTES: f64 = 10.0 * 1024.0 * 1024.0;

const SCORE_WEIGHT_CPU: f64 = 0.2;
const SCORE_WEIGHT_MEMORY: f64 = 0.2;
const SCORE_WEIGHT_CACHE_HIT_RATE: f64 = 0.2;

/// Scalars derived from one `/api/performance_metrics` payload. Sections the
/// backend left out stay `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PerformanceSnapshot {
    pub active: Option<f64>,
    pub idle: Option<f64>,
    pub waiting: Option<f64>,
    pub total_connections: Option<f64>,
    pub connection_usage_percent: Option<f64>,
    pub avg_query_ms: Option<f64>,
    pub cache_hit_rate: Option<f64>,
    pub max_replication_lag: Option<f64>,
    pub cpu: Option<f64>,
    pub memory: Option<f64>,
    pub disk_io: Option<f64>,
    pub error_rate: f64,
    pub queries_per_second: Option<f64>,
    pub total_queries_today: Option<f64>,
    pub reported_score: Option<f64>,
}

impl PerformanceSnapshot {
    pub fn from_metrics(metrics: &PerformanceMetrics, max_connections: u32) -> Self {
        let mut snapshot = Self {
            error_rate: metrics.error_rate.unwrap_or(0.0),
            ..Self::default()
        };

        if let Some(activity) = &metrics.activity {
            let active = activity.active_queries.unwrap_or(0.0);
            snapshot.active = Some(active);
            snapshot.idle = Some(activity.idle_connections.unwrap_or(0.0));
            snapshot.waiting = Some(activity.waiting_queries.unwrap_or(0.0));
            snapshot.total_connections = Some(activity.total_connections.unwrap_or(0.0));
            snapshot.connection_usage_percent =
                Some(connection_usage_percent(active, max_connections));
            snapshot.avg_query_ms = Some(avg_query_ms(activity.avg_query_time));
        }

        if let Some(database) = &metrics.database {
            snapshot.cache_hit_rate = Some(database.cache_hit_ratio.unwrap_or(0.0).round());
        }

        snapshot.max_replication_lag = max_replication_lag(&metrics.replication);

        if let Some(resources) = &metrics.resources {
            snapshot.cpu = resources.cpu_percent.map(f64::round);
            snapshot.memory = resources.memory_percent.map(f64::round);
            snapshot.disk_io = resources.disk_io_percent.map(f64::round);
        }

        if let Some(summary) = &metrics.summary {
            snapshot.queries_per_second = summary.queries_per_second;
            snapshot.total_queries_today = summary.total_queries_today;
            snapshot.reported_score = summary.performance_score;
        }

        snapshot
    }

    /// Values checked against the threshold table, in evaluation order.
    pub fn readings(&self) -> Vec<(&'static str, f64)> {
        [
            (CONNECTIONS, self.connection_usage_percent),
            (QUERY_TIME, self.avg_query_ms),
            (CACHE_HIT_RATE, self.cache_hit_rate),
            (REPLICATION_LAG, self.max_replication_lag),
            (CPU, self.cpu),
            (MEMORY, self.memory),
            (ERROR_RATE, Some(self.error_rate)),
        ]
        .into_iter()
        .filter_map(|(metric, value)| value.map(|value| (metric, value)))
        .collect()
    }

    pub fn is_lagging(&self) -> bool {
        self.max_replication_lag
            .is_some_and(|lag| lag > LAGGING_REPLAY_BYTES)
    }
}

pub fn connection_usage_percent(active: f64, max_connections: u32) -> f64 {
    if max_connections == 0 {
        return 0.0;
    }
    active / f64::from(max_connections) * 100.0
}

/// Backend reports seconds; charts use whole milliseconds.
pub fn avg_query_ms(avg_query_time_secs: Option<f64>) -> f64 {
    (avg_query_time_secs.unwrap_or(0.0) * 1000.0).round()
}

pub fn max_replication_lag(replicas: &[ReplicationStat]) -> Option<f64> {
    replicas
        .iter()
        .map(|replica| replica.replay_lag_bytes.unwrap_or(0.0))
        .reduce(f64::max)
}

/// Starts at 100 and deducts a weighted share of every point past the
/// warning cutoff. Absent readings deduct nothing.
pub fn performance_score(
    table: &ThresholdTable,
    cpu: Option<f64>,
    memory: Option<f64>,
    cache_hit_rate: Option<f64>,
) -> i64 {
    let mut score = 100.0;

    if let (Some(cpu), Some(pair)) = (cpu, table.get(CPU))
        && cpu > pair.warning
    {
        score -= (cpu - pair.warning) * SCORE_WEIGHT_CPU;
    }
    if let (Some(memory), Some(pair)) = (memory, table.get(MEMORY))
        && memory > pair.warning
    {
        score -= (memory - pair.warning) * SCORE_WEIGHT_MEMORY;
    }
    if let (Some(rate), Some(pair)) = (cache_hit_rate, table.get(CACHE_HIT_RATE))
        && rate < pair.warning
    {
        score -= (pair.warning - rate) * SCORE_WEIGHT_CACHE_HIT_RATE;
    }

    score.max(0.0).round() as i64
}
