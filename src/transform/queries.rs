use std::fmt;

use crate::api::{QueryStatRow, QueryStatistics};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum QueryType {
    Select,
    Insert,
    Update,
    Delete,
    Create,
    Alter,
    Drop,
    Show,
    Explain,
    Other,
}

impl QueryType {
    /// Prefixes are tried in this order; the first match wins.
    pub const PREFIXED: [QueryType; 9] = [
        Self::Select,
        Self::Insert,
        Self::Update,
        Self::Delete,
        Self::Create,
        Self::Alter,
        Self::Drop,
        Self::Show,
        Self::Explain,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Select => "SELECT",
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::Create => "CREATE",
            Self::Alter => "ALTER",
            Self::Drop => "DROP",
            Self::Show => "SHOW",
            Self::Explain => "EXPLAIN",
            Self::Other => "OTHER",
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn classify_query_type(sql: &str) -> QueryType {
    let trimmed = sql.trim_start();
    QueryType::PREFIXED
        .into_iter()
        .find(|kind| {
            let prefix = kind.as_str();
            trimmed
                .get(..prefix.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
        })
        .unwrap_or(QueryType::Other)
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryMetrics {
    pub total_queries: f64,
    pub slow_queries: usize,
    /// Absent when the backend returned no top queries.
    pub avg_exec_ms: Option<f64>,
    pub total_calls: f64,
}

pub fn query_metrics(stats: &QueryStatistics) -> QueryMetrics {
    let total_queries = stats
        .summary
        .as_ref()
        .and_then(|summary| summary.total_queries)
        .unwrap_or(0.0);

    let avg_exec_ms = (!stats.top_queries.is_empty()).then(|| {
        let total: f64 = stats
            .top_queries
            .iter()
            .map(|row| row.mean_exec_time.unwrap_or(0.0))
            .sum();
        (total / stats.top_queries.len() as f64).round()
    });

    QueryMetrics {
        total_queries,
        slow_queries: stats.slow_queries.len(),
        avg_exec_ms,
        total_calls: stats
            .top_queries
            .iter()
            .map(|row| row.calls.unwrap_or(0.0))
            .sum(),
    }
}

/// Calls per query type, every type present (including zero counts).
/// Rows without a positive call count weigh 1.
pub fn query_type_distribution(rows: &[QueryStatRow]) -> Vec<(QueryType, f64)> {
    let mut distribution: Vec<(QueryType, f64)> = QueryType::PREFIXED
        .into_iter()
        .chain([QueryType::Other])
        .map(|kind| (kind, 0.0))
        .collect();

    for row in rows {
        let kind = classify_query_type(row.query.as_deref().unwrap_or_default());
        let weight = row.calls.filter(|calls| *calls > 0.0).unwrap_or(1.0);
        if let Some((_, total)) = distribution.iter_mut().find(|(candidate, _)| *candidate == kind) {
            *total += weight;
        }
    }

    distribution
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(query: &str, calls: Option<f64>, mean: Option<f64>) -> QueryStatRow {
        QueryStatRow {
            query: Some(query.to_string()),
            calls,
            mean_exec_time: mean,
            ..QueryStatRow::default()
        }
    }

    #[test]
    fn classifies_by_case_insensitive_prefix() {
        assert_eq!(classify_query_type("select * from x"), QueryType::Select);
        assert_eq!(classify_query_type("SeLeCt 1"), QueryType::Select);
        assert_eq!(classify_query_type("  \n insert into t values (1)"), QueryType::Insert);
        assert_eq!(classify_query_type("EXPLAIN ANALYZE SELECT 1"), QueryType::Explain);
        assert_eq!(classify_query_type("show pool_nodes"), QueryType::Show);
        assert_eq!(classify_query_type("WITH x AS (SELECT 1) SELECT * FROM x"), QueryType::Other);
        assert_eq!(classify_query_type(""), QueryType::Other);
        assert_eq!(classify_query_type("sel"), QueryType::Other);
        assert_eq!(classify_query_type("ñselect"), QueryType::Other);
    }

    #[test]
    fn distribution_is_weighted_by_calls() {
        let rows = vec![
            row("SELECT 1", Some(10.0), None),
            row("select 2", None, None),
            row("UPDATE t SET a = 1", Some(0.0), None),
            row("VACUUM", Some(3.0), None),
        ];

        let distribution = query_type_distribution(&rows);
        assert_eq!(distribution.len(), 10);
        let get = |kind| {
            distribution
                .iter()
                .find(|(candidate, _)| *candidate == kind)
                .map(|(_, total)| *total)
        };
        assert_eq!(get(QueryType::Select), Some(11.0));
        assert_eq!(get(QueryType::Update), Some(1.0));
        assert_eq!(get(QueryType::Other), Some(3.0));
        assert_eq!(get(QueryType::Drop), Some(0.0));
    }

    #[test]
    fn metrics_average_mean_exec_time() {
        let stats = QueryStatistics {
            top_queries: vec![
                row("SELECT 1", Some(4.0), Some(10.0)),
                row("SELECT 2", Some(6.0), Some(15.0)),
                row("SELECT 3", None, None),
            ],
            slow_queries: vec![row("SELECT pg_sleep(5)", Some(1.0), Some(5000.0))],
            ..QueryStatistics::default()
        };

        let metrics = query_metrics(&stats);
        assert_eq!(metrics.avg_exec_ms, Some(8.0));
        assert_eq!(metrics.slow_queries, 1);
        assert_eq!(metrics.total_calls, 10.0);
        assert_eq!(metrics.total_queries, 0.0);
    }

    #[test]
    fn metrics_without_top_queries_have_no_average() {
        assert_eq!(query_metrics(&QueryStatistics::default()).avg_exec_ms, None);
    }
}
