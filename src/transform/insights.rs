use crate::api::{DatabaseStatistics, PerformanceInsight, QueryStatRow, QueryStatistics};

const HIGH_PENALTY: i64 = 15;
const MEDIUM_PENALTY: i64 = 10;
const LOW_PENALTY: i64 = 5;

const OPTIMIZATION_FLOOR: i64 = 20;
const OPTIMIZATION_PENALTY: i64 = 10;
const MAX_RECOMMENDATIONS_COUNTED: usize = 8;
const MAX_RECOMMENDATIONS_LISTED: usize = 6;

const MAINTENANCE: &str = "maintenance";
const DEFAULT_ISSUE_ADVICE: &str = "Review this issue for potential optimization opportunities.";
const DEFAULT_CRITICAL_ADVICE: &str = "This issue requires immediate attention.";

/// 100 minus a penalty per finding by severity, clamped to `0..=100`.
/// Unknown severities cost nothing.
pub fn health_score(insights: &[PerformanceInsight]) -> i64 {
    let penalty: i64 = insights
        .iter()
        .map(|insight| match insight.severity.as_str() {
            "high" => HIGH_PENALTY,
            "medium" => MEDIUM_PENALTY,
            "low" => LOW_PENALTY,
            _ => 0,
        })
        .sum();
    (100 - penalty).clamp(0, 100)
}

pub fn optimization_score(issues: usize) -> i64 {
    let issues = i64::try_from(issues).unwrap_or(i64::MAX);
    100_i64
        .saturating_sub(issues.saturating_mul(OPTIMIZATION_PENALTY))
        .max(OPTIMIZATION_FLOOR)
}

pub fn recommendations_count(issues: usize) -> usize {
    issues.saturating_add(2).min(MAX_RECOMMENDATIONS_COUNTED)
}

/// `good` from 80, `fair` from 60, `poor` below.
pub fn score_grade(score: i64) -> &'static str {
    match score {
        80.. => "good",
        60..=79 => "fair",
        _ => "poor",
    }
}

pub fn severity_icon(severity: &str) -> &'static str {
    match severity {
        "high" => "🔴",
        "medium" => "🟡",
        "low" => "🟢",
        _ => "ℹ️",
    }
}

/// One line pair per finding, or the all-clear message.
pub fn issue_lines(insights: &[PerformanceInsight]) -> Vec<String> {
    if insights.is_empty() {
        return vec!["✅ No Critical Issues Found".to_string()];
    }

    insights
        .iter()
        .map(|insight| {
            let advice = insight
                .recommendation
                .as_deref()
                .filter(|advice| !advice.trim().is_empty())
                .unwrap_or(DEFAULT_ISSUE_ADVICE);
            format!(
                "{} {}\n   {}",
                severity_icon(&insight.severity),
                insight.message,
                advice
            )
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recommendation {
    pub title: String,
    pub description: String,
    pub priority: Priority,
}

impl Recommendation {
    fn new(title: impl Into<String>, description: impl Into<String>, priority: Priority) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            priority,
        }
    }
}

fn standing_recommendations() -> Vec<Recommendation> {
    vec![
        Recommendation::new(
            "Run Database Maintenance",
            "Running VACUUM ANALYZE reclaims space from dead tuples and refreshes planner statistics.",
            Priority::High,
        ),
        Recommendation::new(
            "Optimize Query Indexes",
            "Review slow queries for sequential scans that an index would avoid.",
            Priority::Medium,
        ),
        Recommendation::new(
            "Tune Configuration",
            "A larger shared_buffers setting raises the cache hit ratio.",
            Priority::Medium,
        ),
        Recommendation::new(
            "Enhance Monitoring",
            "Alert on key performance metrics before they impact users.",
            Priority::Low,
        ),
    ]
}

/// Every maintenance finding becomes a high-priority `Critical:` entry in
/// front of the standing list, the latest finding first; at most six are
/// kept.
pub fn recommendations(insights: &[PerformanceInsight]) -> Vec<Recommendation> {
    let mut list = standing_recommendations();
    for insight in insights.iter().filter(|insight| insight.kind == MAINTENANCE) {
        let description = insight
            .recommendation
            .clone()
            .filter(|advice| !advice.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CRITICAL_ADVICE.to_string());
        list.insert(
            0,
            Recommendation::new(
                format!("Critical: {}", insight.message),
                description,
                Priority::High,
            ),
        );
    }
    list.truncate(MAX_RECOMMENDATIONS_LISTED);
    list
}

/// Slowest statements by mean execution time.
pub fn optimization_candidates(stats: &QueryStatistics, limit: usize) -> Vec<QueryStatRow> {
    let mut rows: Vec<QueryStatRow> = stats
        .slow_queries
        .iter()
        .filter(|row| row.mean_exec_time.is_some())
        .cloned()
        .collect();
    rows.sort_by(|left, right| {
        right
            .mean_exec_time
            .unwrap_or(0.0)
            .total_cmp(&left.mean_exec_time.unwrap_or(0.0))
    });
    rows.truncate(limit);
    rows
}

pub fn unused_index_count(stats: &DatabaseStatistics) -> usize {
    stats
        .indexes
        .iter()
        .filter(|index| index.usage_status.as_deref() == Some("UNUSED"))
        .count()
}
