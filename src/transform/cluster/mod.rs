use std::collections::HashMap;

use crate::api::{ClusterEvent, ClusterStatus, Component, HistoryRecord, parse_timestamp};

pub const TRACKED_COMPONENTS: [&str; 3] = ["pg-master", "pg-replica", "pgpool"];
pub const SLOW_RESPONSE_MS: f64 = 1000.0;

const ONLINE: &str = "online";
const ERROR: &str = "error";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthTone {
    Good,
    Degraded,
    Poor,
}

impl HealthTone {
    pub fn from_score(score: i64) -> Self {
        if score >= 90 {
            Self::Good
        } else if score >= 70 {
            Self::Degraded
        } else {
            Self::Poor
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Degraded => "degraded",
            Self::Poor => "poor",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClusterOverview {
    pub health_score: i64,
    pub tone: HealthTone,
    pub online: u32,
    pub offline: u32,
    pub warnings: usize,
    pub avg_response_ms: f64,
}

pub fn cluster_overview(status: &ClusterStatus) -> ClusterOverview {
    let health_score = status.cluster_health.round() as i64;
    ClusterOverview {
        health_score,
        tone: HealthTone::from_score(health_score),
        online: status.summary.online_components,
        offline: status.summary.offline_components,
        warnings: warning_count(&status.components),
        avg_response_ms: average_response_ms(&status.components),
    }
}

/// Components that errored or answered slower than a second.
pub fn warning_count(components: &[Component]) -> usize {
    components
        .iter()
        .filter(|component| {
            component.status == ERROR
                || component
                    .response_time_ms
                    .is_some_and(|ms| ms > SLOW_RESPONSE_MS)
        })
        .count()
}

/// Missing response times count as zero; no components gives zero.
pub fn average_response_ms(components: &[Component]) -> f64 {
    if components.is_empty() {
        return 0.0;
    }
    let total: f64 = components
        .iter()
        .map(|component| component.response_time_ms.unwrap_or(0.0))
        .sum();
    total / components.len() as f64
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EventFilter {
    #[default]
    All,
    Severity(String),
}

impl EventFilter {
    pub fn parse(raw: &str) -> Self {
        let normalized = raw.trim().to_lowercase();
        if normalized.is_empty() || normalized == "all" {
            Self::All
        } else {
            Self::Severity(normalized)
        }
    }

    pub fn matches(&self, event: &ClusterEvent) -> bool {
        match self {
            Self::All => true,
            Self::Severity(severity) => event.severity == *severity,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::All => "all",
            Self::Severity(severity) => severity,
        }
    }
}

pub fn filter_events<'a>(events: &'a [ClusterEvent], filter: &EventFilter) -> Vec<&'a ClusterEvent> {
    events.iter().filter(|event| filter.matches(event)).collect()
}

/// `round(matching / total * 100)`, or 100 when there is nothing to judge.
pub fn availability_percent(matching: usize, total: usize) -> u32 {
    if total == 0 {
        return 100;
    }
    ((matching as f64 / total as f64) * 100.0).round() as u32
}

/// Share of `online` history records per tracked component.
pub fn component_availability(history: &[HistoryRecord]) -> Vec<(&'static str, u32)> {
    TRACKED_COMPONENTS
        .iter()
        .map(|name| {
            let records = history.iter().filter(|record| record.component == *name);
            let (total, online) = records.fold((0usize, 0usize), |(total, online), record| {
                (total + 1, online + usize::from(record.status == ONLINE))
            });
            (*name, availability_percent(online, total))
        })
        .collect()
}

/// Groups history by time-of-day label, in first-seen order, and emits one
/// response time per tracked component with gaps for missing records.
/// Only the newest `limit` rows are returned.
pub fn response_time_rows(history: &[HistoryRecord], limit: usize) -> Vec<(String, Vec<Option<f64>>)> {
    let mut order: Vec<String> = Vec::new();
    let mut by_label: HashMap<String, HashMap<&str, Option<f64>>> = HashMap::new();

    for record in history {
        let label = time_label(&record.timestamp);
        let slot = by_label.entry(label.clone()).or_insert_with(|| {
            order.push(label);
            HashMap::new()
        });
        slot.insert(record.component.as_str(), record.response_time_ms);
    }

    let skip = order.len().saturating_sub(limit);
    order
        .into_iter()
        .skip(skip)
        .map(|label| {
            let values = TRACKED_COMPONENTS
                .iter()
                .map(|name| {
                    by_label
                        .get(&label)
                        .and_then(|components| components.get(name).copied().flatten())
                })
                .collect();
            (label, values)
        })
        .collect()
}

fn time_label(raw: &str) -> String {
    match parse_timestamp(raw) {
        Some(at) => at.format("%H:%M:%S").to_string(),
        None => raw.to_string(),
    }
}

#[cfg(test)]
mod tests;
