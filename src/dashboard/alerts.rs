use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Utc};

use super::thresholds::{CACHE_HIT_RATE, Severity, ThresholdTable};

#[derive(Debug, Clone, PartialEq)]
pub struct AlertEvent {
    pub id: u64,
    pub metric: String,
    pub message: String,
    pub severity: Severity,
    pub created_at: DateTime<Utc>,
}

/// Newest-first alert list, bounded by count only.
#[derive(Debug, Clone)]
pub struct AlertFeed {
    events: VecDeque<AlertEvent>,
    capacity: usize,
    next_id: u64,
}

impl AlertFeed {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: VecDeque::with_capacity(capacity),
            capacity,
            next_id: 1,
        }
    }

    /// Classifies `value` and records an alert for any non-normal result.
    /// Returns the recorded alert, or `None` for normal values and unknown
    /// metrics.
    pub fn evaluate(
        &mut self,
        table: &ThresholdTable,
        metric: &str,
        value: f64,
        now: DateTime<Utc>,
    ) -> Option<AlertEvent> {
        let severity = table.classify(metric, value)?;
        if severity == Severity::Normal {
            return None;
        }

        let message = alert_message(metric, value, severity);
        Some(self.push(metric, message, severity, now))
    }

    pub fn push(
        &mut self,
        metric: &str,
        message: String,
        severity: Severity,
        now: DateTime<Utc>,
    ) -> AlertEvent {
        let event = AlertEvent {
            id: self.next_id,
            metric: metric.to_string(),
            message,
            severity,
            created_at: now,
        };
        self.next_id += 1;

        self.events.push_front(event.clone());
        self.events.truncate(self.capacity);
        event
    }

    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.events.len();
        self.events.retain(|event| event.id != id);
        self.events.len() != before
    }

    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        self.events.truncate(self.capacity);
    }

    pub fn visible(&self, count: usize) -> impl Iterator<Item = &AlertEvent> {
        self.events.iter().take(count)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

fn alert_message(metric: &str, value: f64, severity: Severity) -> String {
    let value = format_value(value);
    match (metric, severity) {
        (CACHE_HIT_RATE, Severity::Critical) => format!("Cache hit rate critically low: {value}%"),
        (CACHE_HIT_RATE, _) => format!("Cache hit rate below optimal: {value}%"),
        (_, severity) => format!("{metric} {severity}: {value}"),
    }
}

fn format_value(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        format!("{rounded}")
    }
}

/// Remembers the last severity per metric so a sustained breach is forwarded
/// once instead of on every tick.
#[derive(Debug, Default)]
pub struct AlertTransitions {
    last: HashMap<String, Severity>,
}

impl AlertTransitions {
    pub fn should_forward(&mut self, metric: &str, severity: Severity) -> bool {
        let previous = self
            .last
            .insert(metric.to_string(), severity)
            .unwrap_or(Severity::Normal);
        severity != Severity::Normal && severity != previous
    }
}
