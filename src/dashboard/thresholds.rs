use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;

pub const CPU: &str = "cpu";
pub const MEMORY: &str = "memory";
pub const CONNECTIONS: &str = "connections";
pub const QUERY_TIME: &str = "queryTime";
pub const REPLICATION_LAG: &str = "replicationLag";
pub const CACHE_HIT_RATE: &str = "cacheHitRate";
pub const ERROR_RATE: &str = "errorRate";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    HigherIsWorse,
    LowerIsWorse,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ThresholdPair {
    pub warning: f64,
    pub critical: f64,
    #[serde(default)]
    pub direction: Direction,
}

impl ThresholdPair {
    pub const fn higher_is_worse(warning: f64, critical: f64) -> Self {
        Self {
            warning,
            critical,
            direction: Direction::HigherIsWorse,
        }
    }

    pub const fn lower_is_worse(warning: f64, critical: f64) -> Self {
        Self {
            warning,
            critical,
            direction: Direction::LowerIsWorse,
        }
    }

    /// Critical is checked first; cutoffs are exclusive.
    pub fn classify(&self, value: f64) -> Severity {
        let (critical, warning) = match self.direction {
            Direction::HigherIsWorse => (value > self.critical, value > self.warning),
            Direction::LowerIsWorse => (value < self.critical, value < self.warning),
        };

        if critical {
            Severity::Critical
        } else if warning {
            Severity::Warning
        } else {
            Severity::Normal
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Normal,
    Warning,
    Critical,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdTable {
    pairs: BTreeMap<String, ThresholdPair>,
}

impl Default for ThresholdTable {
    fn default() -> Self {
        let pairs = [
            (CPU, ThresholdPair::higher_is_worse(70.0, 90.0)),
            (MEMORY, ThresholdPair::higher_is_worse(80.0, 95.0)),
            (CONNECTIONS, ThresholdPair::higher_is_worse(80.0, 95.0)),
            (QUERY_TIME, ThresholdPair::higher_is_worse(1000.0, 5000.0)),
            (REPLICATION_LAG, ThresholdPair::higher_is_worse(100.0, 1000.0)),
            (CACHE_HIT_RATE, ThresholdPair::lower_is_worse(90.0, 80.0)),
            (ERROR_RATE, ThresholdPair::higher_is_worse(0.01, 0.05)),
        ]
        .into_iter()
        .map(|(name, pair)| (name.to_string(), pair))
        .collect();

        Self { pairs }
    }
}

impl ThresholdTable {
    pub fn with_overrides(overrides: &BTreeMap<String, ThresholdPair>) -> Self {
        let mut table = Self::default();
        for (metric, pair) in overrides {
            table.pairs.insert(metric.clone(), *pair);
        }
        table
    }

    pub fn get(&self, metric: &str) -> Option<&ThresholdPair> {
        self.pairs.get(metric)
    }

    /// `None` for metrics without a configured pair.
    pub fn classify(&self, metric: &str, value: f64) -> Option<Severity> {
        self.get(metric).map(|pair| pair.classify(value))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ThresholdPair)> {
        self.pairs.iter().map(|(name, pair)| (name.as_str(), pair))
    }
}
