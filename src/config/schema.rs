use std::collections::BTreeMap;

use serde::Deserialize;

use crate::dashboard::{ThresholdPair, ThresholdTable};

use super::defaults::*;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: Api,
    #[serde(default)]
    pub panels: Panels,
    #[serde(default)]
    pub alerts: Alerts,
    /// Overrides merged on top of the built-in threshold table.
    #[serde(default)]
    pub thresholds: BTreeMap<String, ThresholdPair>,
    #[serde(default)]
    pub telegram: Telegram,
}

impl Config {
    pub fn threshold_table(&self) -> ThresholdTable {
        ThresholdTable::with_overrides(&self.thresholds)
    }
}

/// The subset of the config that a hot reload may swap while panels run.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub thresholds: ThresholdTable,
    pub alerts: Alerts,
}

impl RuntimeConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            thresholds: config.threshold_table(),
            alerts: config.alerts.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Api {
    #[serde(default = "default_api_base_url")]
    pub base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Panels {
    #[serde(default = "default_cluster_interval_secs")]
    pub cluster_interval_secs: u64,
    #[serde(default = "default_performance_interval_secs")]
    pub performance_interval_secs: u64,
    #[serde(default = "default_queries_interval_secs")]
    pub queries_interval_secs: u64,
    #[serde(default = "default_nodes_interval_secs")]
    pub nodes_interval_secs: u64,
    #[serde(default = "default_insights_interval_secs")]
    pub insights_interval_secs: u64,
    #[serde(default = "default_cluster_history_hours")]
    pub cluster_history_hours: u32,
    #[serde(default = "default_timeline_window")]
    pub timeline_window: usize,
    #[serde(default = "default_performance_window")]
    pub performance_window: usize,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Alerts {
    #[serde(default = "default_alert_feed_capacity")]
    pub feed_capacity: usize,
    #[serde(default = "default_alert_visible")]
    pub visible: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Telegram {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub bot_token: String,
    #[serde(default)]
    pub owner_chat_id: i64,
}
