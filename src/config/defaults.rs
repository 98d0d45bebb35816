use super::schema::{Alerts, Api, Panels};

pub(super) fn default_api_base_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

pub(super) fn default_request_timeout_secs() -> u64 {
    10
}

pub(super) fn default_cluster_interval_secs() -> u64 {
    30
}

pub(super) fn default_performance_interval_secs() -> u64 {
    5
}

pub(super) fn default_queries_interval_secs() -> u64 {
    10
}

pub(super) fn default_nodes_interval_secs() -> u64 {
    5
}

pub(super) fn default_insights_interval_secs() -> u64 {
    15
}

pub(super) fn default_cluster_history_hours() -> u32 {
    1
}

pub(super) fn default_timeline_window() -> usize {
    20
}

pub(super) fn default_performance_window() -> usize {
    100
}

pub(super) fn default_max_connections() -> u32 {
    100
}

pub(super) fn default_alert_feed_capacity() -> usize {
    10
}

pub(super) fn default_alert_visible() -> usize {
    5
}

impl Default for Api {
    fn default() -> Self {
        Self {
            base_url: default_api_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for Panels {
    fn default() -> Self {
        Self {
            cluster_interval_secs: default_cluster_interval_secs(),
            performance_interval_secs: default_performance_interval_secs(),
            queries_interval_secs: default_queries_interval_secs(),
            nodes_interval_secs: default_nodes_interval_secs(),
            insights_interval_secs: default_insights_interval_secs(),
            cluster_history_hours: default_cluster_history_hours(),
            timeline_window: default_timeline_window(),
            performance_window: default_performance_window(),
            max_connections: default_max_connections(),
        }
    }
}

impl Default for Alerts {
    fn default() -> Self {
        Self {
            feed_capacity: default_alert_feed_capacity(),
            visible: default_alert_visible(),
        }
    }
}
