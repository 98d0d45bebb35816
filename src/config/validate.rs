use thiserror::Error;

use crate::dashboard::Direction;

use super::schema::Config;

const MAX_HISTORY_HOURS: u32 = 24 * 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("invalid config: {0}")]
    Validation(String),
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let base_url = self.api.base_url.trim();
        if base_url.is_empty() {
            return Err(ConfigError::Validation(
                "api.base_url must not be empty".to_string(),
            ));
        }
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::Validation(
                "api.base_url must start with http:// or https://".to_string(),
            ));
        }
        if self.api.request_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "api.request_timeout_secs must be greater than 0".to_string(),
            ));
        }

        for (name, value) in [
            ("panels.cluster_interval_secs", self.panels.cluster_interval_secs),
            (
                "panels.performance_interval_secs",
                self.panels.performance_interval_secs,
            ),
            ("panels.queries_interval_secs", self.panels.queries_interval_secs),
            ("panels.nodes_interval_secs", self.panels.nodes_interval_secs),
            (
                "panels.insights_interval_secs",
                self.panels.insights_interval_secs,
            ),
        ] {
            if value == 0 {
                return Err(ConfigError::Validation(format!(
                    "{} must be greater than 0",
                    name
                )));
            }
        }

        if !(1..=MAX_HISTORY_HOURS).contains(&self.panels.cluster_history_hours) {
            return Err(ConfigError::Validation(format!(
                "panels.cluster_history_hours must be between 1 and {}",
                MAX_HISTORY_HOURS
            )));
        }
        if self.panels.timeline_window == 0 || self.panels.performance_window == 0 {
            return Err(ConfigError::Validation(
                "panels.timeline_window and panels.performance_window must be greater than 0"
                    .to_string(),
            ));
        }
        if self.panels.max_connections == 0 {
            return Err(ConfigError::Validation(
                "panels.max_connections must be greater than 0".to_string(),
            ));
        }

        if self.alerts.feed_capacity == 0 {
            return Err(ConfigError::Validation(
                "alerts.feed_capacity must be greater than 0".to_string(),
            ));
        }
        if self.alerts.visible > self.alerts.feed_capacity {
            return Err(ConfigError::Validation(
                "alerts.visible must not exceed alerts.feed_capacity".to_string(),
            ));
        }

        for (metric, pair) in &self.thresholds {
            if !pair.warning.is_finite() || !pair.critical.is_finite() {
                return Err(ConfigError::Validation(format!(
                    "thresholds.{} cutoffs must be finite numbers",
                    metric
                )));
            }
            let ordered = match pair.direction {
                Direction::HigherIsWorse => pair.warning <= pair.critical,
                Direction::LowerIsWorse => pair.warning >= pair.critical,
            };
            if !ordered {
                return Err(ConfigError::Validation(format!(
                    "thresholds.{}: warning must be reached before critical",
                    metric
                )));
            }
        }

        if self.telegram.enabled {
            if self.telegram.bot_token.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "telegram.bot_token must not be empty when telegram.enabled is true"
                        .to_string(),
                ));
            }
            if self.telegram.owner_chat_id == 0 {
                return Err(ConfigError::Validation(
                    "telegram.owner_chat_id must be set when telegram.enabled is true"
                        .to_string(),
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::ConfigError;
    use crate::config::load_config;

    fn load_from_str(raw: &str) -> Result<crate::config::Config, ConfigError> {
        let temp = tempdir().expect("tempdir should be created");
        let path = temp.path().join("config.toml");
        fs::write(&path, raw).expect("config should be written");
        load_config(&path)
    }

    #[test]
    fn empty_file_uses_page_defaults() {
        let config = load_from_str("").expect("defaults should be valid");
        assert_eq!(config.panels.cluster_interval_secs, 30);
        assert_eq!(config.panels.performance_interval_secs, 5);
        assert_eq!(config.panels.queries_interval_secs, 10);
        assert_eq!(config.panels.insights_interval_secs, 15);
        assert_eq!(config.panels.timeline_window, 20);
        assert_eq!(config.panels.performance_window, 100);
        assert_eq!(config.alerts.feed_capacity, 10);
        assert!(!config.telegram.enabled);
    }

    #[test]
    fn threshold_overrides_merge_over_defaults() {
        let config = load_from_str(
            r#"
[thresholds.cpu]
warning = 60.0
critical = 85.0
"#,
        )
        .expect("override should be valid");

        let table = config.threshold_table();
        let cpu = table.get("cpu").expect("cpu threshold");
        assert_eq!(cpu.warning, 60.0);
        assert_eq!(cpu.critical, 85.0);
        assert!(table.get("cacheHitRate").is_some());
    }

    #[test]
    fn rejects_inverted_pair_declared_as_higher_is_worse() {
        let error = load_from_str(
            r#"
[thresholds.cacheHitRate]
warning = 90.0
critical = 80.0
"#,
        )
        .expect_err("misordered pair should be rejected");
        assert!(matches!(error, ConfigError::Validation(_)));
    }

    #[test]
    fn accepts_lower_is_worse_pair() {
        let config = load_from_str(
            r#"
[thresholds.cacheHitRate]
warning = 92.0
critical = 85.0
direction = "lower_is_worse"
"#,
        );
        assert!(config.is_ok());
    }

    #[test]
    fn telegram_requires_token_and_owner() {
        let error = load_from_str(
            r#"
[telegram]
enabled = true
"#,
        )
        .expect_err("telegram without token should be rejected");
        assert!(error.to_string().contains("telegram.bot_token"));
    }

    #[test]
    fn rejects_non_http_base_url() {
        let error = load_from_str(
            r#"
[api]
base_url = "ftp://cluster"
"#,
        )
        .expect_err("ftp base url should be rejected");
        assert!(error.to_string().contains("api.base_url"));
    }

    #[test]
    fn reports_parse_errors_with_path() {
        let error = load_from_str("[api\n").expect_err("broken toml should fail");
        assert!(matches!(error, ConfigError::Parse { .. }));
    }
}
