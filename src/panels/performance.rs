use chrono::{DateTime, Utc};

use super::{
    ActionOutcome, CHART_LABEL_FORMAT, Panel, PanelAction, RefreshContext, Refreshed, or_dash,
};
use crate::api::{ApiError, PerformanceMetrics};
use crate::config::Panels;
use crate::dashboard::{
    AlertFeed, AlertTransitions, ChartSeries, Notification, RenderSurface, Severity,
    ThresholdTable,
};
use crate::transform::format::{format_bytes, format_compact, relative_age};
use crate::transform::nodes::active_pool_connections;
use crate::transform::performance::{PerformanceSnapshot, performance_score};

const CONNECTION_SERIES: [&str; 3] = ["active", "idle", "waiting"];
const QUERY_SERIES: [&str; 2] = ["qps", "avg_ms"];
const RESOURCE_SERIES: [&str; 3] = ["cpu", "memory", "disk_io"];
const ERROR_SERIES: [&str; 1] = ["error_rate"];

/// Pool size reported by `/api/stats` and `/api/pool_processes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PoolUsage {
    nodes: usize,
    bound_processes: usize,
}

pub struct PerformancePanel {
    max_connections: u32,
    snapshot: Option<PerformanceSnapshot>,
    score: Option<i64>,
    replicas: Vec<(String, f64)>,
    pool: Option<PoolUsage>,
    connections: ChartSeries,
    queries: ChartSeries,
    resources: ChartSeries,
    errors: ChartSeries,
    alerts: AlertFeed,
    visible_alerts: usize,
    transitions: AlertTransitions,
}

impl PerformancePanel {
    pub fn new(panels: &Panels, feed_capacity: usize, visible_alerts: usize) -> Self {
        let window = panels.performance_window;
        Self {
            max_connections: panels.max_connections,
            snapshot: None,
            score: None,
            replicas: Vec::new(),
            pool: None,
            connections: ChartSeries::new(window, &CONNECTION_SERIES),
            queries: ChartSeries::new(window, &QUERY_SERIES),
            resources: ChartSeries::new(window, &RESOURCE_SERIES),
            errors: ChartSeries::new(window, &ERROR_SERIES),
            alerts: AlertFeed::with_capacity(feed_capacity),
            visible_alerts,
            transitions: AlertTransitions::default(),
        }
    }

    fn apply_metrics(&mut self, metrics: &PerformanceMetrics, ctx: &RefreshContext) {
        let label = ctx.now.format(CHART_LABEL_FORMAT).to_string();
        let snapshot = PerformanceSnapshot::from_metrics(metrics, self.max_connections);

        if metrics.activity.is_some() {
            self.connections.push_row(
                label.clone(),
                &[
                    ("active", snapshot.active),
                    ("idle", snapshot.idle),
                    ("waiting", snapshot.waiting),
                ],
            );
        }
        if metrics.summary.is_some() {
            self.queries.push_row(
                label.clone(),
                &[
                    ("qps", snapshot.queries_per_second),
                    ("avg_ms", snapshot.avg_query_ms),
                ],
            );
        }
        if metrics.resources.is_some() {
            self.resources.push_row(
                label.clone(),
                &[
                    ("cpu", snapshot.cpu),
                    ("memory", snapshot.memory),
                    ("disk_io", snapshot.disk_io),
                ],
            );
        }
        self.errors
            .push_row(label, &[("error_rate", Some(snapshot.error_rate * 100.0))]);

        if !metrics.replication.is_empty() {
            self.replicas = metrics
                .replication
                .iter()
                .enumerate()
                .map(|(index, replica)| {
                    let name = replica
                        .application_name
                        .clone()
                        .filter(|name| !name.is_empty())
                        .unwrap_or_else(|| format!("Replica {}", index + 1));
                    (name, replica.replay_lag_bytes.unwrap_or(0.0))
                })
                .collect();
        }

        self.evaluate_thresholds(&snapshot, &ctx.runtime.thresholds, ctx);
        self.score = Some(performance_score(
            &ctx.runtime.thresholds,
            snapshot.cpu,
            snapshot.memory,
            snapshot.cache_hit_rate,
        ));
        self.snapshot = Some(snapshot);
    }

    /// Every breach lands in the feed; only a change of severity is pushed
    /// to the notifier.
    fn evaluate_thresholds(
        &mut self,
        snapshot: &PerformanceSnapshot,
        table: &ThresholdTable,
        ctx: &RefreshContext,
    ) {
        self.alerts.set_capacity(ctx.runtime.alerts.feed_capacity);
        self.visible_alerts = ctx.runtime.alerts.visible;

        for (metric, value) in snapshot.readings() {
            let Some(severity) = table.classify(metric, value) else {
                continue;
            };
            let forward = self.transitions.should_forward(metric, severity);

            if let Some(alert) = self.alerts.evaluate(table, metric, value, ctx.now) {
                log::warn!(
                    "threshold_breached metric={} value={} severity={} alert_id={}",
                    metric,
                    value,
                    alert.severity,
                    alert.id
                );
                if forward {
                    let notification = match alert.severity {
                        Severity::Critical => Notification::error(Self::NAME, alert.message),
                        _ => Notification::warning(Self::NAME, alert.message),
                    };
                    ctx.notifications.send(notification);
                }
            }
        }
    }

    fn render_alerts(&self, now: DateTime<Utc>) -> String {
        let lines: Vec<String> = self
            .alerts
            .visible(self.visible_alerts)
            .map(|alert| {
                format!(
                    "#{} [{}] {} ({})",
                    alert.id,
                    alert.severity,
                    alert.message,
                    relative_age(alert.created_at, now)
                )
            })
            .collect();

        if lines.is_empty() {
            "No active alerts".to_string()
        } else {
            lines.join("\n")
        }
    }
}

impl Panel for PerformancePanel {
    const NAME: &'static str = "performance";
    const SLOTS: &'static [&'static str] = &[
        "active_connections",
        "total_connections",
        "connection_usage",
        "avg_response",
        "cache_hit_rate",
        "replication",
        "cpu",
        "memory",
        "disk_io",
        "error_rate",
        "qps",
        "total_queries",
        "performance_score",
        "pool",
        "alerts",
        "connections_chart",
        "queries_chart",
        "resources_chart",
        "errors_chart",
    ];

    /// Pool stats are supplementary; only a metrics failure fails the tick.
    async fn refresh(&mut self, ctx: &RefreshContext) -> Result<Refreshed, ApiError> {
        let (metrics, stats, processes) = tokio::join!(
            ctx.client.performance_metrics(),
            ctx.client.stats(),
            ctx.client.pool_processes()
        );

        match (stats, processes) {
            (Ok(stats), Ok(processes)) => {
                self.pool = Some(PoolUsage {
                    nodes: stats.pool_nodes.len(),
                    bound_processes: active_pool_connections(&processes),
                });
            }
            (Err(error), _) | (_, Err(error)) => {
                log::warn!(
                    "pool_stats_unavailable panel={} code={} error={}",
                    Self::NAME,
                    error.code(),
                    error
                );
            }
        }

        let metrics = metrics?;
        self.apply_metrics(&metrics, ctx);
        Ok(Refreshed::Complete)
    }

    fn render(&self, surface: &mut RenderSurface, now: DateTime<Utc>) {
        if let Some(snapshot) = &self.snapshot {
            let percent = |value: Option<f64>| or_dash(value.map(|value| format!("{value}%")));

            surface.set(
                "active_connections",
                or_dash(snapshot.active.map(|value| value.to_string())),
            );
            surface.set(
                "total_connections",
                or_dash(snapshot.total_connections.map(|value| value.to_string())),
            );
            surface.set(
                "connection_usage",
                or_dash(
                    snapshot
                        .connection_usage_percent
                        .map(|value| format!("{value:.1}% of {}", self.max_connections)),
                ),
            );
            surface.set(
                "avg_response",
                or_dash(snapshot.avg_query_ms.map(|value| format!("{value}ms"))),
            );
            surface.set("cache_hit_rate", percent(snapshot.cache_hit_rate));
            surface.set("cpu", percent(snapshot.cpu));
            surface.set("memory", percent(snapshot.memory));
            surface.set("disk_io", percent(snapshot.disk_io));
            surface.set("error_rate", format!("{:.2}%", snapshot.error_rate));
            surface.set(
                "qps",
                or_dash(snapshot.queries_per_second.map(format_compact)),
            );
            surface.set(
                "total_queries",
                or_dash(snapshot.total_queries_today.map(format_compact)),
            );

            let replication = match snapshot.max_replication_lag {
                Some(lag) => {
                    let state = if snapshot.is_lagging() {
                        "Lagging"
                    } else {
                        "Synchronized"
                    };
                    let replicas: Vec<String> = self
                        .replicas
                        .iter()
                        .map(|(name, lag)| format!("{name} {}", format_bytes(*lag)))
                        .collect();
                    format!("{state} (max {}) {}", format_bytes(lag), replicas.join(", "))
                }
                None => "no replicas reported".to_string(),
            };
            surface.set("replication", replication.trim_end());
        }

        if let Some(score) = self.score {
            let reported = self
                .snapshot
                .as_ref()
                .and_then(|snapshot| snapshot.reported_score)
                .map(|reported| format!(" (backend {})", reported.round() as i64))
                .unwrap_or_default();
            surface.set("performance_score", format!("{score}{reported}"));
        }

        if let Some(pool) = self.pool {
            surface.set(
                "pool",
                format!(
                    "{} nodes, {} bound processes",
                    pool.nodes, pool.bound_processes
                ),
            );
        }

        surface.set("alerts", self.render_alerts(now));
        surface.set("connections_chart", self.connections.render_window());
        surface.set("queries_chart", self.queries.render_window());
        surface.set("resources_chart", self.resources.render_window());
        surface.set("errors_chart", self.errors.render_window());
    }

    fn apply(&mut self, action: PanelAction) -> Result<ActionOutcome, String> {
        match action {
            PanelAction::DismissAlert(id) => {
                if self.alerts.dismiss(id) {
                    Ok(ActionOutcome::done(format!("Alert #{id} dismissed")))
                } else {
                    Err(format!("No alert with id {id}"))
                }
            }
            PanelAction::ClearCharts => {
                self.connections.clear();
                self.queries.clear();
                self.resources.clear();
                self.errors.clear();
                Ok(ActionOutcome::done("Charts cleared"))
            }
            other => Err(format!("The performance panel does not support {other:?}")),
        }
    }
}
