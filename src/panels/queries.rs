use chrono::{DateTime, Utc};

use super::{ActionOutcome, CHART_LABEL_FORMAT, Panel, PanelAction, RefreshContext, Refreshed};
use crate::api::{ApiError, QueryStatRow};
use crate::config::Panels;
use crate::dashboard::{ChartSeries, RenderSurface};
use crate::transform::format::{format_thousands, truncate_text};
use crate::transform::queries::{QueryMetrics, QueryType, query_metrics, query_type_distribution};

const TIMELINE_SERIES: [&str; 2] = ["avg_ms", "calls"];
const TOP_QUERIES_SHOWN: usize = 5;
const QUERY_PREVIEW_CHARS: usize = 60;

pub struct QueriesPanel {
    metrics: Option<QueryMetrics>,
    distribution: Vec<(QueryType, f64)>,
    top_queries: Vec<QueryStatRow>,
    pattern_count: usize,
    pg_stat_statements: Option<bool>,
    timeline: ChartSeries,
}

impl QueriesPanel {
    pub fn new(panels: &Panels) -> Self {
        Self {
            metrics: None,
            distribution: Vec::new(),
            top_queries: Vec::new(),
            pattern_count: 0,
            pg_stat_statements: None,
            timeline: ChartSeries::new(panels.timeline_window, &TIMELINE_SERIES),
        }
    }
}

impl Panel for QueriesPanel {
    const NAME: &'static str = "queries";
    const SLOTS: &'static [&'static str] = &[
        "total_queries",
        "slow_queries",
        "avg_exec_time",
        "query_types",
        "top_queries",
        "patterns",
        "timeline",
        "pg_stat_statements",
    ];

    async fn refresh(&mut self, ctx: &RefreshContext) -> Result<Refreshed, ApiError> {
        let stats = ctx.client.query_statistics().await?;
        let metrics = query_metrics(&stats);

        if let Some(avg_ms) = metrics.avg_exec_ms {
            self.timeline.push_row(
                ctx.now.format(CHART_LABEL_FORMAT).to_string(),
                &[("avg_ms", Some(avg_ms)), ("calls", Some(metrics.total_calls))],
            );
        }

        self.distribution = query_type_distribution(&stats.top_queries);
        self.pattern_count = stats.query_patterns.len();
        self.pg_stat_statements = Some(stats.pg_stat_statements);
        self.top_queries = stats.top_queries.into_iter().take(TOP_QUERIES_SHOWN).collect();
        self.metrics = Some(metrics);
        Ok(Refreshed::Complete)
    }

    fn render(&self, surface: &mut RenderSurface, _now: DateTime<Utc>) {
        let Some(metrics) = &self.metrics else {
            return;
        };

        surface.set("total_queries", format_thousands(metrics.total_queries));
        surface.set("slow_queries", format_thousands(metrics.slow_queries as f64));
        surface.set(
            "avg_exec_time",
            metrics
                .avg_exec_ms
                .map(|ms| format!("{ms}ms"))
                .unwrap_or_else(|| "no data".to_string()),
        );

        let types: Vec<String> = self
            .distribution
            .iter()
            .filter(|(_, calls)| *calls > 0.0)
            .map(|(kind, calls)| format!("{kind}={}", format_thousands(*calls)))
            .collect();
        surface.set("query_types", types.join(" "));

        let top: Vec<String> = self
            .top_queries
            .iter()
            .map(|row| {
                format!(
                    "{} calls, {}ms avg: {}",
                    format_thousands(row.calls.unwrap_or(0.0)),
                    row.mean_exec_time.unwrap_or(0.0).round() as i64,
                    truncate_text(row.query.as_deref().unwrap_or_default().trim(), QUERY_PREVIEW_CHARS)
                )
            })
            .collect();
        surface.set("top_queries", top.join("\n"));
        surface.set("patterns", self.pattern_count.to_string());

        surface.set("timeline", self.timeline.render_window());

        if self.pg_stat_statements == Some(false) {
            surface.set("pg_stat_statements", "extension not installed");
        }
    }

    fn apply(&mut self, action: PanelAction) -> Result<ActionOutcome, String> {
        match action {
            PanelAction::ClearCharts => {
                self.timeline.clear();
                Ok(ActionOutcome::done("Charts cleared"))
            }
            other => Err(format!("The queries panel does not support {other:?}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::QueriesPanel;
    use crate::config::Panels;
    use crate::panels::test_support::{context, render};
    use crate::panels::{Panel, PanelAction};

    async fn server_with(body: serde_json::Value) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/query_statistics"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "data": body
            })))
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn renders_distribution_and_timeline() {
        let server = server_with(json!({
            "summary": {"total_queries": 123456},
            "top_queries": [
                {"query": "SELECT * FROM users WHERE id = $1", "calls": 900, "mean_exec_time": 2.4},
                {"query": "update accounts set balance = $1", "calls": 100, "mean_exec_time": 7.6},
                {"query": "VACUUM ANALYZE", "calls": 0}
            ],
            "slow_queries": [{"query": "SELECT pg_sleep(3)", "mean_exec_time": 3000}],
            "query_patterns": [{"query": "SELECT"}],
            "pg_stat_statements": true
        }))
        .await;

        let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let (ctx, _rx) = context(&server.uri(), now);
        let mut panel = QueriesPanel::new(&Panels::default());
        panel.refresh(&ctx).await.expect("refresh should succeed");

        let surface = render(&panel, now);
        assert_eq!(surface.get("total_queries"), Some("123,456"));
        assert_eq!(surface.get("slow_queries"), Some("1"));
        assert_eq!(surface.get("avg_exec_time"), Some("3ms"));
        assert_eq!(surface.get("query_types"), Some("SELECT=900 UPDATE=100 OTHER=1"));
        assert_eq!(
            surface.get("timeline"),
            Some("12:00:00..12:00:00 (1 points)\navg_ms ▄ last=3 min=3 max=3\ncalls ▄ last=1000 min=1000 max=1000")
        );
        assert_eq!(surface.get("pg_stat_statements"), Some(""));
        assert!(
            surface
                .get("top_queries")
                .unwrap_or_default()
                .starts_with("900 calls, 2ms avg: SELECT * FROM users")
        );
    }

    #[tokio::test]
    async fn empty_statistics_leave_timeline_untouched() {
        let server = server_with(json!({"pg_stat_statements": false})).await;

        let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let (ctx, _rx) = context(&server.uri(), now);
        let mut panel = QueriesPanel::new(&Panels::default());
        panel.refresh(&ctx).await.expect("refresh should succeed");

        let surface = render(&panel, now);
        assert_eq!(surface.get("avg_exec_time"), Some("no data"));
        assert_eq!(surface.get("timeline"), Some(""));
        assert_eq!(surface.get("pg_stat_statements"), Some("extension not installed"));
        assert!(panel.apply(PanelAction::ClearCharts).is_ok());
        assert!(panel.apply(PanelAction::DismissAlert(1)).is_err());
    }
}
