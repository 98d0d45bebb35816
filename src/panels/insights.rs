use chrono::{DateTime, Utc};

use super::{
    ActionOutcome, CHART_LABEL_FORMAT, Panel, PanelAction, RefreshContext, Refreshed, or_dash,
};
use crate::api::{ApiError, DatabaseStatistics, PerformanceInsight, QueryStatRow};
use crate::config::Panels;
use crate::dashboard::{ChartSeries, RenderSurface};
use crate::transform::format::{format_thousands, truncate_text};
use crate::transform::insights::{
    health_score, issue_lines, optimization_candidates, optimization_score, recommendations,
    recommendations_count, score_grade, unused_index_count,
};

const SCORE_SERIES: [&str; 2] = ["health", "optimization"];
const DATABASE_SERIES: [&str; 3] = ["cache_hit_ratio", "active_connections", "waiting_connections"];
const OPTIMIZATIONS_SHOWN: usize = 4;
const TABLES_SHOWN: usize = 5;
const QUERY_PREVIEW_CHARS: usize = 60;

pub struct InsightsPanel {
    insights: Option<Vec<PerformanceInsight>>,
    optimizations: Option<Vec<QueryStatRow>>,
    database: Option<DatabaseStatistics>,
    scores: ChartSeries,
    database_trend: ChartSeries,
}

impl InsightsPanel {
    pub fn new(panels: &Panels) -> Self {
        Self {
            insights: None,
            optimizations: None,
            database: None,
            scores: ChartSeries::new(panels.timeline_window, &SCORE_SERIES),
            database_trend: ChartSeries::new(panels.timeline_window, &DATABASE_SERIES),
        }
    }

    fn apply_database(&mut self, stats: DatabaseStatistics, label: String) {
        let connections = stats.connections.as_ref();
        self.database_trend.push_row(
            label,
            &[
                (
                    "cache_hit_ratio",
                    stats.cache.as_ref().and_then(|cache| cache.cache_hit_ratio),
                ),
                (
                    "active_connections",
                    connections.and_then(|connections| connections.active_connections),
                ),
                (
                    "waiting_connections",
                    connections.and_then(|connections| connections.waiting_connections),
                ),
            ],
        );
        self.database = Some(stats);
    }

    fn render_database(&self, surface: &mut RenderSurface, stats: &DatabaseStatistics) {
        if let Some(database) = &stats.database {
            surface.set(
                "database",
                format!(
                    "{}, {} tables, {} indexes",
                    database.database_size_pretty.as_deref().unwrap_or("-"),
                    or_dash(database.table_count.map(format_thousands)),
                    or_dash(database.index_count.map(format_thousands)),
                ),
            );
        }

        let tables: Vec<String> = stats
            .tables
            .iter()
            .take(TABLES_SHOWN)
            .map(|table| {
                format!(
                    "{}.{} {} live={} dead={}",
                    table.schemaname.as_deref().unwrap_or("?"),
                    table.tablename.as_deref().unwrap_or("?"),
                    table.total_size.as_deref().unwrap_or("-"),
                    or_dash(table.live_tuples.map(format_thousands)),
                    or_dash(table.dead_tuples.map(format_thousands)),
                )
            })
            .collect();
        surface.set("tables", tables.join("\n"));
        surface.set(
            "unused_indexes",
            format!("{} of {}", unused_index_count(stats), stats.indexes.len()),
        );
        surface.set(
            "cache_hit_ratio",
            or_dash(
                stats
                    .cache
                    .as_ref()
                    .and_then(|cache| cache.cache_hit_ratio)
                    .map(|ratio| format!("{ratio:.1}%")),
            ),
        );

        if let Some(connections) = &stats.connections {
            let count = |value: Option<f64>| or_dash(value.map(format_thousands));
            surface.set(
                "connections",
                format!(
                    "total {}, active {}, idle {}, idle in transaction {}, waiting {}",
                    count(connections.total_connections),
                    count(connections.active_connections),
                    count(connections.idle_connections),
                    count(connections.idle_in_transaction),
                    count(connections.waiting_connections),
                ),
            );
        }

        let locks: Vec<String> = stats
            .locks
            .iter()
            .map(|lock| format!("{}={}", lock.mode, or_dash(lock.count.map(format_thousands))))
            .collect();
        surface.set("locks", locks.join(" "));
    }
}

impl Panel for InsightsPanel {
    const NAME: &'static str = "insights";
    const SLOTS: &'static [&'static str] = &[
        "health_score",
        "optimization_score",
        "issues",
        "recommendations_count",
        "issue_list",
        "recommendations",
        "optimizations",
        "database",
        "tables",
        "unused_indexes",
        "cache_hit_ratio",
        "connections",
        "locks",
        "score_history",
        "database_trend",
    ];

    /// Findings drive every score, so they must load; query and database
    /// statistics are applied when they arrive.
    async fn refresh(&mut self, ctx: &RefreshContext) -> Result<Refreshed, ApiError> {
        let (insights, queries, database) = tokio::join!(
            ctx.client.performance_insights(),
            ctx.client.query_statistics(),
            ctx.client.database_statistics()
        );
        let insights = insights?;
        let label = ctx.now.format(CHART_LABEL_FORMAT).to_string();

        self.scores.push_row(
            label.clone(),
            &[
                ("health", Some(health_score(&insights) as f64)),
                ("optimization", Some(optimization_score(insights.len()) as f64)),
            ],
        );
        self.insights = Some(insights);

        let mut failure = None;
        match queries {
            Ok(stats) => {
                self.optimizations = Some(optimization_candidates(&stats, OPTIMIZATIONS_SHOWN));
            }
            Err(error) => failure = Some(error),
        }
        match database {
            Ok(stats) => self.apply_database(stats, label),
            Err(error) => failure = failure.or(Some(error)),
        }

        Ok(match failure {
            None => Refreshed::Complete,
            Some(error) => Refreshed::Partial(error),
        })
    }

    fn render(&self, surface: &mut RenderSurface, _now: DateTime<Utc>) {
        if let Some(insights) = &self.insights {
            let health = health_score(insights);
            let optimization = optimization_score(insights.len());
            surface.set("health_score", format!("{health} ({})", score_grade(health)));
            surface.set(
                "optimization_score",
                format!("{optimization} ({})", score_grade(optimization)),
            );
            surface.set("issues", insights.len().to_string());
            surface.set(
                "recommendations_count",
                recommendations_count(insights.len()).to_string(),
            );
            surface.set("issue_list", issue_lines(insights).join("\n"));

            let advice: Vec<String> = recommendations(insights)
                .iter()
                .map(|entry| {
                    format!(
                        "[{}] {}: {}",
                        entry.priority.as_str(),
                        entry.title,
                        entry.description
                    )
                })
                .collect();
            surface.set("recommendations", advice.join("\n"));
        }

        if let Some(optimizations) = &self.optimizations {
            let lines: Vec<String> = optimizations
                .iter()
                .map(|row| {
                    format!(
                        "{}ms avg, {} calls: {}",
                        row.mean_exec_time.unwrap_or(0.0).round() as i64,
                        format_thousands(row.calls.unwrap_or(0.0)),
                        truncate_text(
                            row.query.as_deref().unwrap_or_default().trim(),
                            QUERY_PREVIEW_CHARS
                        )
                    )
                })
                .collect();
            if lines.is_empty() {
                surface.set("optimizations", "No optimization opportunities found");
            } else {
                surface.set("optimizations", lines.join("\n"));
            }
        }

        if let Some(stats) = &self.database {
            self.render_database(surface, stats);
        }

        surface.set("score_history", self.scores.render_window());
        surface.set("database_trend", self.database_trend.render_window());
    }

    fn apply(&mut self, action: PanelAction) -> Result<ActionOutcome, String> {
        match action {
            PanelAction::ClearCharts => {
                self.scores.clear();
                self.database_trend.clear();
                Ok(ActionOutcome::done("Charts cleared"))
            }
            other => Err(format!("The insights panel does not support {other:?}")),
        }
    }
}

#[cfg(test)]
mod tests;
