use chrono::{DateTime, Utc};

use super::{
    ActionOutcome, CHART_LABEL_FORMAT, Panel, PanelAction, RefreshContext, Refreshed, or_dash,
};
use crate::api::{ApiError, PoolNode};
use crate::config::Panels;
use crate::dashboard::{ChartSeries, RenderSurface};
use crate::transform::format::format_thousands;
use crate::transform::nodes::{NodesOverview, nodes_overview};

const SERIES: [&str; 3] = ["connections", "primary_selects", "replication_delay"];

pub struct NodesPanel {
    overview: Option<NodesOverview>,
    nodes: Vec<PoolNode>,
    chart: ChartSeries,
}

impl NodesPanel {
    pub fn new(panels: &Panels) -> Self {
        Self {
            overview: None,
            nodes: Vec::new(),
            chart: ChartSeries::new(panels.timeline_window, &SERIES),
        }
    }
}

impl Panel for NodesPanel {
    const NAME: &'static str = "nodes";
    const SLOTS: &'static [&'static str] = &[
        "node_count",
        "active_connections",
        "primary_selects",
        "standby_selects",
        "replication_delay",
        "nodes",
        "chart",
    ];

    async fn refresh(&mut self, ctx: &RefreshContext) -> Result<Refreshed, ApiError> {
        let (nodes, processes) =
            tokio::join!(ctx.client.pool_nodes(), ctx.client.pool_processes());
        let (nodes, processes) = (nodes?, processes?);

        let overview = nodes_overview(&nodes, &processes);
        self.chart.push_row(
            ctx.now.format(CHART_LABEL_FORMAT).to_string(),
            &[
                ("connections", Some(overview.active_connections as f64)),
                ("primary_selects", Some(overview.primary_select_count)),
                ("replication_delay", overview.max_replication_delay),
            ],
        );

        self.overview = Some(overview);
        self.nodes = nodes;
        Ok(Refreshed::Complete)
    }

    fn render(&self, surface: &mut RenderSurface, _now: DateTime<Utc>) {
        let Some(overview) = &self.overview else {
            return;
        };

        surface.set("node_count", overview.node_count.to_string());
        surface.set("active_connections", overview.active_connections.to_string());
        surface.set(
            "primary_selects",
            format_thousands(overview.primary_select_count),
        );
        surface.set(
            "standby_selects",
            format_thousands(overview.standby_select_count),
        );
        surface.set(
            "replication_delay",
            or_dash(overview.max_replication_delay.map(format_thousands)),
        );

        let lines: Vec<String> = self
            .nodes
            .iter()
            .map(|node| {
                format!(
                    "#{} {}:{} {} {}",
                    node.node_id.as_deref().unwrap_or("?"),
                    node.hostname.as_deref().unwrap_or("?"),
                    node.port.as_deref().unwrap_or("?"),
                    node.role.as_deref().unwrap_or("unknown"),
                    node.status.as_deref().unwrap_or("unknown"),
                )
            })
            .collect();
        surface.set("nodes", lines.join("\n"));
        surface.set("chart", self.chart.render_window());
    }

    fn apply(&mut self, action: PanelAction) -> Result<ActionOutcome, String> {
        match action {
            PanelAction::ClearCharts => {
                self.chart.clear();
                Ok(ActionOutcome::done("Charts cleared"))
            }
            other => Err(format!("The nodes panel does not support {other:?}")),
        }
    }
}
