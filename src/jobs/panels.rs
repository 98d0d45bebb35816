use std::time::Duration;

use tokio::sync::mpsc;

use crate::app_context::PanelHandle;
use crate::config::Config;
use crate::dashboard::Poller;
use crate::panels::{
    ClusterPanel, InsightsPanel, NodesPanel, Panel, PanelDeps, PanelTask, PerformancePanel,
    QueriesPanel,
};

const COMMAND_QUEUE: usize = 16;

/// Pollers of every started panel; dropping this does not stop them.
pub struct RunningPanels {
    pollers: Vec<Poller>,
}

impl RunningPanels {
    pub fn names(&self) -> Vec<&'static str> {
        self.pollers.iter().map(Poller::name).collect()
    }

    pub async fn stop_all(&mut self) {
        for poller in &mut self.pollers {
            poller.stop().await;
        }
    }
}

pub fn start_panel_pollers(config: &Config, deps: &PanelDeps) -> (RunningPanels, Vec<PanelHandle>) {
    let panels = &config.panels;
    let started = [
        spawn_panel(ClusterPanel::new(panels), panels.cluster_interval_secs, deps),
        spawn_panel(
            PerformancePanel::new(panels, config.alerts.feed_capacity, config.alerts.visible),
            panels.performance_interval_secs,
            deps,
        ),
        spawn_panel(QueriesPanel::new(panels), panels.queries_interval_secs, deps),
        spawn_panel(NodesPanel::new(panels), panels.nodes_interval_secs, deps),
        spawn_panel(
            InsightsPanel::new(panels),
            panels.insights_interval_secs,
            deps,
        ),
    ];

    let (handles, pollers): (Vec<PanelHandle>, Vec<Poller>) = started.into_iter().unzip();
    (RunningPanels { pollers }, handles)
}

fn spawn_panel<P: Panel>(panel: P, interval_secs: u64, deps: &PanelDeps) -> (PanelHandle, Poller) {
    let (task, frames) = PanelTask::new(panel, deps.clone());
    let (commands, commands_rx) = mpsc::channel(COMMAND_QUEUE);

    let mut poller = Poller::new(P::NAME);
    poller.start(Duration::from_secs(interval_secs), task, commands_rx);

    (
        PanelHandle {
            name: P::NAME,
            commands,
            frames,
        },
        poller,
    )
}
