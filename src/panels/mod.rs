use std::future::Future;

use chrono::{DateTime, Utc};

use crate::api::{ApiClient, ApiError};
use crate::config::RuntimeConfig;
use crate::dashboard::{NotificationSink, RenderSurface};
use crate::transform::cluster::EventFilter;

mod cluster;
mod insights;
mod nodes;
mod performance;
mod queries;
mod task;

#[cfg(test)]
mod test_support;

pub use cluster::{ClusterPanel, TIME_RANGES_HOURS};
pub use insights::InsightsPanel;
pub use nodes::NodesPanel;
pub use performance::PerformancePanel;
pub use queries::QueriesPanel;
pub use task::{PanelCommand, PanelDeps, PanelRequest, PanelTask};

/// Label format of the live chart x axis.
pub(crate) const CHART_LABEL_FORMAT: &str = "%H:%M:%S";

/// Everything a panel may use while refreshing. Built fresh for every poll
/// so a config reload is picked up on the next tick.
pub struct RefreshContext {
    pub client: ApiClient,
    pub runtime: RuntimeConfig,
    pub notifications: NotificationSink,
    pub now: DateTime<Utc>,
}

/// Operator actions routed to the panel that owns the affected state.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelAction {
    SetTimeRange(u32),
    FilterEvents(EventFilter),
    DismissAlert(u64),
    ClearCharts,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActionOutcome {
    pub message: String,
    /// Whether the panel must poll again for the change to show.
    pub refetch: bool,
}

impl ActionOutcome {
    pub fn done(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            refetch: false,
        }
    }

    pub fn refetch(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            refetch: true,
        }
    }
}

/// What a refresh that got any data did to the panel state.
#[derive(Debug)]
pub enum Refreshed {
    Complete,
    /// Part of the state was updated; carries the first fetch that failed.
    Partial(ApiError),
}

/// One dashboard page: owned state, a fetch step, and a pure render step.
pub trait Panel: Send + 'static {
    const NAME: &'static str;
    const SLOTS: &'static [&'static str];

    /// Fetches and folds new data into the panel state. On error the
    /// previous state must stay renderable; a partial update is published
    /// and its failure reported.
    fn refresh(
        &mut self,
        ctx: &RefreshContext,
    ) -> impl Future<Output = Result<Refreshed, ApiError>> + Send;

    fn render(&self, surface: &mut RenderSurface, now: DateTime<Utc>);

    fn apply(&mut self, action: PanelAction) -> Result<ActionOutcome, String> {
        Err(format!("{} panel does not support {:?}", Self::NAME, action))
    }
}

pub(crate) fn or_dash(value: Option<String>) -> String {
    value.unwrap_or_else(|| "-".to_string())
}
