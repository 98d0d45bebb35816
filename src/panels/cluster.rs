use chrono::{DateTime, Utc};

use super::{ActionOutcome, Panel, PanelAction, RefreshContext, Refreshed, or_dash};
use crate::api::{ApiError, ClusterEvent, Component, HistoryRecord, parse_timestamp};
use crate::config::Panels;
use crate::dashboard::{ChartSeries, RenderSurface};
use crate::transform::cluster::{
    ClusterOverview, EventFilter, TRACKED_COMPONENTS, cluster_overview, component_availability,
    filter_events, response_time_rows,
};
use crate::transform::format::relative_age;
use crate::transform::history::{HourBucket, bucket_by_hour};

/// Ranges offered by the time-range selector.
pub const TIME_RANGES_HOURS: [u32; 4] = [1, 6, 24, 168];

const TIMELINE_STATUSES: [&str; 3] = ["online", "offline", "error"];
const MAX_TIMELINE_BUCKETS: u32 = 24;

pub struct ClusterPanel {
    time_range_hours: u32,
    filter: EventFilter,
    overview: Option<ClusterOverview>,
    components: Vec<Component>,
    events: Vec<ClusterEvent>,
    last_check: Option<String>,
    response_times: ChartSeries,
    availability: Vec<(&'static str, u32)>,
    timeline: Vec<HourBucket>,
}

impl ClusterPanel {
    pub fn new(panels: &Panels) -> Self {
        Self {
            time_range_hours: panels.cluster_history_hours,
            filter: EventFilter::All,
            overview: None,
            components: Vec::new(),
            events: Vec::new(),
            last_check: None,
            response_times: ChartSeries::new(panels.timeline_window, &TRACKED_COMPONENTS),
            availability: Vec::new(),
            timeline: Vec::new(),
        }
    }

    fn apply_history(&mut self, history: &[HistoryRecord], now: DateTime<Utc>) {
        self.response_times
            .replace(response_time_rows(history, self.response_times.capacity()));
        self.availability = component_availability(history);

        let events = history.iter().filter_map(|record| {
            parse_timestamp(&record.timestamp).map(|at| (at, record.status.as_str()))
        });
        self.timeline = bucket_by_hour(
            events,
            &TIMELINE_STATUSES,
            now,
            self.time_range_hours.min(MAX_TIMELINE_BUCKETS),
        );
    }
}

impl Panel for ClusterPanel {
    const NAME: &'static str = "cluster";
    const SLOTS: &'static [&'static str] = &[
        "health",
        "online",
        "offline",
        "warnings",
        "avg_response",
        "last_check",
        "components",
        "event_filter",
        "events",
        "time_range",
        "response_times",
        "availability",
        "status_timeline",
    ];

    /// Status and history are fetched together; whichever succeeds is
    /// applied and the first failure is reported.
    async fn refresh(&mut self, ctx: &RefreshContext) -> Result<Refreshed, ApiError> {
        let (status, history) = tokio::join!(
            ctx.client.cluster_status(),
            ctx.client.cluster_history(self.time_range_hours)
        );

        let status_result = status.map(|status| {
            self.overview = Some(cluster_overview(&status));
            self.last_check = status.summary.last_check.clone();
            self.components = status.components;
            self.events = status.recent_events;
        });
        let history_result = history.map(|history| self.apply_history(&history, ctx.now));

        match (status_result, history_result) {
            (Ok(()), Ok(())) => Ok(Refreshed::Complete),
            (Err(error), Err(_)) => Err(error),
            (Err(error), Ok(())) | (Ok(()), Err(error)) => Ok(Refreshed::Partial(error)),
        }
    }

    fn render(&self, surface: &mut RenderSurface, now: DateTime<Utc>) {
        if let Some(overview) = &self.overview {
            surface.set(
                "health",
                format!("{}% ({})", overview.health_score, overview.tone.as_str()),
            );
            surface.set("online", overview.online.to_string());
            surface.set("offline", overview.offline.to_string());
            surface.set("warnings", overview.warnings.to_string());
            surface.set(
                "avg_response",
                format!("{}ms", overview.avg_response_ms.round() as i64),
            );
        }

        surface.set(
            "last_check",
            or_dash(
                self.last_check
                    .as_deref()
                    .and_then(parse_timestamp)
                    .map(|at| relative_age(at, now)),
            ),
        );

        if !self.components.is_empty() {
            let lines: Vec<String> = self
                .components
                .iter()
                .map(|component| render_component(component, now))
                .collect();
            surface.set("components", lines.join("\n"));
        }

        surface.set("event_filter", self.filter.as_str());
        surface.set("events", self.render_events(now));
        surface.set("time_range", format!("{}h", self.time_range_hours));
        surface.set("response_times", self.response_times.render_window());

        if !self.availability.is_empty() {
            let parts: Vec<String> = self
                .availability
                .iter()
                .map(|(name, percent)| format!("{name} {percent}%"))
                .collect();
            surface.set("availability", parts.join(" | "));
        }

        if !self.timeline.is_empty() {
            surface.set("status_timeline", render_timeline(&self.timeline));
        }
    }

    fn apply(&mut self, action: PanelAction) -> Result<ActionOutcome, String> {
        match action {
            PanelAction::SetTimeRange(hours) => {
                if !TIME_RANGES_HOURS.contains(&hours) {
                    return Err(format!(
                        "Unsupported time range {hours}h (choose one of 1, 6, 24, 168)"
                    ));
                }
                self.time_range_hours = hours;
                self.response_times.clear();
                Ok(ActionOutcome::refetch(format!(
                    "Time range changed to {hours} hour(s)"
                )))
            }
            PanelAction::FilterEvents(filter) => {
                let message = format!("Events filtered by: {}", filter.as_str());
                self.filter = filter;
                Ok(ActionOutcome::done(message))
            }
            PanelAction::ClearCharts => {
                self.response_times.clear();
                Ok(ActionOutcome::done("Charts cleared"))
            }
            PanelAction::DismissAlert(_) => {
                Err("The cluster panel has no alerts to dismiss".to_string())
            }
        }
    }
}

impl ClusterPanel {
    fn render_events(&self, now: DateTime<Utc>) -> String {
        if self.events.is_empty() {
            return "No recent events".to_string();
        }

        let visible = filter_events(&self.events, &self.filter);
        if visible.is_empty() {
            return format!("No {} events", self.filter.as_str());
        }

        visible
            .iter()
            .map(|event| {
                let age = or_dash(parse_timestamp(&event.timestamp).map(|at| relative_age(at, now)));
                format!(
                    "[{}] {}: {} ({})",
                    event.severity, event.component, event.message, age
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn render_component(component: &Component, now: DateTime<Utc>) -> String {
    let mut line = format!(
        "{} [{}] {} {}",
        component.name,
        component.status.to_uppercase(),
        component.kind,
        or_dash(component.response_time_ms.map(|ms| format!("{ms}ms"))),
    );

    if let Some(checked) = component.last_check.as_deref().and_then(parse_timestamp) {
        line.push_str(&format!(" checked {}", relative_age(checked, now)));
    }
    if let Some(error) = component
        .error_message
        .as_deref()
        .filter(|error| !error.is_empty())
    {
        line.push_str(&format!(" error: {error}"));
    }
    line
}

/// One line per hour of the range, oldest first; quiet hours show zeros.
fn render_timeline(buckets: &[HourBucket]) -> String {
    buckets
        .iter()
        .map(|bucket| {
            let counts: Vec<String> = TIMELINE_STATUSES
                .iter()
                .map(|status| format!("{status}={}", bucket.count(status)))
                .collect();
            format!("{} {}", bucket.label, counts.join(" "))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests;
