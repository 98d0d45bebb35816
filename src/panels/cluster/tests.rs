use chrono::{TimeZone, Utc};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::ClusterPanel;
use crate::config::Panels;
use crate::dashboard::{NotificationKind, PollTask};
use crate::panels::test_support::{context, deps, render};
use crate::panels::{Panel, PanelAction, PanelTask, Refreshed};
use crate::transform::cluster::EventFilter;

async fn mount_cluster(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/cluster_status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "data": {
                "cluster_health": 92.4,
                "components": [
                    {"name": "pg-master", "type": "postgresql", "status": "online", "response_time_ms": 12},
                    {"name": "pg-replica", "type": "postgresql", "status": "online", "response_time_ms": 20},
                    {"name": "pgpool", "type": "pgpool", "status": "error", "response_time_ms": 400,
                     "error_message": "connection refused"}
                ],
                "recent_events": [
                    {"type": "status_change", "component": "pgpool", "severity": "error",
                     "message": "pgpool went offline", "timestamp": "2024-01-01T11:55:00"},
                    {"type": "status_change", "component": "pg-master", "severity": "info",
                     "message": "pg-master is back", "timestamp": "2024-01-01T11:00:00"}
                ],
                "summary": {"total_components": 3, "online_components": 2,
                            "offline_components": 1, "last_check": "2024-01-01T11:59:40"}
            }
        })))
        .mount(server)
        .await;
}

async fn mount_history(server: &MockServer, hours: &str) {
    Mock::given(method("GET"))
        .and(path("/api/cluster_history"))
        .and(query_param("hours", hours))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "data": [
                {"component": "pg-master", "status": "online", "response_time_ms": 10, "timestamp": "2024-01-01T11:13:00Z"},
                {"component": "pgpool", "status": "error", "response_time_ms": 900, "timestamp": "2024-01-01T11:13:00Z"},
                {"component": "pg-master", "status": "offline", "response_time_ms": 15, "timestamp": "2024-01-01T11:47:00Z"}
            ]
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn renders_overview_from_mocked_cluster() {
    let server = MockServer::start().await;
    mount_cluster(&server).await;
    mount_history(&server, "1").await;

    let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
    let (ctx, _rx) = context(&server.uri(), now);
    let mut panel = ClusterPanel::new(&Panels::default());
    panel.refresh(&ctx).await.expect("refresh should succeed");

    let surface = render(&panel, now);
    assert_eq!(surface.get("warnings"), Some("1"));
    assert_eq!(surface.get("health"), Some("92% (good)"));
    assert_eq!(surface.get("avg_response"), Some("144ms"));
    assert_eq!(surface.get("last_check"), Some("Just now"));
    assert_eq!(
        surface.get("availability"),
        Some("pg-master 50% | pg-replica 100% | pgpool 0%")
    );
    assert_eq!(
        surface.get("response_times"),
        Some(
            "11:13:00..11:47:00 (2 points)\n\
             pg-master ▁█ last=15 min=10 max=15\n\
             pg-replica no data\n\
             pgpool ▄· last=900 min=900 max=900"
        )
    );
    assert!(surface.get("events").unwrap_or_default().contains("pgpool went offline"));
    assert!(
        surface
            .get("components")
            .unwrap_or_default()
            .contains("pgpool [ERROR] pgpool 400ms")
    );
}

#[tokio::test]
async fn render_is_idempotent() {
    let server = MockServer::start().await;
    mount_cluster(&server).await;
    mount_history(&server, "1").await;

    let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
    let (ctx, _rx) = context(&server.uri(), now);
    let mut panel = ClusterPanel::new(&Panels::default());
    panel.refresh(&ctx).await.expect("refresh should succeed");

    assert_eq!(render(&panel, now), render(&panel, now));
}

#[tokio::test]
async fn failed_history_keeps_status_and_reports_error() {
    let server = MockServer::start().await;
    mount_cluster(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/cluster_history"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
    let (ctx, _rx) = context(&server.uri(), now);
    let mut panel = ClusterPanel::new(&Panels::default());

    assert!(matches!(
        panel.refresh(&ctx).await,
        Ok(Refreshed::Partial(_))
    ));
    let surface = render(&panel, now);
    assert_eq!(surface.get("warnings"), Some("1"));
    assert_eq!(surface.get("availability"), Some(""));
}

#[tokio::test]
async fn partial_tick_publishes_status_and_reports_history_failure() {
    let server = MockServer::start().await;
    mount_cluster(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/cluster_history"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let (deps, mut rx) = deps(&server.uri());
    let (mut task, frames) = PanelTask::new(ClusterPanel::new(&Panels::default()), deps);
    task.tick().await;

    let frame = frames.borrow().clone();
    assert!(frame.rendered_at.is_some());
    assert_eq!(frame.surface.get("warnings"), Some("1"));
    assert_eq!(frame.surface.get("health"), Some("92% (good)"));

    let notification = rx.recv().await.expect("history failure notification");
    assert_eq!(notification.kind, NotificationKind::Error);
    assert!(notification.message.contains("status: 500"));
}

#[tokio::test]
async fn total_failure_publishes_nothing() {
    let server = MockServer::start().await;
    let (deps, _rx) = deps(&server.uri());
    let (mut task, frames) = PanelTask::new(ClusterPanel::new(&Panels::default()), deps);
    task.tick().await;

    assert!(frames.borrow().rendered_at.is_none());
}

#[tokio::test]
async fn timeline_lists_quiet_hours_as_zero() {
    let server = MockServer::start().await;
    mount_cluster(&server).await;
    mount_history(&server, "6").await;

    let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
    let (ctx, _rx) = context(&server.uri(), now);
    let mut panel = ClusterPanel::new(&Panels::default());
    panel
        .apply(PanelAction::SetTimeRange(6))
        .expect("6h is a supported range");
    panel.refresh(&ctx).await.expect("refresh with 6h range");

    assert_eq!(
        render(&panel, now).get("status_timeline"),
        Some(
            "07:00 online=0 offline=0 error=0\n\
             08:00 online=0 offline=0 error=0\n\
             09:00 online=0 offline=0 error=0\n\
             10:00 online=0 offline=0 error=0\n\
             11:00 online=1 offline=1 error=1\n\
             12:00 online=0 offline=0 error=0"
        )
    );
}

#[tokio::test]
async fn time_range_and_filter_actions() {
    let server = MockServer::start().await;
    mount_cluster(&server).await;
    mount_history(&server, "24").await;

    let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
    let (ctx, _rx) = context(&server.uri(), now);
    let mut panel = ClusterPanel::new(&Panels::default());

    assert!(panel.apply(PanelAction::SetTimeRange(5)).is_err());
    let outcome = panel
        .apply(PanelAction::SetTimeRange(24))
        .expect("24h is a supported range");
    assert!(outcome.refetch);

    panel.refresh(&ctx).await.expect("refresh with 24h range");
    let surface = render(&panel, now);
    assert_eq!(surface.get("time_range"), Some("24h"));
    let timeline = surface.get("status_timeline").unwrap_or_default();
    assert_eq!(timeline.lines().count(), 24);
    assert!(timeline.contains("11:00 online=1 offline=1 error=1"));
    assert!(timeline.contains("10:00 online=0 offline=0 error=0"));

    let outcome = panel
        .apply(PanelAction::FilterEvents(EventFilter::parse("info")))
        .expect("filter is supported");
    assert!(!outcome.refetch);
    let events = render(&panel, now).get("events").unwrap_or_default().to_string();
    assert!(events.contains("pg-master is back"));
    assert!(!events.contains("pgpool went offline"));

    panel
        .apply(PanelAction::FilterEvents(EventFilter::parse("critical")))
        .expect("filter is supported");
    assert_eq!(render(&panel, now).get("events"), Some("No critical events"));

    assert!(panel.apply(PanelAction::DismissAlert(1)).is_err());
}
