use chrono::{TimeZone, Utc};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::InsightsPanel;
use crate::config::Panels;
use crate::panels::test_support::{context, render};
use crate::panels::{Panel, PanelAction, Refreshed};

async fn mount(server: &MockServer, endpoint: &str, data: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(endpoint))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "data": data
        })))
        .mount(server)
        .await;
}

async fn mount_insights(server: &MockServer) {
    mount(
        server,
        "/api/performance_insights",
        json!([
            {"type": "maintenance", "severity": "high",
             "message": "Found 1 tables with significant bloat (>20% dead tuples)",
             "recommendation": "Consider running VACUUM on these tables"},
            {"type": "index", "severity": "medium",
             "message": "Found 4 columns with poor correlation that might benefit from indexes"}
        ]),
    )
    .await;
}

async fn mount_queries(server: &MockServer) {
    mount(
        server,
        "/api/query_statistics",
        json!({
            "slow_queries": [
                {"query": "SELECT * FROM orders WHERE note LIKE $1", "calls": 40, "mean_exec_time": 1800.4},
                {"query": "SELECT pg_sleep($1)", "calls": 2, "mean_exec_time": 3000}
            ],
            "pg_stat_statements": true
        }),
    )
    .await;
}

async fn mount_database(server: &MockServer) {
    mount(
        server,
        "/api/database_statistics",
        json!({
            "database": {"database_size_pretty": "8225 kB", "table_count": 4, "index_count": 6},
            "tables": [{"schemaname": "public", "tablename": "orders", "total_size": "1200 kB",
                        "live_tuples": 1000, "dead_tuples": 250}],
            "indexes": [
                {"indexrelname": "orders_note_idx", "usage_status": "UNUSED"},
                {"indexrelname": "orders_pkey", "usage_status": "ACTIVE"}
            ],
            "cache": {"cache_hit_ratio": "98.76"},
            "connections": {"total_connections": 7, "active_connections": 2, "idle_connections": 5,
                            "idle_in_transaction": 0, "waiting_connections": 1},
            "locks": [{"mode": "AccessShareLock", "count": 3}, {"mode": "ExclusiveLock", "count": 1}]
        }),
    )
    .await;
}

#[tokio::test]
async fn renders_scores_issues_and_database_figures() {
    let server = MockServer::start().await;
    mount_insights(&server).await;
    mount_queries(&server).await;
    mount_database(&server).await;

    let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
    let (ctx, _rx) = context(&server.uri(), now);
    let mut panel = InsightsPanel::new(&Panels::default());
    assert!(matches!(panel.refresh(&ctx).await, Ok(Refreshed::Complete)));

    let surface = render(&panel, now);
    assert_eq!(surface.get("health_score"), Some("75 (fair)"));
    assert_eq!(surface.get("optimization_score"), Some("80 (good)"));
    assert_eq!(surface.get("issues"), Some("2"));
    assert_eq!(surface.get("recommendations_count"), Some("4"));
    assert_eq!(
        surface.get("issue_list"),
        Some(
            "🔴 Found 1 tables with significant bloat (>20% dead tuples)\n   \
             Consider running VACUUM on these tables\n\
             🟡 Found 4 columns with poor correlation that might benefit from indexes\n   \
             Review this issue for potential optimization opportunities."
        )
    );
    assert!(
        surface
            .get("recommendations")
            .unwrap_or_default()
            .starts_with(
                "[high] Critical: Found 1 tables with significant bloat (>20% dead tuples): \
                 Consider running VACUUM on these tables\n[high] Run Database Maintenance"
            )
    );
    assert_eq!(surface.get("recommendations").unwrap_or_default().lines().count(), 5);
    assert_eq!(
        surface.get("optimizations"),
        Some(
            "3000ms avg, 2 calls: SELECT pg_sleep($1)\n\
             1800ms avg, 40 calls: SELECT * FROM orders WHERE note LIKE $1"
        )
    );
    assert_eq!(surface.get("database"), Some("8225 kB, 4 tables, 6 indexes"));
    assert_eq!(surface.get("tables"), Some("public.orders 1200 kB live=1,000 dead=250"));
    assert_eq!(surface.get("unused_indexes"), Some("1 of 2"));
    assert_eq!(surface.get("cache_hit_ratio"), Some("98.8%"));
    assert_eq!(
        surface.get("connections"),
        Some("total 7, active 2, idle 5, idle in transaction 0, waiting 1")
    );
    assert_eq!(surface.get("locks"), Some("AccessShareLock=3 ExclusiveLock=1"));
    assert_eq!(
        surface.get("score_history"),
        Some("12:00:00..12:00:00 (1 points)\nhealth ▄ last=75 min=75 max=75\noptimization ▄ last=80 min=80 max=80")
    );
    assert!(
        surface
            .get("database_trend")
            .unwrap_or_default()
            .contains("cache_hit_ratio ▄ last=98.76")
    );
}

#[tokio::test]
async fn no_findings_render_all_clear() {
    let server = MockServer::start().await;
    mount(&server, "/api/performance_insights", json!([])).await;
    mount(&server, "/api/query_statistics", json!({"pg_stat_statements": false})).await;
    mount(&server, "/api/database_statistics", json!({})).await;

    let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
    let (ctx, _rx) = context(&server.uri(), now);
    let mut panel = InsightsPanel::new(&Panels::default());
    panel.refresh(&ctx).await.expect("refresh should succeed");

    let surface = render(&panel, now);
    assert_eq!(surface.get("health_score"), Some("100 (good)"));
    assert_eq!(surface.get("optimization_score"), Some("100 (good)"));
    assert_eq!(surface.get("recommendations_count"), Some("2"));
    assert_eq!(surface.get("issue_list"), Some("✅ No Critical Issues Found"));
    assert_eq!(
        surface.get("optimizations"),
        Some("No optimization opportunities found")
    );
    assert_eq!(surface.get("cache_hit_ratio"), Some("-"));
}

#[tokio::test]
async fn missing_database_statistics_is_partial() {
    let server = MockServer::start().await;
    mount_insights(&server).await;
    mount_queries(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/database_statistics"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
    let (ctx, _rx) = context(&server.uri(), now);
    let mut panel = InsightsPanel::new(&Panels::default());

    assert!(matches!(
        panel.refresh(&ctx).await,
        Ok(Refreshed::Partial(_))
    ));
    let surface = render(&panel, now);
    assert_eq!(surface.get("issues"), Some("2"));
    assert_eq!(surface.get("database"), Some(""));
    assert_eq!(surface.get("database_trend"), Some(""));
}

#[tokio::test]
async fn failed_findings_fail_the_refresh() {
    let server = MockServer::start().await;
    mount_queries(&server).await;
    mount_database(&server).await;

    let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
    let (ctx, _rx) = context(&server.uri(), now);
    let mut panel = InsightsPanel::new(&Panels::default());

    assert!(panel.refresh(&ctx).await.is_err());
    assert_eq!(render(&panel, now).get("health_score"), Some(""));
    assert_eq!(render(&panel, now).get("score_history"), Some(""));

    panel.apply(PanelAction::ClearCharts).expect("clear is supported");
    assert!(panel.apply(PanelAction::DismissAlert(1)).is_err());
}
