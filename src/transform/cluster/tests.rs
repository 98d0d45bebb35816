use serde_json::json;

use super::*;

fn component(name: &str, status: &str, response_time_ms: Option<f64>) -> Component {
    Component {
        name: name.to_string(),
        status: status.to_string(),
        response_time_ms,
        ..Component::default()
    }
}

fn record(component: &str, status: &str, ms: f64, timestamp: &str) -> HistoryRecord {
    HistoryRecord {
        component: component.to_string(),
        status: status.to_string(),
        response_time_ms: Some(ms),
        timestamp: timestamp.to_string(),
        ..HistoryRecord::default()
    }
}

#[test]
fn availability_is_rounded_share_or_full_when_empty() {
    for total in 0..=12usize {
        for online in 0..=total {
            let expected = if total == 0 {
                100
            } else {
                (100.0 * online as f64 / total as f64).round() as u32
            };
            assert_eq!(availability_percent(online, total), expected);
        }
    }
    assert_eq!(availability_percent(2, 3), 67);
    assert_eq!(availability_percent(1, 3), 33);
}

#[test]
fn warning_count_includes_errors_and_slow_components() {
    let status: ClusterStatus = serde_json::from_value(json!({
        "cluster_health": 66.7,
        "components": [
            {"name": "pg-master", "status": "online", "response_time_ms": 12},
            {"name": "pg-replica", "status": "online", "response_time_ms": 1500},
            {"name": "pgpool", "status": "error", "response_time_ms": null}
        ],
        "summary": {"online_components": 2, "offline_components": 1}
    }))
    .expect("status should decode");

    let overview = cluster_overview(&status);
    assert_eq!(overview.warnings, 2);
    assert_eq!(overview.health_score, 67);
    assert_eq!(overview.tone, HealthTone::Poor);
    assert_eq!(overview.online, 2);
    assert!((overview.avg_response_ms - 504.0).abs() < 1e-9);
}

#[test]
fn healthy_cluster_has_no_warnings() {
    let components = vec![
        component("pg-master", "online", Some(1000.0)),
        component("pgpool", "offline", Some(3.0)),
    ];
    assert_eq!(warning_count(&components), 0);
    assert_eq!(average_response_ms(&[]), 0.0);
}

#[test]
fn health_tone_thresholds() {
    assert_eq!(HealthTone::from_score(90), HealthTone::Good);
    assert_eq!(HealthTone::from_score(89), HealthTone::Degraded);
    assert_eq!(HealthTone::from_score(70), HealthTone::Degraded);
    assert_eq!(HealthTone::from_score(69).as_str(), "poor");
}

#[test]
fn event_filter_matches_exact_severity() {
    let events: Vec<ClusterEvent> = ["info", "error", "warning", "error"]
        .iter()
        .map(|severity| ClusterEvent {
            severity: severity.to_string(),
            ..ClusterEvent::default()
        })
        .collect();

    assert_eq!(filter_events(&events, &EventFilter::All).len(), 4);
    assert_eq!(filter_events(&events, &EventFilter::parse("ERROR")).len(), 2);
    assert_eq!(filter_events(&events, &EventFilter::parse("critical")).len(), 0);
    assert_eq!(EventFilter::parse(" all ").as_str(), "all");
}

#[test]
fn component_availability_per_tracked_component() {
    let history = vec![
        record("pg-master", "online", 1.0, "2024-01-01T05:00:00"),
        record("pg-master", "offline", 1.0, "2024-01-01T05:00:30"),
        record("pg-master", "online", 1.0, "2024-01-01T05:01:00"),
        record("pgpool", "error", 1.0, "2024-01-01T05:00:00"),
        record("other", "online", 1.0, "2024-01-01T05:00:00"),
    ];

    assert_eq!(
        component_availability(&history),
        vec![("pg-master", 67), ("pg-replica", 100), ("pgpool", 0)]
    );
}

#[test]
fn response_rows_group_by_time_with_gaps() {
    let history = vec![
        record("pg-master", "online", 10.0, "2024-01-01 05:00:00"),
        record("pgpool", "online", 3.0, "2024-01-01 05:00:00"),
        record("pg-replica", "online", 20.0, "2024-01-01 05:00:30"),
    ];

    let rows = response_time_rows(&history, 20);
    assert_eq!(
        rows,
        vec![
            ("05:00:00".to_string(), vec![Some(10.0), None, Some(3.0)]),
            ("05:00:30".to_string(), vec![None, Some(20.0), None]),
        ]
    );
}

#[test]
fn response_rows_keep_newest_points() {
    let history: Vec<HistoryRecord> = (0..30)
        .map(|second| {
            record(
                "pgpool",
                "online",
                second as f64,
                &format!("2024-01-01T05:00:{second:02}"),
            )
        })
        .collect();

    let rows = response_time_rows(&history, 20);
    assert_eq!(rows.len(), 20);
    assert_eq!(rows[0].0, "05:00:10");
    assert_eq!(rows[19].1[2], Some(29.0));
}
