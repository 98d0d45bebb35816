use teloxide::prelude::*;

use crate::app_context::AppContext;
use crate::dashboard::{Direction, ThresholdTable};

use super::super::helpers::send_html;

const ALERTS_SLOT: &str = "alerts";

pub(crate) async fn handle_alerts(
    bot: &Bot,
    msg: &Message,
    app_context: &AppContext,
) -> ResponseResult<()> {
    let runtime_config = app_context.runtime_config.read().await.clone();
    let feed = app_context
        .panel("performance")
        .and_then(|panel| panel.frame().surface.get(ALERTS_SLOT).map(str::to_string))
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| "No active alerts".to_string());

    let body = format!(
        "Recent alerts (newest first, showing up to {} of {}):\n{}\n\nThresholds:\n{}",
        runtime_config.alerts.visible,
        runtime_config.alerts.feed_capacity,
        feed,
        format_thresholds(&runtime_config.thresholds)
    );
    send_html(bot, msg.chat.id, "Performance alerts", &body).await
}

fn format_thresholds(table: &ThresholdTable) -> String {
    table
        .iter()
        .map(|(metric, pair)| {
            let op = match pair.direction {
                Direction::HigherIsWorse => ">",
                Direction::LowerIsWorse => "<",
            };
            format!(
                "- {}: warning {} {}, critical {} {}",
                metric, op, pair.warning, op, pair.critical
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::format_thresholds;
    use crate::dashboard::{ThresholdPair, ThresholdTable};

    #[test]
    fn inverted_metrics_are_shown_with_lower_bound() {
        let table = ThresholdTable::default();
        let text = format_thresholds(&table);
        assert!(text.contains("- cacheHitRate: warning < 90, critical < 80"));
        assert!(text.contains("- cpu: warning > 70, critical > 90"));
    }

    #[test]
    fn overrides_replace_defaults() {
        let mut overrides = BTreeMap::new();
        overrides.insert("cpu".to_string(), ThresholdPair::higher_is_worse(50.0, 60.0));
        let text = format_thresholds(&ThresholdTable::with_overrides(&overrides));
        assert!(text.contains("- cpu: warning > 50, critical > 60"));
    }
}
