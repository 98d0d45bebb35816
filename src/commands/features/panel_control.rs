use teloxide::prelude::*;

use crate::app_context::AppContext;
use crate::panels::{PanelAction, PanelRequest};

use super::super::helpers::{parse_alert_id, parse_event_filter, parse_time_range, send_html};

pub(crate) async fn handle_refresh(
    bot: &Bot,
    msg: &Message,
    app_context: &AppContext,
    panel: &str,
) -> ResponseResult<()> {
    match fan_out(app_context, panel, || PanelRequest::Refresh).await {
        Ok(results) => send_html(bot, msg.chat.id, "Refresh", &fan_out_summary(&results)).await,
        Err(error) => send_html(bot, msg.chat.id, "Refresh failed", &error).await,
    }
}

pub(crate) async fn handle_clear(
    bot: &Bot,
    msg: &Message,
    app_context: &AppContext,
    panel: &str,
) -> ResponseResult<()> {
    let request = || PanelRequest::Action(PanelAction::ClearCharts);
    match fan_out(app_context, panel, request).await {
        Ok(results) => send_html(bot, msg.chat.id, "Clear charts", &fan_out_summary(&results)).await,
        Err(error) => send_html(bot, msg.chat.id, "Clear charts failed", &error).await,
    }
}

pub(crate) async fn handle_range(
    bot: &Bot,
    msg: &Message,
    app_context: &AppContext,
    hours: &str,
) -> ResponseResult<()> {
    let outcome = match parse_time_range(hours) {
        Ok(hours) => {
            run_action(app_context, "cluster", PanelAction::SetTimeRange(hours)).await
        }
        Err(usage) => Err(usage),
    };
    reply(bot, msg, "Time range", outcome).await
}

pub(crate) async fn handle_filter(
    bot: &Bot,
    msg: &Message,
    app_context: &AppContext,
    severity: &str,
) -> ResponseResult<()> {
    let outcome = match parse_event_filter(severity) {
        Ok(filter) => run_action(app_context, "cluster", PanelAction::FilterEvents(filter)).await,
        Err(usage) => Err(usage),
    };
    reply(bot, msg, "Event filter", outcome).await
}

pub(crate) async fn handle_dismiss(
    bot: &Bot,
    msg: &Message,
    app_context: &AppContext,
    id: &str,
) -> ResponseResult<()> {
    let outcome = match parse_alert_id(id) {
        Ok(id) => run_action(app_context, "performance", PanelAction::DismissAlert(id)).await,
        Err(usage) => Err(usage),
    };
    reply(bot, msg, "Dismiss alert", outcome).await
}

async fn run_action(
    app_context: &AppContext,
    panel: &str,
    action: PanelAction,
) -> Result<String, String> {
    let handle = app_context
        .panel(panel)
        .ok_or_else(|| format!("{} panel is not running", panel))?;
    handle.request(PanelRequest::Action(action)).await
}

async fn reply(
    bot: &Bot,
    msg: &Message,
    title: &str,
    outcome: Result<String, String>,
) -> ResponseResult<()> {
    match outcome {
        Ok(message) => send_html(bot, msg.chat.id, title, &message).await,
        Err(error) => send_html(bot, msg.chat.id, &format!("{} failed", title), &error).await,
    }
}

/// Sends the request to the named panel, or to every panel when `panel`
/// is blank. Panels are asked one after another.
async fn fan_out(
    app_context: &AppContext,
    panel: &str,
    request: impl Fn() -> PanelRequest,
) -> Result<Vec<(&'static str, Result<String, String>)>, String> {
    let panel = panel.trim();
    if !panel.is_empty() {
        let Some(handle) = app_context.panel(panel) else {
            let names: Vec<&str> = app_context.panels.iter().map(|handle| handle.name).collect();
            return Err(format!(
                "Unknown panel {:?}. Known panels: {}",
                panel,
                names.join(", ")
            ));
        };
        return Ok(vec![(handle.name, handle.request(request()).await)]);
    }

    let mut results = Vec::with_capacity(app_context.panels.len());
    for handle in app_context.panels.iter() {
        results.push((handle.name, handle.request(request()).await));
    }
    Ok(results)
}

fn fan_out_summary(results: &[(&str, Result<String, String>)]) -> String {
    results
        .iter()
        .map(|(name, result)| match result {
            Ok(_) => format!("{}: ok", name),
            Err(error) => format!("{}: failed ({})", name, error),
        })
        .collect::<Vec<_>>()
        .join("\n")
}
