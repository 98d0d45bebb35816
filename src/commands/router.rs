use teloxide::prelude::*;

use crate::app_context::AppContext;

use super::command_def::DashboardCommands;
use super::features::{
    alerts::handle_alerts,
    help::handle_help,
    panel_control::{handle_clear, handle_dismiss, handle_filter, handle_range, handle_refresh},
    query::{handle_history, handle_query},
    status::handle_status,
};

pub(super) async fn route_command(
    bot: Bot,
    msg: Message,
    cmd: DashboardCommands,
    app_context: &AppContext,
) -> ResponseResult<()> {
    log::info!("command_received chat_id={} command={:?}", msg.chat.id.0, cmd);

    match cmd {
        DashboardCommands::Help => handle_help(&bot, &msg).await?,
        DashboardCommands::Status => handle_status(&bot, &msg, app_context).await?,
        DashboardCommands::Alerts => handle_alerts(&bot, &msg, app_context).await?,
        DashboardCommands::Refresh(panel) => handle_refresh(&bot, &msg, app_context, &panel).await?,
        DashboardCommands::Range(hours) => handle_range(&bot, &msg, app_context, &hours).await?,
        DashboardCommands::Filter(severity) => {
            handle_filter(&bot, &msg, app_context, &severity).await?
        }
        DashboardCommands::Dismiss(id) => handle_dismiss(&bot, &msg, app_context, &id).await?,
        DashboardCommands::Query(args) => handle_query(&bot, &msg, app_context, &args).await?,
        DashboardCommands::Clear(panel) => handle_clear(&bot, &msg, app_context, &panel).await?,
        DashboardCommands::History => handle_history(&bot, &msg, app_context).await?,
    }

    Ok(())
}
