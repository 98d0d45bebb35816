use teloxide::{prelude::*, utils::command::BotCommands};

use super::super::{command_def::DashboardCommands, helpers::send_html};

pub(crate) async fn handle_help(bot: &Bot, msg: &Message) -> ResponseResult<()> {
    send_html(
        bot,
        msg.chat.id,
        "Available commands",
        &DashboardCommands::descriptions().to_string(),
    )
    .await
}
