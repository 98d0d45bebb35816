use teloxide::prelude::*;

use super::command_def::DashboardCommands;
use super::helpers::is_authorized;
use super::router::route_command;
use crate::app_context::AppContext;

pub async fn answer(
    bot: Bot,
    msg: Message,
    cmd: DashboardCommands,
    app_context: &AppContext,
) -> ResponseResult<()> {
    let owner_chat_id = ChatId(app_context.config.telegram.owner_chat_id);
    if !is_authorized(msg.chat.id, owner_chat_id) {
        let user_id = msg
            .from()
            .map(|user| user.id.0.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        log::warn!(
            "SECURITY: Unauthorized access attempt. mode=owner_chat_only expected_chat_id={} user_id={} chat_id={} command_text={:?}",
            owner_chat_id.0,
            user_id,
            msg.chat.id.0,
            msg.text()
        );
        return Ok(());
    }
    route_command(bot, msg, cmd, app_context).await
}
