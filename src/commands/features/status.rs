use teloxide::prelude::*;

use crate::app_context::AppContext;
use crate::dashboard::Frame;

use super::super::helpers::send_html;

pub(crate) async fn handle_status(
    bot: &Bot,
    msg: &Message,
    app_context: &AppContext,
) -> ResponseResult<()> {
    let frames: Vec<Frame> = app_context.panels.iter().map(|panel| panel.frame()).collect();
    let body = status_body(app_context.client.base_url(), &frames);
    send_html(bot, msg.chat.id, "Dashboard status", &body).await
}

fn status_body(base_url: &str, frames: &[Frame]) -> String {
    if frames.is_empty() {
        return format!("API: {}\n\nNo panels are running.", base_url);
    }

    let sections: Vec<String> = frames.iter().map(Frame::to_text).collect();
    format!("API: {}\n\n{}", base_url, sections.join("\n\n"))
}
