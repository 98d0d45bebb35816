use teloxide::prelude::*;

use crate::app_context::AppContext;
use crate::console::{format_history, render_result};

use super::super::helpers::{parse_query_args, send_html};

const MAX_ROWS: usize = 20;
const HISTORY_LINES: usize = 10;

pub(crate) async fn handle_query(
    bot: &Bot,
    msg: &Message,
    app_context: &AppContext,
    args: &str,
) -> ResponseResult<()> {
    let (database, sql) = match parse_query_args(args) {
        Ok(parsed) => parsed,
        Err(usage) => return send_html(bot, msg.chat.id, "Query failed", &usage).await,
    };

    let outcome = {
        let mut console = app_context.console.lock().await;
        console.execute(&database, &sql).await
    };

    match outcome {
        Ok(result) => {
            let title = format!("Query on {}", database);
            send_html(bot, msg.chat.id, &title, &render_result(&result, MAX_ROWS)).await
        }
        Err(error) => send_html(bot, msg.chat.id, "Query failed", &error.user_message()).await,
    }
}

pub(crate) async fn handle_history(
    bot: &Bot,
    msg: &Message,
    app_context: &AppContext,
) -> ResponseResult<()> {
    let body = {
        let console = app_context.console.lock().await;
        format_history(console.history(), HISTORY_LINES)
    };
    send_html(bot, msg.chat.id, "Query history", &body).await
}
