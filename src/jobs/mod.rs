use teloxide::prelude::*;
use tokio::sync::mpsc;

use crate::app_context::AppContext;
use crate::dashboard::Notification;

mod config_reload;
mod notifications;
mod panels;

pub use panels::{RunningPanels, start_panel_pollers};

pub fn start_background_jobs(
    bot: Option<Bot>,
    app_context: AppContext,
    notifications: mpsc::UnboundedReceiver<Notification>,
) {
    config_reload::start_config_hot_reload_job(app_context.clone());
    notifications::start_notification_dispatch_job(
        bot,
        ChatId(app_context.config.telegram.owner_chat_id),
        notifications,
    );
}
