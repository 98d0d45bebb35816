use teloxide::{prelude::*, types::ParseMode};
use tokio::sync::mpsc;

use crate::commands::as_html_block;
use crate::dashboard::{Notification, NotificationKind};

pub(super) fn start_notification_dispatch_job(
    bot: Option<Bot>,
    owner_chat_id: ChatId,
    mut notifications: mpsc::UnboundedReceiver<Notification>,
) {
    tokio::spawn(async move {
        while let Some(notification) = notifications.recv().await {
            log_notification(&notification);

            let Some(bot) = bot.as_ref() else {
                continue;
            };
            if !forwards_to_owner(notification.kind) {
                continue;
            }

            let (title, body) = telegram_text(&notification);
            if let Err(error) = bot
                .send_message(owner_chat_id, as_html_block(&title, &body))
                .parse_mode(ParseMode::Html)
                .await
            {
                log::error!(
                    "notification_forward_failed source={} kind={} error={}",
                    notification.source,
                    notification.kind,
                    error
                );
            }
        }
        log::debug!("notification_dispatch_stopped reason=senders_closed");
    });
}

fn log_notification(notification: &Notification) {
    match notification.kind {
        NotificationKind::Info | NotificationKind::Success => log::info!(
            "notification source={} kind={} message={:?}",
            notification.source,
            notification.kind,
            notification.message
        ),
        NotificationKind::Warning | NotificationKind::Error => log::warn!(
            "notification source={} kind={} message={:?}",
            notification.source,
            notification.kind,
            notification.message
        ),
    }
}

fn forwards_to_owner(kind: NotificationKind) -> bool {
    matches!(kind, NotificationKind::Warning | NotificationKind::Error)
}

fn telegram_text(notification: &Notification) -> (String, String) {
    let icon = match notification.kind {
        NotificationKind::Error => "🚨",
        NotificationKind::Warning => "⚠️",
        NotificationKind::Success => "✅",
        NotificationKind::Info => "ℹ️",
    };
    (
        format!("{} {} {}", icon, notification.source, notification.kind),
        notification.message.clone(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_warnings_and_errors_reach_the_owner() {
        assert!(forwards_to_owner(NotificationKind::Error));
        assert!(forwards_to_owner(NotificationKind::Warning));
        assert!(!forwards_to_owner(NotificationKind::Info));
        assert!(!forwards_to_owner(NotificationKind::Success));
    }

    #[test]
    fn telegram_text_names_source_and_kind() {
        let notification = Notification::error("cluster", "Failed to load cluster data: boom");
        let (title, body) = telegram_text(&notification);
        assert_eq!(title, "🚨 cluster error");
        assert_eq!(body, "Failed to load cluster data: boom");
    }
}
