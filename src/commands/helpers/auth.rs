use teloxide::types::ChatId;

/// Only the configured owner chat may drive the dashboard.
pub(crate) fn is_authorized(chat_id: ChatId, owner_chat_id: ChatId) -> bool {
    owner_chat_id.0 != 0 && chat_id == owner_chat_id
}
