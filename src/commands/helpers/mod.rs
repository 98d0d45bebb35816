mod args;
mod auth;
mod formatting;

pub(super) use args::{parse_alert_id, parse_event_filter, parse_query_args, parse_time_range};
pub(super) use auth::is_authorized;
pub(crate) use formatting::as_html_block;
pub(super) use formatting::send_html;
