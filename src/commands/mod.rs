mod command_def;
mod features;
mod handler;
mod helpers;
mod router;

pub use command_def::DashboardCommands;
pub use handler::answer;
pub(crate) use helpers::as_html_block;
