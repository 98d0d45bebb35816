use teloxide::utils::command::BotCommands;

#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum DashboardCommands {
    #[command(description = "Show help menu.")]
    Help,
    #[command(description = "Show the latest frame of every panel.")]
    Status,
    #[command(description = "Show performance alerts and thresholds.")]
    Alerts,
    #[command(description = "Poll now, e.g. /refresh or /refresh nodes")]
    Refresh(String),
    #[command(description = "Set the cluster history window in hours: 1, 6, 24 or 168.")]
    Range(String),
    #[command(description = "Filter cluster events: all, info, warning, error, critical.")]
    Filter(String),
    #[command(description = "Dismiss a performance alert by id, e.g. /dismiss 3")]
    Dismiss(String),
    #[command(description = "Run a read-only query, e.g. /query pgpool SHOW pool_nodes")]
    Query(String),
    #[command(description = "Clear chart history, e.g. /clear or /clear performance")]
    Clear(String),
    #[command(description = "Show the most recent console queries.")]
    History,
}
