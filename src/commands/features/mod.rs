pub(super) mod alerts;
pub(super) mod help;
pub(super) mod panel_control;
pub(super) mod query;
pub(super) mod status;
