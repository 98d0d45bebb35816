//! Pure payload -> view-model functions. Nothing here does I/O or touches
//! panel state.

pub mod cluster;
pub mod format;
pub mod history;
pub mod insights;
pub mod nodes;
pub mod performance;
pub mod queries;
