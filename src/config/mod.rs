mod defaults;
mod io;
mod schema;
mod validate;

pub use io::{RuntimeReload, load_config, load_runtime_config};
pub use schema::{Alerts, Api, Config, Panels, RuntimeConfig, Telegram};
pub use validate::ConfigError;
