mod history_config;
mod script;
mod yaml;

pub use history_config::{ConfigError, HistoryConfig};
pub use script::{HistoryScript, ScriptError};
