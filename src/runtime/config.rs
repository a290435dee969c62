use std::sync::OnceLock;

use crate::runtime;

///////////////////////////////
/// Global Config Options
pub static CONFIG: OnceLock<Config> = OnceLock::new();

#[derive(Clone, Debug)]
pub struct Config {
    pub log_level: runtime::LogLevel,
    pub log_mode: runtime::LogMode,
    pub log_path: std::path::PathBuf,
}

impl Config {
    pub fn install(self) -> &'static Config {
        CONFIG.get_or_init(|| self)
    }
}
