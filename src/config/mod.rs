pub mod error;
pub mod load;
pub mod settings;

pub use error::ConfigError;
pub use load::{default_config_path, load_settings, GLOBAL_SETTINGS_FILE_NAME, GLOBAL_STATE_DIR};
pub use settings::{Settings, StatusTimings};
