//! Environment-backed settings. A `.env` file in the working directory is
//! read first when present.

use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite file backing the key/value store
    pub store_path: PathBuf,
    /// Directory holding `eleves.json` and `criteres.json`
    pub data_dir: PathBuf,
    /// Where exports are written
    pub export_dir: PathBuf,
    /// Log filter used when `RUST_LOG` is unset
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_process_env()
    }

    /// Reads only the variables already set on the process.
    fn from_process_env() -> Self {
        let store_path = env::var("APPRECIATIONS_STORE_PATH")
            .unwrap_or_else(|_| "./data/store.sqlite".to_string())
            .into();

        let data_dir = env::var("APPRECIATIONS_DATA_DIR")
            .unwrap_or_else(|_| "./data".to_string())
            .into();

        let export_dir = env::var("APPRECIATIONS_EXPORT_DIR")
            .unwrap_or_else(|_| "./exports".to_string())
            .into();

        let log_level = env::var("APPRECIATIONS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Self {
            store_path,
            data_dir,
            export_dir,
            log_level,
        }
    }
}
