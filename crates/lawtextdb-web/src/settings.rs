use std::path::PathBuf;

use lawtextdb_core::config_file::ConfigFile;

pub const DEFAULT_BIND: &str = "0.0.0.0:8080";
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";
pub const DEFAULT_MAX_UPLOAD_MB: usize = 50;
pub const DEFAULT_LOG_FILTER: &str = "lawtextdb=info,tower_http=info";

/// Fully resolved runtime settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub bind: String,
    pub cors_origins: Vec<String>,
    pub max_upload_mb: usize,
    pub database_path: PathBuf,
    pub index_path: PathBuf,
    pub log_filter: String,
}

/// Values given on the command line. These win over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub bind: Option<String>,
    pub data_dir: Option<PathBuf>,
}

impl Settings {
    pub fn resolve(config: ConfigFile, overrides: Overrides) -> Self {
        let server = config.server.unwrap_or_default();
        let storage = config.storage.unwrap_or_default();
        let logging = config.logging.unwrap_or_default();

        let data_dir = overrides
            .data_dir
            .or_else(|| storage.data_dir.map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

        // An explicit --data-dir relocates both stores unless they are pinned
        // in the config file.
        let database_path = storage
            .database_path
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("lawtexts.db"));
        let index_path = storage
            .index_path
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("index"));

        Self {
            bind: overrides
                .bind
                .or(server.bind)
                .unwrap_or_else(|| DEFAULT_BIND.to_string()),
            cors_origins: server
                .cors_origins
                .unwrap_or_else(|| vec![DEFAULT_CORS_ORIGIN.to_string()]),
            max_upload_mb: server.max_upload_mb.unwrap_or(DEFAULT_MAX_UPLOAD_MB),
            database_path,
            index_path,
            log_filter: logging
                .filter
                .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        }
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::resolve(ConfigFile::default(), Overrides::default())
    }
}
