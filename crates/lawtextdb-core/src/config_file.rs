use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub server: Option<ServerConfig>,
    pub storage: Option<StorageConfig>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind: Option<String>,
    pub cors_origins: Option<Vec<String>>,
    pub max_upload_mb: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: Option<String>,
    pub database_path: Option<String>,
    pub index_path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub filter: Option<String>,
}

/// Platform config directory path: `<config_dir>/lawtextdb/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("lawtextdb").join("config.toml"))
}

/// Load config by cascading CWD `.lawtextdb.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".lawtextdb.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unparseable config file");
            None
        }
    }
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    let (bs, os) = (base.server.unwrap_or_default(), overlay.server.unwrap_or_default());
    let (bt, ot) = (
        base.storage.unwrap_or_default(),
        overlay.storage.unwrap_or_default(),
    );
    let (bl, ol) = (
        base.logging.unwrap_or_default(),
        overlay.logging.unwrap_or_default(),
    );

    ConfigFile {
        server: Some(ServerConfig {
            bind: os.bind.or(bs.bind),
            cors_origins: os.cors_origins.or(bs.cors_origins),
            max_upload_mb: os.max_upload_mb.or(bs.max_upload_mb),
        }),
        storage: Some(StorageConfig {
            data_dir: ot.data_dir.or(bt.data_dir),
            database_path: ot.database_path.or(bt.database_path),
            index_path: ot.index_path.or(bt.index_path),
        }),
        logging: Some(LoggingConfig {
            filter: ol.filter.or(bl.filter),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_parses() {
        let toml_str = "[storage]\ndata_dir = \"/var/lib/lawtextdb\"\n";
        let parsed: ConfigFile = toml::from_str(toml_str).unwrap();
        assert_eq!(
            parsed.storage.unwrap().data_dir.as_deref(),
            Some("/var/lib/lawtextdb")
        );
        assert!(parsed.server.is_none());
    }

    #[test]
    fn merge_overlay_wins() {
        let base = ConfigFile {
            server: Some(ServerConfig {
                bind: Some("127.0.0.1:1".to_string()),
                max_upload_mb: Some(5),
                ..Default::default()
            }),
            ..Default::default()
        };
        let overlay = ConfigFile {
            server: Some(ServerConfig {
                bind: Some("127.0.0.1:2".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let merged = merge(base, overlay).server.unwrap();
        assert_eq!(merged.bind.as_deref(), Some("127.0.0.1:2"));
        assert_eq!(merged.max_upload_mb, Some(5));
    }

    #[test]
    fn merge_base_preserved_when_overlay_absent() {
        let base = ConfigFile {
            logging: Some(LoggingConfig {
                filter: Some("debug".to_string()),
            }),
            ..Default::default()
        };
        let merged = merge(base, ConfigFile::default());
        assert_eq!(merged.logging.unwrap().filter.as_deref(), Some("debug"));
    }

    #[test]
    fn load_from_path_missing_or_invalid() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_from_path(&dir.path().join("absent.toml")).is_none());

        let bad = dir.path().join("bad.toml");
        std::fs::write(&bad, "[server\nbind = ").unwrap();
        assert!(load_from_path(&bad).is_none());

        let good = dir.path().join("good.toml");
        std::fs::write(&good, "[logging]\nfilter = \"warn\"\n").unwrap();
        let parsed = load_from_path(&good).unwrap();
        assert_eq!(parsed.logging.unwrap().filter.as_deref(), Some("warn"));
    }
}
