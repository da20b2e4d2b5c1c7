use std::path::PathBuf;

/// Common configuration shared by services embedding the feed core.
///
/// Parsed from command-line style arguments by the host process, then passed
/// to storage layer initialization.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Base data directory.
    pub data_dir: Option<PathBuf>,

    /// Path to the redb document database file.
    /// Defaults to `{data_dir}/data.redb` if not specified.
    pub db_path: Option<PathBuf>,

    /// Directory for uploaded asset storage.
    /// Defaults to `{data_dir}/assets/` if not specified.
    pub asset_dir: Option<PathBuf>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            db_path: None,
            asset_dir: None,
        }
    }
}

impl ServiceConfig {
    /// Parse configuration from command-line arguments.
    ///
    /// Supported flags:
    /// - `--data-dir=PATH`
    /// - `--db=PATH`
    /// - `--asset-dir=PATH`
    pub fn from_args(args: &[String]) -> Self {
        let mut config = ServiceConfig::default();

        for arg in args {
            if let Some(val) = arg.strip_prefix("--data-dir=") {
                config.data_dir = Some(PathBuf::from(val));
            } else if let Some(val) = arg.strip_prefix("--db=") {
                config.db_path = Some(PathBuf::from(val));
            } else if let Some(val) = arg.strip_prefix("--asset-dir=") {
                config.asset_dir = Some(PathBuf::from(val));
            }
        }

        config
    }

    /// Resolve the document database path, falling back to `{data_dir}/data.redb`.
    pub fn resolve_db_path(&self) -> PathBuf {
        self.db_path
            .clone()
            .unwrap_or_else(|| self.resolve_data_subpath("data.redb"))
    }

    /// Resolve the asset storage directory, falling back to `{data_dir}/assets`.
    pub fn resolve_asset_dir(&self) -> PathBuf {
        self.asset_dir
            .clone()
            .unwrap_or_else(|| self.resolve_data_subpath("assets"))
    }

    fn resolve_data_subpath(&self, name: &str) -> PathBuf {
        self.data_dir
            .as_ref()
            .map(|d| d.join(name))
            .unwrap_or_else(|| PathBuf::from(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_args() {
        let args = vec![
            "--data-dir=/tmp/chirp".to_string(),
            "--asset-dir=/srv/assets".to_string(),
        ];
        let config = ServiceConfig::from_args(&args);
        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/chirp")));
        assert_eq!(config.asset_dir, Some(PathBuf::from("/srv/assets")));
    }

    #[test]
    fn test_resolve_defaults() {
        let config = ServiceConfig {
            data_dir: Some(PathBuf::from("/data")),
            ..Default::default()
        };
        assert_eq!(config.resolve_db_path(), PathBuf::from("/data/data.redb"));
        assert_eq!(config.resolve_asset_dir(), PathBuf::from("/data/assets"));
    }
}
