use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

/// User defaults for the CLI. Every field is optional in the file.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory for JSON output instead of next to the source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,
    /// Persist conversions without needing `--db`.
    pub save_to_db: bool,
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        // Expand shell variables and tilde in configured paths
        config.output_dir = config
            .output_dir
            .map(|path| Self::expand_path(&path).unwrap_or(path));
        config.database_path = config
            .database_path
            .map(|path| Self::expand_path(&path).unwrap_or(path));

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/markdown-sections");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// Where the JSON for `source` goes when no explicit output is given.
    /// `None` means the default next to the source.
    pub fn output_path_for(&self, source: &Path) -> Option<PathBuf> {
        let dir = self.output_dir.as_ref()?;
        let stem = source.file_stem()?;
        Some(dir.join(format!("{}.json", stem.to_string_lossy())))
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::env;
    use tempfile::TempDir;

    #[test]
    fn test_config_path() {
        let config_path = Config::config_path();
        let path_str = config_path.to_string_lossy();

        assert!(!path_str.starts_with('~'));
        assert!(path_str.ends_with(".config/markdown-sections/config.toml"));
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert!(!config.save_to_db);
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let expanded = Config::expand_path(Path::new("~/test/path")).unwrap();

        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.to_string_lossy().contains("test/path"));
    }

    #[test]
    fn test_expand_path_with_env_var() {
        unsafe {
            env::set_var("MDS_TEST_VAR", "/test/env/path");
        }

        let expanded = Config::expand_path(Path::new("$MDS_TEST_VAR/subdir")).unwrap();
        assert_eq!(expanded, PathBuf::from("/test/env/path/subdir"));

        unsafe {
            env::remove_var("MDS_TEST_VAR");
        }
    }

    #[test]
    fn test_expand_path_leaves_plain_paths_alone() {
        for path in ["/absolute/path", "relative/path"] {
            assert_eq!(Config::expand_path(Path::new(path)).unwrap(), PathBuf::from(path));
        }
    }

    #[test]
    fn test_load_config_file_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let non_existent_config = temp_dir.path().join("nonexistent.toml");

        let result = Config::load_from_path(&non_existent_config).unwrap();

        assert!(result.is_none());
    }

    #[test]
    fn test_load_invalid_toml_reports_path() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "save_to_db = \"sometimes\"").unwrap();

        let err = Config::load_from_path(&config_file).unwrap_err();

        assert!(matches!(err, ConfigError::ConfigParseError { .. }));
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn test_serialized_config_loads_back() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        let config = Config {
            output_dir: Some(PathBuf::from("/tmp/json")),
            database_path: Some(PathBuf::from("/tmp/sections.db")),
            save_to_db: true,
        };

        std::fs::write(&config_file, toml::to_string_pretty(&config).unwrap()).unwrap();
        let loaded = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_expands_configured_paths() {
        unsafe {
            env::set_var("MDS_DATA_ROOT", "/custom/data");
        }
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(
            &config_file,
            "database_path = \"$MDS_DATA_ROOT/sections.db\"\noutput_dir = \"~/json\"\n",
        )
        .unwrap();

        let config = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(
            config.database_path,
            Some(PathBuf::from("/custom/data/sections.db"))
        );
        assert!(
            !config
                .output_dir
                .unwrap()
                .to_string_lossy()
                .starts_with('~')
        );

        unsafe {
            env::remove_var("MDS_DATA_ROOT");
        }
    }

    #[test]
    fn test_output_path_for() {
        let config = Config {
            output_dir: Some(PathBuf::from("/out")),
            ..Config::default()
        };

        assert_eq!(
            config.output_path_for(Path::new("notes/guide.md")),
            Some(PathBuf::from("/out/guide.json"))
        );
        assert_eq!(Config::default().output_path_for(Path::new("guide.md")), None);
    }

    #[test]
    fn test_output_path_for_keeps_dotted_stems_apart() {
        let config = Config {
            output_dir: Some(PathBuf::from("/out")),
            ..Config::default()
        };

        let v1 = config.output_path_for(Path::new("notes/release.v1.md"));
        let v2 = config.output_path_for(Path::new("notes/release.v2.md"));

        assert_eq!(v1, Some(PathBuf::from("/out/release.v1.json")));
        assert_eq!(v2, Some(PathBuf::from("/out/release.v2.json")));
    }
}
