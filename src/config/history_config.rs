use std::io;
use std::path::{Path, PathBuf};

use compio::fs;
use lvcs::storage::DEFAULT_STORAGE_PATH;
use saphyr::{LoadableYamlNode, Yaml};
use snafu::prelude::*;
use tracing::debug;

use crate::config::yaml::{self, Mapping};

const CONFIG_FILE_NAME: &str = "lvcs.yaml";
const DEFAULT_COMPRESSION_LEVEL: i32 = 3;

/// Project settings read from `lvcs.yaml` at the project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryConfig {
    /// Storage file, relative to the root.
    pub storage: PathBuf,
    pub compression_level: i32,
    /// Change sets older than this many milliseconds are purged after `apply`.
    pub purge_age: Option<i64>,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        HistoryConfig {
            storage: PathBuf::from(DEFAULT_STORAGE_PATH),
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            purge_age: None,
        }
    }
}

impl HistoryConfig {
    pub async fn read(root: &Path) -> Result<Self, ConfigError> {
        Self::from_path(root.join(CONFIG_FILE_NAME)).await
    }

    pub async fn from_path(path: PathBuf) -> Result<Self, ConfigError> {
        debug!("Reading config file: {}", path.display());
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                debug!("No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(error) => return Err(error).context(ReadSnafu { path }),
        };

        let contents = String::from_utf8(bytes).context(EncodingSnafu { path })?;
        contents.as_str().try_into()
    }

    pub fn storage_path(&self, root: &Path) -> PathBuf {
        root.join(&self.storage)
    }

    fn apply_fields(mut self, top_level: &Mapping) -> Result<Self, ConfigError> {
        if let Some(value) = yaml::field(top_level, "storage") {
            let storage = yaml::as_text(value).context(InvalidFieldSnafu {
                field: "storage",
                expected: "a path",
            })?;
            self.storage = PathBuf::from(storage);
        }

        if let Some(value) = yaml::field(top_level, "compression_level") {
            self.compression_level = yaml::as_integer(value)
                .and_then(|level| i32::try_from(level).ok())
                .context(InvalidFieldSnafu {
                    field: "compression_level",
                    expected: "an integer",
                })?;
        }

        if let Some(value) = yaml::field(top_level, "purge_age") {
            let purge_age = yaml::as_integer(value)
                .filter(|age| *age >= 0)
                .context(InvalidFieldSnafu {
                    field: "purge_age",
                    expected: "a non-negative number of milliseconds",
                })?;
            self.purge_age = Some(purge_age);
        }

        Ok(self)
    }
}

impl TryFrom<&str> for HistoryConfig {
    type Error = ConfigError;

    fn try_from(contents: &str) -> Result<Self, Self::Error> {
        let documents = Yaml::load_from_str(contents).context(ParseSnafu)?;
        let Some(document) = documents.first().filter(|document| !yaml::is_null(document)) else {
            return Ok(Self::default());
        };

        let top_level = document.as_mapping().context(TopLevelNotMapSnafu)?;
        Self::default().apply_fields(top_level)
    }
}

#[derive(Debug, Snafu)]
pub enum ConfigError {
    #[snafu(display("Failed to read the config file: {}", path.display()))]
    ReadError { path: PathBuf, source: io::Error },
    #[snafu(display("Config file {} is not valid UTF-8", path.display()))]
    EncodingError {
        path: PathBuf,
        source: std::string::FromUtf8Error,
    },
    #[snafu(display("Failed to parse the config file"))]
    ParseError { source: saphyr::ScanError },
    #[snafu(display("Top level of config should be a map"))]
    TopLevelNotMapError,
    #[snafu(display("Config field '{}' should be {}", field, expected))]
    InvalidFieldError {
        field: &'static str,
        expected: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    #[compio::test]
    async fn missing_config_file_gives_defaults() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");

        let config = HistoryConfig::read(temp_dir.path())
            .await
            .expect("Failed to read config");

        assert_eq!(config, HistoryConfig::default());
        assert_eq!(
            config.storage_path(temp_dir.path()),
            temp_dir.path().join(".lvcs/history.bin")
        );
    }

    #[compio::test]
    async fn config_file_is_read_from_root() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        std::fs::write(
            temp_dir.path().join("lvcs.yaml"),
            "storage: history.bin\npurge_age: 1000\n",
        )
        .expect("Failed to write config");

        let config = HistoryConfig::read(temp_dir.path())
            .await
            .expect("Failed to read config");

        assert_eq!(config.storage, PathBuf::from("history.bin"));
        assert_eq!(config.purge_age, Some(1000));
        assert_eq!(config.compression_level, 3);
    }

    #[test]
    fn all_fields_are_read() {
        let contents = "storage: .history/local.bin\ncompression_level: 19\npurge_age: 604800000\n";

        let config: HistoryConfig = contents.try_into().expect("Failed to parse");

        assert_eq!(
            config,
            HistoryConfig {
                storage: PathBuf::from(".history/local.bin"),
                compression_level: 19,
                purge_age: Some(604800000),
            }
        );
    }

    #[rstest]
    #[case::empty("")]
    #[case::only_comments("# nothing configured\n")]
    #[case::unrelated_keys("other: value")]
    #[case::null_fields("storage: null\npurge_age: ~")]
    fn defaults_when_nothing_is_set(#[case] contents: &str) {
        let config: HistoryConfig = contents.try_into().expect("Failed to parse");
        assert_eq!(config, HistoryConfig::default());
    }

    #[test]
    fn invalid_yaml_is_a_parse_error() {
        let result: Result<HistoryConfig, _> = "invalid: yaml: content: [unclosed".try_into();
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[rstest]
    #[case::list("- item1\n- item2")]
    #[case::scalar("just a string")]
    fn top_level_must_be_a_map(#[case] contents: &str) {
        let result: Result<HistoryConfig, _> = contents.try_into();
        assert!(matches!(result, Err(ConfigError::TopLevelNotMapError)));
    }

    #[rstest]
    #[case::storage_list("storage: [a, b]", "storage")]
    #[case::level_text("compression_level: high", "compression_level")]
    #[case::level_overflow("compression_level: 9999999999", "compression_level")]
    #[case::negative_age("purge_age: -5", "purge_age")]
    fn wrongly_typed_fields_are_rejected(#[case] contents: &str, #[case] expected_field: &str) {
        let result: Result<HistoryConfig, _> = contents.try_into();
        match result {
            Err(ConfigError::InvalidFieldError { field, .. }) => assert_eq!(field, expected_field),
            other => panic!("Expected invalid field error, got {other:?}"),
        }
    }
}
