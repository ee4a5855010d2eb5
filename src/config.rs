use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::logging::{LogConfig, LogOutput, parse_log_level};

/// ログ出力設定
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LoggingSection {
    pub level: String,
    pub output: String,
    pub dir: String,
    pub file_prefix: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        let defaults = LogConfig::default();
        Self {
            level: defaults.level.to_string().to_lowercase(),
            output: "console".to_string(),
            dir: defaults.log_dir,
            file_prefix: defaults.file_prefix,
        }
    }
}

/// カタログ設定
///
/// レコードデータの配置とログ出力を指定します。すべての項目は省略可能です。
///
/// ```yaml
/// data_dir: data
/// logging:
///   level: debug
///   output: both
///   dir: logs
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct CatalogConfig {
    /// レコードグループのディレクトリを含むルート
    pub data_dir: PathBuf,
    pub logging: LoggingSection,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            logging: LoggingSection::default(),
        }
    }
}

impl CatalogConfig {
    /// YAMLファイルから設定を読み込み
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let contents = fs::read_to_string(path).map_err(|e| ConfigError::IoError(path.to_path_buf(), e))?;
        let config = Self::from_yaml(&contents).map_err(|e| match e {
            ConfigError::ParseError(_, err) => ConfigError::ParseError(path.to_path_buf(), err),
            other => other,
        })?;

        Ok(config)
    }

    /// YAMLテキストから設定を読み込み
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        let config: CatalogConfig = if contents.trim().is_empty() {
            CatalogConfig::default()
        } else {
            serde_yaml::from_str(contents).map_err(|e| ConfigError::ParseError(PathBuf::new(), e))?
        };

        config.validate()?;
        Ok(config)
    }

    /// 設定の基本的な検証
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError("data_dir must not be empty".to_string()));
        }
        self.logging
            .output
            .parse::<LogOutput>()
            .map_err(ConfigError::ValidationError)?;
        if self.logging.file_prefix.is_empty() {
            return Err(ConfigError::ValidationError(
                "logging.file_prefix must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// ログ設定に変換
    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            level: parse_log_level(&self.logging.level),
            output: self.logging.output.parse().unwrap_or(LogOutput::Console),
            log_dir: self.logging.dir.clone(),
            file_prefix: self.logging.file_prefix.clone(),
        }
    }
}

/// 設定読み込みエラー
#[derive(Debug)]
pub enum ConfigError {
    FileNotFound(PathBuf),
    IoError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
    ValidationError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => {
                write!(f, "設定ファイルが見つかりません: {}", path.display())
            }
            ConfigError::IoError(path, err) => {
                write!(f, "ファイル読み込みエラー {}: {}", path.display(), err)
            }
            ConfigError::ParseError(path, err) => {
                write!(f, "YAML解析エラー {}: {}", path.display(), err)
            }
            ConfigError::ValidationError(msg) => {
                write!(f, "設定検証エラー: {}", msg)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::Level;

    #[test]
    fn test_defaults() {
        let config = CatalogConfig::from_yaml("").unwrap();
        assert_eq!(config, CatalogConfig::default());
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_override() {
        let config = CatalogConfig::from_yaml("data_dir: /srv/ballistics\nlogging:\n  level: debug\n  output: both\n").unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/srv/ballistics"));
        assert_eq!(config.logging.dir, "logs");

        let log = config.log_config();
        assert_eq!(log.level, Level::DEBUG);
        assert_eq!(log.output, LogOutput::Both);
    }

    #[test]
    fn test_invalid_output() {
        let err = CatalogConfig::from_yaml("logging:\n  output: syslog\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_parse_error() {
        let err = CatalogConfig::from_yaml("data_dir: [unclosed").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(..)));
    }

    #[test]
    fn test_missing_file() {
        let err = CatalogConfig::from_file("/nonexistent/ballistics.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }
}
