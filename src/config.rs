use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::Duration;
use config::{Config, Environment, File};
use log::debug;
use serde::Deserialize;

use crate::calendar::DEFAULT_CALENDAR_BASE_URL;
use crate::error::{Result, SyncError};
use crate::event::{DedupPolicy, DEFAULT_MATCH_DURATION_MINUTES};
use crate::fixtures::DEFAULT_API_BASE_URL;
use crate::sync::DEFAULT_DAYS_AHEAD;

/// 任意の設定ファイル（作業ディレクトリからの相対パス）
pub const CONFIG_FILE: &str = "football_calendar.toml";

/// 環境変数のプレフィックス（FOOTBALL_API_KEY など）
pub const ENV_PREFIX: &str = "FOOTBALL";

/// アプリケーション全体の設定
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// football-data.org の APIキー
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// 取得する日数
    #[serde(default = "default_days_ahead")]
    pub days_ahead: u32,

    /// 登録先カレンダーID
    #[serde(default = "default_calendar_id")]
    pub calendar_id: String,

    #[serde(default = "default_calendar_base_url")]
    pub calendar_base_url: String,

    /// OAuth クライアントシークレット（デスクトップアプリ）
    #[serde(default = "default_credentials_path")]
    pub credentials_path: PathBuf,

    /// トークンキャッシュ
    #[serde(default = "default_token_path")]
    pub token_path: PathBuf,

    #[serde(default = "default_match_duration")]
    pub match_duration_minutes: i64,

    #[serde(default)]
    pub dedup: DedupPolicy,
}

// デフォルト値
fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_days_ahead() -> u32 {
    DEFAULT_DAYS_AHEAD
}

fn default_calendar_id() -> String {
    "primary".to_string()
}

fn default_calendar_base_url() -> String {
    DEFAULT_CALENDAR_BASE_URL.to_string()
}

fn default_credentials_path() -> PathBuf {
    PathBuf::from("credentials.json")
}

fn default_token_path() -> PathBuf {
    PathBuf::from("token.json")
}

fn default_match_duration() -> i64 {
    DEFAULT_MATCH_DURATION_MINUTES
}

impl AppConfig {
    /// APIキーを取得（未設定または空なら ConfigurationError）
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                SyncError::Configuration(format!(
                    "{}_API_KEY is not set; get a free key at https://www.football-data.org/ \
                     and export it or add it to .env",
                    ENV_PREFIX
                ))
            })
    }

    pub fn match_duration(&self) -> Duration {
        Duration::minutes(self.match_duration_minutes)
    }

    fn validate(self) -> Result<Self> {
        if self.days_ahead == 0 {
            return Err(SyncError::Configuration("days_ahead must be at least 1".to_string()));
        }
        if self.match_duration_minutes <= 0 {
            return Err(SyncError::Configuration(
                "match_duration_minutes must be positive".to_string(),
            ));
        }
        Ok(self)
    }
}

/// .env を読み込んだうえで、作業ディレクトリの設定ファイルと環境変数から設定を作る
pub fn load_config() -> Result<AppConfig> {
    match dotenvy::dotenv() {
        Ok(path) => debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => debug!("No .env file found"),
        Err(e) => {
            return Err(SyncError::Configuration(format!("failed to read .env: {}", e)));
        }
    }

    load_config_from(Path::new(CONFIG_FILE), None)
}

/// 設定ファイルと環境変数（省略時はプロセス環境）から設定を作る
///
/// 優先順位は 既定値 < 設定ファイル < 環境変数。
pub fn load_config_from(
    file: &Path,
    env: Option<HashMap<String, String>>,
) -> Result<AppConfig> {
    let settings = Config::builder()
        .add_source(File::from(file).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .source(env),
        )
        .build()
        .map_err(|e| SyncError::Configuration(format!("failed to load configuration: {}", e)))?;

    let config: AppConfig = settings
        .try_deserialize()
        .map_err(|e| SyncError::Configuration(format!("invalid configuration: {}", e)))?;

    debug!(
        "Configuration loaded: days_ahead={}, calendar_id={}, dedup={:?}",
        config.days_ahead, config.calendar_id, config.dedup
    );

    config.validate()
}
