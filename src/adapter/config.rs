//! Configuration
//!
//! サービスURL・認証トークン・リトライ設定を JSON ファイルから読み込む

use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::adapter::http::client::DEFAULT_TIMEOUT_SECS;
use crate::adapter::repositories::score_client_repository::DEFAULT_SCORE_CLIENT_COMMAND;
use crate::domain::services::retry_policy::{
    DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY_MS, DEFAULT_TRANSIENT_ATTEMPTS,
    DEFAULT_TRANSIENT_DELAY_MS,
};

/// Config file looked up when `--config` is not given
pub const DEFAULT_CONFIG_PATH: &str = "~/.conductor/config.json";

/// 設定ファイルの内容
///
/// 未指定の項目は既定値で補完される
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub lyric_url: String,
    pub lectern_url: String,
    pub song_url: String,
    pub score_url: String,

    // Authentication
    pub auth_token: Option<String>,

    /// Per HTTP call
    pub timeout_secs: u64,

    // Lyric status polling
    pub max_retries: u32,
    pub retry_delay_ms: u64,

    // SONG/Score transient error retries
    pub transient_retry_attempts: u32,
    pub transient_retry_delay_ms: u64,

    pub score_client_command: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lyric_url: "http://localhost:3030".to_string(),
            lectern_url: "http://localhost:3031".to_string(),
            song_url: "http://localhost:8080".to_string(),
            score_url: "http://localhost:8087".to_string(),
            auth_token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            transient_retry_attempts: DEFAULT_TRANSIENT_ATTEMPTS,
            transient_retry_delay_ms: DEFAULT_TRANSIENT_DELAY_MS,
            score_client_command: DEFAULT_SCORE_CLIENT_COMMAND.to_string(),
        }
    }
}

impl Config {
    /// 設定ファイルを読み込む
    ///
    /// ファイルが存在しない場合は既定値を返す
    pub fn load(path: &str) -> Result<Self> {
        let path = PathBuf::from(shellexpand::tilde(path).as_ref());

        if !path.exists() {
            debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        debug!("Loaded config from {}", path.display());
        Ok(config)
    }
}
