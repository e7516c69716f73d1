//! # Submission Parameters DTO
//!
//! Lyric データ提出のパラメータ

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::domain::errors::{ConductorError, ConductorResult};

/// Lyric 提出パラメータ
///
/// 1回の実行につき一度だけ構築され、以降は変更されない
#[derive(Debug, Clone)]
pub struct SubmissionParams {
    category_id: String,
    organization: String,
    data_directory: PathBuf,
    max_retries: u32,
    retry_delay: Duration,
}

impl SubmissionParams {
    /// パラメータを検証して作成します。
    ///
    /// # 例
    ///
    /// ```
    /// use conductor::application::dto::submission_params::SubmissionParams;
    ///
    /// let params = SubmissionParams::new("1", "OICR", "./data", 10, 1000).unwrap();
    /// assert_eq!(params.category_id(), "1");
    /// assert_eq!(params.max_retries(), 10);
    ///
    /// // 組織名は必須
    /// assert!(SubmissionParams::new("1", " ", "./data", 10, 1000).is_err());
    /// ```
    ///
    /// # Errors
    ///
    /// 必須パラメータが空、または `max_retries` が0の場合は ARGS エラー。
    /// ディレクトリの存在は走査時に確認する（FILE エラー）
    pub fn new(
        category_id: impl Into<String>,
        organization: impl Into<String>,
        data_directory: impl AsRef<Path>,
        max_retries: u32,
        retry_delay_ms: u64,
    ) -> ConductorResult<Self> {
        let category_id = category_id.into().trim().to_string();
        let organization = organization.into().trim().to_string();
        let data_directory = data_directory.as_ref();

        if category_id.is_empty() {
            return Err(missing("category id", "--category-id", "CATEGORY_ID"));
        }
        if organization.is_empty() {
            return Err(missing("organization", "--organization", "ORGANIZATION"));
        }
        if data_directory.as_os_str().is_empty() {
            return Err(missing("data directory", "--data-directory", "DATA_DIRECTORY"));
        }
        if max_retries == 0 {
            return Err(ConductorError::args("--max-retries must be at least 1")
                .with_suggestion("Use --max-retries 10 to poll up to ten times"));
        }

        let expanded = shellexpand::tilde(&data_directory.to_string_lossy()).to_string();

        Ok(Self {
            category_id,
            organization,
            data_directory: PathBuf::from(expanded),
            max_retries,
            retry_delay: Duration::from_millis(retry_delay_ms),
        })
    }

    pub fn category_id(&self) -> &str {
        &self.category_id
    }

    pub fn organization(&self) -> &str {
        &self.organization
    }

    pub fn data_directory(&self) -> &Path {
        &self.data_directory
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn retry_delay(&self) -> Duration {
        self.retry_delay
    }
}

pub(crate) fn missing(what: &str, flag: &str, env: &str) -> ConductorError {
    ConductorError::args(format!("Missing required parameter: {}", what))
        .with_suggestion(format!("Pass {} or set the {} environment variable", flag, env))
        .with_default_suggestions()
}
