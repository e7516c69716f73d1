//! # Conductor Error Taxonomy
//!
//! ユーザー向けエラー分類（CONNECTION / AUTH / VALIDATION / FILE / ARGS / TIMEOUT）

use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

/// Result alias used by every workflow step
pub type ConductorResult<T> = std::result::Result<T, ConductorError>;

/// エラー種別
///
/// CLIの終了時に表示されるエラーコードに対応する
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// 接続拒否・タイムアウト・DNS解決失敗
    Connection,
    /// 401 / 403
    Auth,
    /// 400 / 422 / ビジネスルール違反
    Validation,
    /// ローカルファイルの欠落・空・読み取り不可
    File,
    /// CLIパラメータの不足・不正
    Args,
    /// ポーリング上限到達（VALIDATIONの派生）
    Timeout,
}

impl ErrorKind {
    /// エラーコード文字列
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::Connection => "CONNECTION",
            ErrorKind::Auth => "AUTH",
            ErrorKind::Validation => "VALIDATION",
            ErrorKind::File => "FILE",
            ErrorKind::Args => "ARGS",
            ErrorKind::Timeout => "TIMEOUT",
        }
    }

    /// Generic remediation advice, used when a call site has nothing more specific
    pub fn default_suggestions(&self) -> Vec<String> {
        let items: &[&str] = match self {
            ErrorKind::Connection => &[
                "Check that the service is running and reachable",
                "Verify the service URL (flag, environment variable or config file)",
                "Retry the command once the service is available",
            ],
            ErrorKind::Auth => &[
                "Check that the auth token is set and has not expired",
                "Verify the token has write access for this study or category",
            ],
            ErrorKind::Validation => &[
                "Review the validation messages above and fix the input data",
            ],
            ErrorKind::File => &[
                "Check that the path exists and is readable",
                "Make sure the file is not empty",
            ],
            ErrorKind::Args => &["Run the command with --help to see the required parameters"],
            ErrorKind::Timeout => &[
                "Increase --max-retries or --retry-delay",
                "Check the submission status later; it may still be processing",
            ],
        };
        items.iter().map(|s| s.to_string()).collect()
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// 分類済みエラー
///
/// メッセージ・修正提案・詳細情報を保持する。`logged` フラグにより
/// コマンド境界でのログ出力を一度だけに制限する。
#[derive(Debug, Error)]
#[error("[{kind}] {message}")]
pub struct ConductorError {
    kind: ErrorKind,
    message: String,
    suggestions: Vec<String>,
    details: Map<String, Value>,
    retryable: bool,
    logged: AtomicBool,
}

impl ConductorError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            suggestions: Vec::new(),
            details: Map::new(),
            retryable: false,
            logged: AtomicBool::new(false),
        }
    }

    pub fn connection(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Connection, message)
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Auth, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn file(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::File, message)
    }

    pub fn args(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Args, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, message)
    }

    /// Fallback for anything that could not be classified
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::connection(message).with_default_suggestions()
    }

    /// ローカルI/Oエラーを FILE エラーに変換
    pub fn from_io(err: &std::io::Error, path: &Path) -> Self {
        Self::file(format!("{}: {}", path.display(), err))
            .with_detail("path", path.display().to_string())
            .with_default_suggestions()
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_suggestions<I, S>(mut self, suggestions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.suggestions
            .extend(suggestions.into_iter().map(Into::into));
        self
    }

    /// Appends the kind's generic advice after any specific suggestions
    pub fn with_default_suggestions(self) -> Self {
        let defaults = self.kind.default_suggestions();
        self.with_suggestions(defaults)
    }

    pub fn with_detail(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }

    pub fn retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    pub fn details(&self) -> &Map<String, Value> {
        &self.details
    }

    /// 一時的なネットワークエラーかどうか（リトライ対象）
    pub fn is_transient(&self) -> bool {
        self.retryable
    }

    /// ログ済みとしてマークする
    ///
    /// 初回呼び出しのみ `true` を返す
    pub fn mark_logged(&self) -> bool {
        !self.logged.swap(true, Ordering::SeqCst)
    }

    pub fn is_logged(&self) -> bool {
        self.logged.load(Ordering::SeqCst)
    }
}
