//! # Submission Entity
//!
//! Lyric 側のサブミッションとその状態

use serde_json::Value;

/// サブミッション状態
///
/// 状態遷移はリモート側で決まる。クライアントは観測するだけ。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionStatus {
    Pending,
    Valid,
    Invalid,
    Committed,
}

impl SubmissionStatus {
    /// Lyric の状態文字列を解釈する
    ///
    /// `OPEN` / `PROCESSING` など未知の値は PENDING として扱う
    pub fn from_remote(status: &str) -> Self {
        match status.trim().to_ascii_uppercase().as_str() {
            "VALID" => SubmissionStatus::Valid,
            "INVALID" => SubmissionStatus::Invalid,
            "COMMITTED" => SubmissionStatus::Committed,
            _ => SubmissionStatus::Pending,
        }
    }

    /// ポーリングを終了すべき状態か
    #[inline]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SubmissionStatus::Pending)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Pending => "PENDING",
            SubmissionStatus::Valid => "VALID",
            SubmissionStatus::Invalid => "INVALID",
            SubmissionStatus::Committed => "COMMITTED",
        }
    }
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// サブミッション
#[derive(Debug, Clone)]
pub struct Submission {
    pub submission_id: String,
    pub status: SubmissionStatus,
    /// Raw `errors` payload reported for an INVALID submission
    pub errors: Option<Value>,
}

impl Submission {
    pub fn new(submission_id: impl Into<String>, status: SubmissionStatus) -> Self {
        Self {
            submission_id: submission_id.into(),
            status,
            errors: None,
        }
    }

    pub fn with_errors(mut self, errors: Value) -> Self {
        self.errors = Some(errors);
        self
    }
}

/// Response of the multipart submit call
#[derive(Debug, Clone)]
pub struct SubmitReceipt {
    pub submission_id: String,
    pub status: SubmissionStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_remote_known_statuses() {
        assert_eq!(SubmissionStatus::from_remote("VALID"), SubmissionStatus::Valid);
        assert_eq!(SubmissionStatus::from_remote("invalid"), SubmissionStatus::Invalid);
        assert_eq!(
            SubmissionStatus::from_remote("COMMITTED"),
            SubmissionStatus::Committed
        );
    }

    #[test]
    fn test_from_remote_unknown_is_pending() {
        assert_eq!(SubmissionStatus::from_remote("OPEN"), SubmissionStatus::Pending);
        assert_eq!(
            SubmissionStatus::from_remote("PROCESSING"),
            SubmissionStatus::Pending
        );
        assert_eq!(SubmissionStatus::from_remote(""), SubmissionStatus::Pending);
    }

    #[test]
    fn test_is_terminal() {
        assert!(!SubmissionStatus::Pending.is_terminal());
        assert!(SubmissionStatus::Valid.is_terminal());
        assert!(SubmissionStatus::Invalid.is_terminal());
        assert!(SubmissionStatus::Committed.is_terminal());
    }
}
