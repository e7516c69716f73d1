//! # Retry Policy
//!
//! ポーリングと一時エラーのリトライ設定

use std::time::Duration;

/// Lyric status polling defaults
pub const DEFAULT_MAX_RETRIES: u32 = 10;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 20_000;

/// Transient network retry defaults for SONG/Score steps
pub const DEFAULT_TRANSIENT_ATTEMPTS: u32 = 3;
pub const DEFAULT_TRANSIENT_DELAY_MS: u64 = 2_000;

/// 固定間隔のリトライ設定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 最初の試行を含む最大試行回数
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    /// `max_attempts` は最低1回に丸める
    pub fn fixed(max_attempts: u32, delay_ms: u64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay: Duration::from_millis(delay_ms),
        }
    }

    /// リトライなし
    pub fn once() -> Self {
        Self::fixed(1, 0)
    }

    /// `attempt`（1始まり）の後にもう一度試行できるか
    #[inline]
    pub fn allows_another(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fixed(DEFAULT_TRANSIENT_ATTEMPTS, DEFAULT_TRANSIENT_DELAY_MS)
    }
}
