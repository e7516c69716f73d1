//! # Lyric Repository Trait
//!
//! Lyric サブミッションAPIを抽象化

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use crate::domain::entities::data_file::CsvFile;
use crate::domain::entities::submission::{SubmitReceipt, Submission};
use crate::domain::errors::ConductorResult;

/// Lyric リポジトリ
#[cfg_attr(test, automock)]
#[async_trait]
pub trait LyricRepository: Send + Sync {
    /// データファイルを提出してサブミッションを作成する
    ///
    /// # Errors
    ///
    /// レスポンスにサブミッションIDが無い場合は CONNECTION エラー
    async fn submit_data(
        &self,
        category_id: &str,
        organization: &str,
        files: &[CsvFile],
    ) -> ConductorResult<SubmitReceipt>;

    /// サブミッションの現在の状態を取得する
    async fn get_submission(&self, submission_id: &str) -> ConductorResult<Submission>;

    /// VALID なサブミッションをコミットする
    async fn commit(&self, category_id: &str, submission_id: &str) -> ConductorResult<()>;
}
