//! # SONG Repository Trait
//!
//! SONG メタデータAPIを抽象化

use async_trait::async_trait;
use serde_json::Value;

#[cfg(test)]
use mockall::automock;

use crate::domain::entities::analysis::Analysis;
use crate::domain::errors::ConductorResult;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait SongRepository: Send + Sync {
    /// アナリシスJSONを提出し、analysisId を返す
    async fn submit_analysis(&self, study_id: &str, analysis: &Value) -> ConductorResult<String>;

    /// アナリシスとファイル情報を取得する
    async fn get_analysis(&self, study_id: &str, analysis_id: &str) -> ConductorResult<Analysis>;

    /// アナリシスを公開する
    async fn publish(&self, study_id: &str, analysis_id: &str) -> ConductorResult<()>;
}
