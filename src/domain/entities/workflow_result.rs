//! # Workflow Result
//!
//! ワークフローの各ステップの進捗を記録する監査証跡

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::path::PathBuf;

use crate::domain::errors::ConductorError;

/// ワークフロー状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowStatus {
    InProgress,
    /// Lyric submission committed
    Committed,
    /// SONG analysis published
    Published,
    /// A single step finished (step-only commands)
    Completed,
    /// 前半のステップは成功、後半で失敗
    PartialSuccess,
}

/// ステップごとの完了フラグ
///
/// Lyric では `uploaded` はデータファイルの受理、`published` はコミットを表す
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WorkflowSteps {
    pub submitted: bool,
    pub uploaded: bool,
    pub published: bool,
}

/// ワークフロー結果
#[derive(Debug)]
pub struct WorkflowResult {
    pub analysis_id: Option<String>,
    pub submission_id: Option<String>,
    pub status: WorkflowStatus,
    pub steps: WorkflowSteps,
    pub manifest_file: Option<PathBuf>,
    /// 途中で失敗したステップのエラー
    pub failure: Option<ConductorError>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl WorkflowResult {
    pub fn new() -> Self {
        Self {
            analysis_id: None,
            submission_id: None,
            status: WorkflowStatus::InProgress,
            steps: WorkflowSteps::default(),
            manifest_file: None,
            failure: None,
            finished_at: None,
        }
    }

    /// 成功として終了
    pub fn finish(mut self, status: WorkflowStatus) -> Self {
        self.status = status;
        self.finished_at = Some(Utc::now());
        self
    }

    /// 部分的成功として終了
    pub fn partial(mut self, failure: ConductorError) -> Self {
        self.status = WorkflowStatus::PartialSuccess;
        self.failure = Some(failure);
        self.finished_at = Some(Utc::now());
        self
    }

    pub fn is_success(&self) -> bool {
        self.failure.is_none() && self.status != WorkflowStatus::InProgress
    }

    /// CommandResult の details に載せる内容
    pub fn to_details(&self) -> Map<String, Value> {
        let mut details = Map::new();
        if let Some(id) = &self.analysis_id {
            details.insert("analysisId".to_string(), json!(id));
        }
        if let Some(id) = &self.submission_id {
            details.insert("submissionId".to_string(), json!(id));
        }
        details.insert("status".to_string(), json!(self.status));
        details.insert("steps".to_string(), json!(self.steps));
        if let Some(path) = &self.manifest_file {
            details.insert("manifestFile".to_string(), json!(path.display().to_string()));
        }
        if let Some(at) = &self.finished_at {
            details.insert("finishedAt".to_string(), json!(at.to_rfc3339()));
        }
        details
    }
}

impl Default for WorkflowResult {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_not_success() {
        let result = WorkflowResult::new();
        assert!(!result.is_success());
        assert_eq!(result.steps, WorkflowSteps::default());
    }

    #[test]
    fn test_finish_marks_success() {
        let result = WorkflowResult::new().finish(WorkflowStatus::Committed);
        assert!(result.is_success());
        assert!(result.finished_at.is_some());
    }

    #[test]
    fn test_partial_keeps_steps() {
        let mut result = WorkflowResult::new();
        result.analysis_id = Some("an-1".to_string());
        result.steps.submitted = true;

        let result = result.partial(ConductorError::connection("upload failed"));

        assert!(!result.is_success());
        assert_eq!(result.status, WorkflowStatus::PartialSuccess);
        assert_eq!(
            result.steps,
            WorkflowSteps {
                submitted: true,
                uploaded: false,
                published: false
            }
        );
    }

    #[test]
    fn test_to_details() {
        let mut result = WorkflowResult::new();
        result.submission_id = Some("42".to_string());
        result.steps.submitted = true;
        let details = result.finish(WorkflowStatus::Committed).to_details();

        assert_eq!(details["submissionId"], "42");
        assert_eq!(details["status"], "COMMITTED");
        assert_eq!(details["steps"]["submitted"], true);
        assert!(!details.contains_key("analysisId"));
    }
}
