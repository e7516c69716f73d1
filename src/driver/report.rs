//! Command Result Reporting
//!
//! ワークフロー結果・エラーをコマンド結果に変換し、端末に表示する

use log::error;
use serde::Serialize;
use serde_json::{Map, Value};
use std::process::ExitCode;

use crate::domain::entities::workflow_result::WorkflowResult;
use crate::domain::errors::ConductorError;

/// コマンドの実行結果
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResult {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
    pub details: Map<String, Value>,
}

impl CommandResult {
    pub fn ok(message: impl Into<String>, details: Map<String, Value>) -> Self {
        Self {
            success: true,
            message: message.into(),
            error_code: None,
            suggestions: Vec::new(),
            details,
        }
    }

    /// エラーから失敗結果を作る
    ///
    /// エラーはここで一度だけログに出力される
    pub fn from_error(err: &ConductorError) -> Self {
        log_once(err);

        Self {
            success: false,
            message: err.message().to_string(),
            error_code: Some(err.kind().code().to_string()),
            suggestions: err.suggestions().to_vec(),
            details: err.details().clone(),
        }
    }

    /// 設定ファイルの読み込み失敗を ARGS エラーとして報告する
    pub fn from_config_error(err: &anyhow::Error, path: &str) -> Self {
        let err = ConductorError::args(format!("{:#}", err))
            .with_detail("configFile", path)
            .with_suggestion(format!("Fix the JSON in {}", path))
            .with_suggestion("Or point --config at another file");
        Self::from_error(&err)
    }

    /// ワークフロー結果から作る（部分的成功は失敗として扱う）
    pub fn from_workflow(result: &WorkflowResult, success_message: impl Into<String>) -> Self {
        let mut details = result.to_details();

        match &result.failure {
            None => Self::ok(success_message, details),
            Some(err) => {
                log_once(err);
                if !err.details().is_empty() {
                    details.insert("error".to_string(), Value::Object(err.details().clone()));
                }
                Self {
                    success: false,
                    message: format!("Workflow stopped after partial progress: {}", err.message()),
                    error_code: Some(err.kind().code().to_string()),
                    suggestions: err.suggestions().to_vec(),
                    details,
                }
            }
        }
    }

    /// Prepends a suggestion so it is shown first
    pub fn with_leading_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.insert(0, suggestion.into());
        self
    }

    pub fn exit_code(&self) -> ExitCode {
        if self.success {
            ExitCode::SUCCESS
        } else {
            ExitCode::from(1)
        }
    }

    /// 端末表示用の文字列
    pub fn render(&self) -> String {
        let mut out = String::new();

        if self.success {
            out.push_str(&format!("✓ {}\n", self.message));
        } else {
            let code = self.error_code.as_deref().unwrap_or("ERROR");
            out.push_str(&format!("✗ [{}] {}\n", code, self.message));
        }

        for (key, value) in &self.details {
            match value {
                Value::String(s) => out.push_str(&format!("  {}: {}\n", key, s)),
                Value::Object(steps) if key == "steps" => {
                    out.push_str(&format!("  steps: {}\n", render_steps(steps)))
                }
                Value::Object(_) if !self.success => {}
                other => out.push_str(&format!("  {}: {}\n", key, other)),
            }
        }

        if !self.suggestions.is_empty() {
            out.push_str("\nSuggestions:\n");
            for suggestion in &self.suggestions {
                out.push_str(&format!("  • {}\n", suggestion));
            }
        }

        out
    }

    pub fn print(&self) {
        if self.success {
            print!("{}", self.render());
        } else {
            eprint!("{}", self.render());
        }
    }
}

/// `submitted ✓ uploaded ✗ published ✗`
fn render_steps(steps: &Map<String, Value>) -> String {
    ["submitted", "uploaded", "published"]
        .iter()
        .filter_map(|step| {
            steps
                .get(*step)
                .and_then(Value::as_bool)
                .map(|done| format!("{} {}", step, if done { "✓" } else { "✗" }))
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn log_once(err: &ConductorError) {
    if err.mark_logged() {
        error!("{}", err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::workflow_result::WorkflowStatus;
    use crate::domain::errors::ErrorKind;
    use serde_json::json;

    #[test]
    fn test_from_error() {
        let err = ConductorError::file("Data directory does not exist: /nope")
            .with_detail("path", "/nope")
            .with_suggestion("Check the path");

        let result = CommandResult::from_error(&err);

        assert!(!result.success);
        assert_eq!(result.error_code.as_deref(), Some("FILE"));
        assert_eq!(result.details["path"], "/nope");
        assert!(err.is_logged());
    }

    #[test]
    fn test_from_config_error() {
        let err = anyhow::anyhow!("expected value at line 1 column 3")
            .context("Failed to parse config file: /etc/conductor.json");

        let result = CommandResult::from_config_error(&err, "/etc/conductor.json");

        assert!(!result.success);
        assert_eq!(result.error_code.as_deref(), Some("ARGS"));
        assert!(result.message.contains("Failed to parse config file"));
        assert!(result.message.contains("line 1 column 3"));
        assert_eq!(result.details["configFile"], "/etc/conductor.json");
        assert!(result
            .render()
            .contains("Suggestions:\n  • Fix the JSON in /etc/conductor.json\n"));
    }

    #[test]
    fn test_error_logged_once() {
        let err = ConductorError::new(ErrorKind::Auth, "401");
        CommandResult::from_error(&err);
        assert!(!err.mark_logged());
    }

    #[test]
    fn test_render_failure_lists_suggestions() {
        let err = ConductorError::validation("Submission 12 failed validation")
            .with_suggestion("Fix row 3 of donor.csv")
            .with_suggestion("Resubmit the directory");

        let text = CommandResult::from_error(&err).render();

        assert!(text.starts_with("✗ [VALIDATION] Submission 12 failed validation"));
        assert!(text.contains("Suggestions:\n  • Fix row 3 of donor.csv\n  • Resubmit the directory\n"));
    }

    #[test]
    fn test_from_successful_workflow() {
        let mut workflow = WorkflowResult::new();
        workflow.submission_id = Some("12".to_string());
        let workflow = workflow.finish(WorkflowStatus::Committed);

        let result = CommandResult::from_workflow(&workflow, "Submission 12 committed");

        assert!(result.success);
        assert_eq!(result.details["status"], "COMMITTED");
        assert!(result.render().starts_with("✓ Submission 12 committed"));
    }

    #[test]
    fn test_from_partial_workflow() {
        let mut workflow = WorkflowResult::new();
        workflow.analysis_id = Some("an-1".to_string());
        workflow.steps.submitted = true;
        let workflow = workflow.partial(
            ConductorError::connection("Score upload failed (exit 1)").with_detail("manifestFile", "/m"),
        );

        let result = CommandResult::from_workflow(&workflow, "unused")
            .with_leading_suggestion("Rerun score-upload");

        assert!(!result.success);
        assert_eq!(result.error_code.as_deref(), Some("CONNECTION"));
        assert_eq!(
            result.details["steps"],
            json!({"submitted": true, "uploaded": false, "published": false})
        );
        assert_eq!(result.details["error"]["manifestFile"], "/m");
        assert_eq!(result.suggestions[0], "Rerun score-upload");
        assert!(result.message.contains("Score upload failed"));

        let text = result.render();
        assert!(text.contains("  steps: submitted ✓ uploaded ✗ published ✗\n"));
        assert!(text.contains("  analysisId: an-1\n"));
        assert!(!text.contains("manifestFile"));
    }
}
