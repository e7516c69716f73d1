//! Lyric HTTP Repository Implementation
//!
//! LyricRepository の REST 実装

use async_trait::async_trait;
use log::debug;
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde::Deserialize;
use serde_json::Value;

use crate::adapter::http::HttpClient;
use crate::domain::entities::data_file::CsvFile;
use crate::domain::entities::submission::{Submission, SubmissionStatus, SubmitReceipt};
use crate::domain::errors::{ConductorError, ConductorResult};
use crate::domain::repositories::lyric_repository::LyricRepository;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitDataResponse {
    submission_id: Option<Value>,
    status: Option<String>,
    #[serde(default)]
    batch_errors: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct SubmissionResponse {
    status: Option<String>,
    errors: Option<Value>,
}

/// Lyric リポジトリ
pub struct LyricHttpRepository {
    client: HttpClient,
}

impl LyricHttpRepository {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    async fn build_form(organization: &str, files: &[CsvFile]) -> ConductorResult<Form> {
        let mut form = Form::new().text("organization", organization.to_string());

        for file in files {
            let data = tokio::fs::read(&file.path)
                .await
                .map_err(|e| ConductorError::from_io(&e, &file.path))?;
            debug!(
                "Attaching {} ({} bytes) as {}",
                file.path.display(),
                data.len(),
                file.upload_name
            );

            let part = Part::bytes(data)
                .file_name(file.upload_name.clone())
                .mime_str("text/csv")
                .map_err(|e| ConductorError::unexpected(format!("Invalid MIME type: {}", e)))?;
            form = form.part("files", part);
        }

        Ok(form)
    }
}

/// Lyric returns numeric ids; accept strings too
fn id_to_string(id: &Value) -> Option<String> {
    match id {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn batch_error_text(error: &Value) -> String {
    error
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| error.to_string())
}

#[async_trait]
impl LyricRepository for LyricHttpRepository {
    async fn submit_data(
        &self,
        category_id: &str,
        organization: &str,
        files: &[CsvFile],
    ) -> ConductorResult<SubmitReceipt> {
        let form = Self::build_form(organization, files).await?;
        let path = format!("/submission/category/{}/data", category_id);

        let response: SubmitDataResponse = self.client.post_multipart(&path, form).await?;

        if !response.batch_errors.is_empty() {
            let messages: Vec<String> = response.batch_errors.iter().map(batch_error_text).collect();
            return Err(ConductorError::validation(format!(
                "Lyric rejected the submission: {}",
                messages.join("; ")
            ))
            .with_detail("batchErrors", Value::Array(response.batch_errors))
            .with_default_suggestions());
        }

        let submission_id = response
            .submission_id
            .as_ref()
            .and_then(id_to_string)
            .ok_or_else(|| {
                ConductorError::connection("Lyric accepted the upload but returned no submission id")
                    .with_detail("url", self.client.url(&path))
                    .with_default_suggestions()
            })?;

        Ok(SubmitReceipt {
            submission_id,
            status: SubmissionStatus::from_remote(response.status.as_deref().unwrap_or_default()),
        })
    }

    async fn get_submission(&self, submission_id: &str) -> ConductorResult<Submission> {
        let path = format!("/submission/{}", submission_id);
        let response: SubmissionResponse = self.client.get_json(&path).await?;

        let status = response.status.ok_or_else(|| {
            ConductorError::connection(format!(
                "Lyric returned submission {} without a status",
                submission_id
            ))
        })?;

        let submission = Submission::new(submission_id, SubmissionStatus::from_remote(&status));
        Ok(match response.errors {
            Some(errors) if !errors.is_null() => submission.with_errors(errors),
            _ => submission,
        })
    }

    async fn commit(&self, category_id: &str, submission_id: &str) -> ConductorResult<()> {
        let path = format!(
            "/submission/category/{}/commit/{}",
            category_id, submission_id
        );
        self.client.send_empty(Method::POST, &path).await?;
        Ok(())
    }
}
