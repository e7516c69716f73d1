//! SONG HTTP Repository Implementation
//!
//! SongRepository の REST 実装

use async_trait::async_trait;
use log::debug;
use reqwest::Method;
use serde::Deserialize;
use serde_json::Value;

use crate::adapter::http::HttpClient;
use crate::domain::entities::analysis::Analysis;
use crate::domain::errors::{ConductorError, ConductorResult};
use crate::domain::repositories::song_repository::SongRepository;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitAnalysisResponse {
    analysis_id: Option<String>,
    status: Option<String>,
}

/// SONG リポジトリ
pub struct SongHttpRepository {
    client: HttpClient,
}

impl SongHttpRepository {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SongRepository for SongHttpRepository {
    async fn submit_analysis(&self, study_id: &str, analysis: &Value) -> ConductorResult<String> {
        let path = format!("/submit/{}", study_id);
        let response: SubmitAnalysisResponse = self.client.post_json(&path, analysis).await?;

        debug!(
            "SONG submit status: {}",
            response.status.as_deref().unwrap_or("unknown")
        );

        response
            .analysis_id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| {
                ConductorError::connection("SONG accepted the analysis but returned no analysisId")
                    .with_detail("url", self.client.url(&path))
                    .with_default_suggestions()
            })
    }

    async fn get_analysis(&self, study_id: &str, analysis_id: &str) -> ConductorResult<Analysis> {
        let path = format!("/studies/{}/analysis/{}", study_id, analysis_id);
        self.client.get_json(&path).await
    }

    async fn publish(&self, study_id: &str, analysis_id: &str) -> ConductorResult<()> {
        let path = format!("/studies/{}/analysis/publish/{}", study_id, analysis_id);
        self.client.send_empty(Method::PUT, &path).await?;
        Ok(())
    }
}
