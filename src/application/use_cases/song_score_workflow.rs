//! # SONG/Score Workflow Use Case
//!
//! アナリシス提出 → マニフェスト生成 → Score アップロード → 公開
//!
//! 各ステップは一時的なネットワークエラーのみリトライする。提出後のステップが
//! 失敗した場合はエラーではなく部分的成功として `WorkflowResult` を返す。

use log::info;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::application::dto::song_score_params::SongScoreParams;
use crate::application::retry::with_transient_retry;
use crate::domain::entities::manifest::Manifest;
use crate::domain::entities::workflow_result::{WorkflowResult, WorkflowStatus};
use crate::domain::errors::{ConductorError, ConductorResult};
use crate::domain::repositories::local_file_repository::LocalFileRepository;
use crate::domain::repositories::score_repository::ScoreRepository;
use crate::domain::repositories::song_repository::SongRepository;
use crate::domain::services::retry_policy::RetryPolicy;

/// SONG/Score ワークフローユースケース
pub struct SongScoreWorkflowUseCase<S, U, L>
where
    S: SongRepository,
    U: ScoreRepository,
    L: LocalFileRepository,
{
    song_repository: Arc<S>,
    score_repository: Arc<U>,
    file_repository: Arc<L>,
}

impl<S, U, L> SongScoreWorkflowUseCase<S, U, L>
where
    S: SongRepository,
    U: ScoreRepository,
    L: LocalFileRepository,
{
    pub fn new(song_repository: Arc<S>, score_repository: Arc<U>, file_repository: Arc<L>) -> Self {
        Self {
            song_repository,
            score_repository,
            file_repository,
        }
    }

    /// 4ステップ全てを実行する
    ///
    /// # Errors
    ///
    /// 提出ステップの失敗のみエラーとして返す。以降の失敗は
    /// `WorkflowStatus::PartialSuccess` として結果に記録される。
    pub async fn execute(&self, params: &SongScoreParams) -> ConductorResult<WorkflowResult> {
        let retry = params.retry();

        let analysis_id = self
            .submit_analysis(params.study_id(), params.analysis_file(), retry)
            .await?;

        let mut result = WorkflowResult::new();
        result.analysis_id = Some(analysis_id.clone());
        result.steps.submitted = true;

        if let Err(e) = self
            .generate_manifest(
                params.study_id(),
                &analysis_id,
                params.data_directory(),
                params.manifest_file(),
                retry,
            )
            .await
        {
            return Ok(result.partial(e));
        }
        result.manifest_file = Some(params.manifest_file().to_path_buf());

        if let Err(e) = self.upload(params.manifest_file(), retry).await {
            return Ok(result.partial(e));
        }
        result.steps.uploaded = true;

        if let Err(e) = self.publish(params.study_id(), &analysis_id, retry).await {
            return Ok(result.partial(e));
        }
        result.steps.published = true;

        Ok(result.finish(WorkflowStatus::Published))
    }

    /// アナリシスJSONを提出して analysisId を返す
    pub async fn submit_analysis(
        &self,
        study_id: &str,
        analysis_file: &Path,
        retry: &RetryPolicy,
    ) -> ConductorResult<String> {
        let analysis = self.file_repository.read_analysis(analysis_file).await?;
        check_study_matches(&analysis, study_id, analysis_file)?;

        let analysis_id = with_transient_retry("Analysis submission", retry, || {
            self.song_repository.submit_analysis(study_id, &analysis)
        })
        .await?;

        if analysis_id.trim().is_empty() {
            return Err(ConductorError::connection(
                "SONG accepted the analysis but returned no analysis id",
            )
            .with_default_suggestions());
        }

        info!("Analysis {} submitted to study {}", analysis_id, study_id);
        Ok(analysis_id)
    }

    /// SONG のファイル情報からマニフェストを生成して書き出す
    pub async fn generate_manifest(
        &self,
        study_id: &str,
        analysis_id: &str,
        data_directory: &Path,
        manifest_file: &Path,
        retry: &RetryPolicy,
    ) -> ConductorResult<Manifest> {
        let analysis = with_transient_retry("Analysis lookup", retry, || {
            self.song_repository.get_analysis(study_id, analysis_id)
        })
        .await?;

        if analysis.files.is_empty() {
            return Err(ConductorError::validation(format!(
                "Analysis {} has no files to upload",
                analysis_id
            ))
            .with_detail("analysisId", analysis_id)
            .with_suggestion("Check the 'files' section of the analysis JSON"));
        }

        let manifest = Manifest::from_analysis(&analysis, &data_directory.to_string_lossy());
        self.file_repository
            .write_manifest(manifest_file, &manifest)
            .await?;

        info!(
            "Manifest with {} file(s) written to {}",
            manifest.entries.len(),
            manifest_file.display()
        );
        Ok(manifest)
    }

    /// マニフェストに記載されたファイルを Score にアップロードする
    ///
    /// # Errors
    ///
    /// マニフェストが参照するローカルファイルが無ければ、アップロード前に FILE エラー
    pub async fn upload(&self, manifest_file: &Path, retry: &RetryPolicy) -> ConductorResult<()> {
        let manifest = self.file_repository.read_manifest(manifest_file).await?;

        let paths: Vec<PathBuf> = manifest
            .entries
            .iter()
            .map(|e| PathBuf::from(&e.file_path))
            .collect();
        let missing = self.file_repository.missing_files(&paths).await;
        if !missing.is_empty() {
            let listed: Vec<String> = missing.iter().map(|p| p.display().to_string()).collect();
            return Err(ConductorError::file(format!(
                "Files referenced by the manifest are missing: {}",
                listed.join(", ")
            ))
            .with_detail("missingFiles", listed)
            .with_suggestion("Place the data files in the data directory used to build the manifest"));
        }

        with_transient_retry("Score upload", retry, || {
            self.score_repository.upload(manifest_file)
        })
        .await?;

        info!(
            "Uploaded {} file(s) for analysis {}",
            manifest.entries.len(),
            manifest.analysis_id
        );
        Ok(())
    }

    /// アナリシスを公開する
    pub async fn publish(
        &self,
        study_id: &str,
        analysis_id: &str,
        retry: &RetryPolicy,
    ) -> ConductorResult<()> {
        with_transient_retry("Analysis publish", retry, || {
            self.song_repository.publish(study_id, analysis_id)
        })
        .await?;

        info!("Analysis {} published", analysis_id);
        Ok(())
    }
}

fn check_study_matches(analysis: &Value, study_id: &str, path: &Path) -> ConductorResult<()> {
    match analysis.get("studyId").and_then(Value::as_str) {
        Some(declared) if declared != study_id => Err(ConductorError::validation(format!(
            "{} declares studyId '{}' but the submission targets study '{}'",
            path.display(),
            declared,
            study_id
        ))
        .with_suggestion(format!(
            "Use --study-id {} or update the studyId field in the analysis file",
            declared
        ))),
        _ => Ok(()),
    }
}
