//! Command Runner
//!
//! 設定の解決・依存性の組み立て・コマンドの実行
//!
//! 依存関係はコマンド実行ごとに構築し、実行間で状態を共有しない

use log::info;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::adapter::config::Config;
use crate::adapter::http::HttpClient;
use crate::adapter::repositories::file_data_repository::FileDataRepository;
use crate::adapter::repositories::file_local_repository::FileLocalRepository;
use crate::adapter::repositories::lectern_dictionary_repository::LecternDictionaryRepository;
use crate::adapter::repositories::lyric_http_repository::LyricHttpRepository;
use crate::adapter::repositories::score_client_repository::ScoreClientRepository;
use crate::adapter::repositories::song_http_repository::SongHttpRepository;
use crate::application::dto::song_score_params::{
    expand, validate_analysis_id, validate_study_id, SongScoreParams, DEFAULT_MANIFEST_NAME,
};
use crate::application::dto::submission_params::{missing, SubmissionParams};
use crate::application::use_cases::song_score_workflow::SongScoreWorkflowUseCase;
use crate::application::use_cases::submit_lyric_data::SubmitLyricDataUseCase;
use crate::domain::entities::workflow_result::WorkflowResult;
use crate::domain::errors::{ConductorError, ConductorResult};
use crate::domain::services::retry_policy::RetryPolicy;

use super::cli::{
    Command, LyricUploadArgs, RetryArgs, ScoreUploadArgs, ServiceArgs, SongManifestArgs,
    SongPublishArgs, SongSubmitArgs, SongWorkflowArgs,
};
use super::report::CommandResult;

type SongWorkflow =
    SongScoreWorkflowUseCase<SongHttpRepository, ScoreClientRepository, FileLocalRepository>;

/// 設定ファイルの値にCLI引数・環境変数を上書きする
pub fn resolve_config(mut config: Config, services: &ServiceArgs) -> Config {
    fn apply(target: &mut String, value: &Option<String>) {
        if let Some(v) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            *target = v.to_string();
        }
    }

    apply(&mut config.lyric_url, &services.lyric_url);
    apply(&mut config.lectern_url, &services.lectern_url);
    apply(&mut config.song_url, &services.song_url);
    apply(&mut config.score_url, &services.score_url);

    if let Some(token) = services.auth_token.as_ref().filter(|t| !t.trim().is_empty()) {
        config.auth_token = Some(token.trim().to_string());
    }
    if let Some(secs) = services.timeout_secs {
        config.timeout_secs = secs;
    }
    config
}

/// コマンドランナー
pub struct CommandRunner {
    config: Config,
}

impl CommandRunner {
    pub fn new(config: Config, services: &ServiceArgs) -> Self {
        Self {
            config: resolve_config(config, services),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// コマンドを実行し、結果を返す（失敗もここで CommandResult に変換する）
    pub async fn run(&self, command: &Command) -> CommandResult {
        info!("Running {}", command.name());

        let outcome = match command {
            Command::LyricUpload(args) => self.lyric_upload(args).await,
            Command::SongWorkflow(args) => self.song_workflow(args).await,
            Command::SongSubmit(args) => self.song_submit(args).await,
            Command::SongManifest(args) => self.song_manifest(args).await,
            Command::ScoreUpload(args) => self.score_upload(args).await,
            Command::SongPublish(args) => self.song_publish(args).await,
        };

        outcome.unwrap_or_else(|e| CommandResult::from_error(&e))
    }

    async fn lyric_upload(&self, args: &LyricUploadArgs) -> ConductorResult<CommandResult> {
        let params = SubmissionParams::new(
            args.category_id.clone().unwrap_or_default(),
            args.organization.clone().unwrap_or_default(),
            args.data_directory.clone().unwrap_or_default(),
            args.retry.max_retries.unwrap_or(self.config.max_retries),
            args.retry.retry_delay.unwrap_or(self.config.retry_delay_ms),
        )?;

        println!("✓ Using Lyric at {}", self.config.lyric_url);
        println!("✓ Using Lectern at {}", self.config.lectern_url);

        let lyric = self.client("Lyric", &self.config.lyric_url)?;
        let lectern = self.client("Lectern", &self.config.lectern_url)?;
        let use_case = SubmitLyricDataUseCase::new(
            Arc::new(LyricHttpRepository::new(lyric.clone())),
            Arc::new(FileDataRepository::new()),
            Arc::new(LecternDictionaryRepository::new(lyric, lectern)),
        );

        let result = use_case.execute(&params).await?;
        let message = format!(
            "Submission {} committed to category {}",
            result.submission_id.as_deref().unwrap_or("?"),
            params.category_id()
        );
        Ok(CommandResult::from_workflow(&result, message))
    }

    async fn song_workflow(&self, args: &SongWorkflowArgs) -> ConductorResult<CommandResult> {
        let params = SongScoreParams::new(
            args.study_id.clone().unwrap_or_default(),
            args.analysis_file.clone().unwrap_or_default(),
            args.data_directory.clone().unwrap_or_default(),
            args.manifest_file.clone(),
            self.transient_policy(&args.retry),
        )?;

        println!("✓ Using SONG at {}", self.config.song_url);
        println!("✓ Using Score at {}", self.config.score_url);

        let result = self.song_use_case()?.execute(&params).await?;
        let message = format!(
            "Analysis {} published in study {}",
            result.analysis_id.as_deref().unwrap_or("?"),
            params.study_id()
        );

        let report = CommandResult::from_workflow(&result, message);
        Ok(match resume_hint(&result, &params) {
            Some(hint) if !report.success => report.with_leading_suggestion(hint),
            _ => report,
        })
    }

    async fn song_submit(&self, args: &SongSubmitArgs) -> ConductorResult<CommandResult> {
        let study_id = validate_study_id(args.study_id.as_deref().unwrap_or_default())?;
        let analysis_file = required_path(
            &args.analysis_file,
            missing("analysis file", "--analysis-file", "ANALYSIS_FILE"),
        )?;

        let analysis_id = self
            .song_use_case()?
            .submit_analysis(&study_id, &analysis_file, &self.transient_policy(&args.retry))
            .await?;

        let mut details = serde_json::Map::new();
        details.insert("analysisId".to_string(), analysis_id.clone().into());
        details.insert("studyId".to_string(), study_id.clone().into());
        Ok(CommandResult::ok(
            format!("Analysis {} submitted to study {}", analysis_id, study_id),
            details,
        ))
    }

    async fn song_manifest(&self, args: &SongManifestArgs) -> ConductorResult<CommandResult> {
        let study_id = validate_study_id(args.study_id.as_deref().unwrap_or_default())?;
        let analysis_id = validate_analysis_id(args.analysis_id.as_deref().unwrap_or_default())?;
        let data_directory = required_path(
            &args.data_directory,
            missing("data directory", "--data-directory", "DATA_DIRECTORY"),
        )?;
        let manifest_file = args
            .manifest_file
            .as_deref()
            .map(expand)
            .unwrap_or_else(|| data_directory.join(DEFAULT_MANIFEST_NAME));

        let manifest = self
            .song_use_case()?
            .generate_manifest(
                &study_id,
                &analysis_id,
                &data_directory,
                &manifest_file,
                &self.transient_policy(&args.retry),
            )
            .await?;

        let mut details = serde_json::Map::new();
        details.insert("analysisId".to_string(), analysis_id.into());
        details.insert(
            "manifestFile".to_string(),
            manifest_file.display().to_string().into(),
        );
        details.insert("fileCount".to_string(), manifest.entries.len().into());
        Ok(CommandResult::ok(
            format!("Manifest written to {}", manifest_file.display()),
            details,
        ))
    }

    async fn score_upload(&self, args: &ScoreUploadArgs) -> ConductorResult<CommandResult> {
        let manifest_file = required_path(
            &args.manifest_file,
            missing("manifest file", "--manifest-file", "MANIFEST_FILE"),
        )?;

        self.song_use_case()?
            .upload(&manifest_file, &self.transient_policy(&args.retry))
            .await?;

        let mut details = serde_json::Map::new();
        details.insert(
            "manifestFile".to_string(),
            manifest_file.display().to_string().into(),
        );
        Ok(CommandResult::ok("Files uploaded to Score", details))
    }

    async fn song_publish(&self, args: &SongPublishArgs) -> ConductorResult<CommandResult> {
        let study_id = validate_study_id(args.study_id.as_deref().unwrap_or_default())?;
        let analysis_id = validate_analysis_id(args.analysis_id.as_deref().unwrap_or_default())?;

        self.song_use_case()?
            .publish(&study_id, &analysis_id, &self.transient_policy(&args.retry))
            .await?;

        let mut details = serde_json::Map::new();
        details.insert("analysisId".to_string(), analysis_id.clone().into());
        details.insert("studyId".to_string(), study_id.into());
        Ok(CommandResult::ok(
            format!("Analysis {} published", analysis_id),
            details,
        ))
    }

    fn client(&self, service: &'static str, base_url: &str) -> ConductorResult<HttpClient> {
        HttpClient::new(
            service,
            base_url,
            self.config.auth_token.clone(),
            Duration::from_secs(self.config.timeout_secs),
        )
    }

    fn song_use_case(&self) -> ConductorResult<SongWorkflow> {
        let song = self.client("SONG", &self.config.song_url)?;
        let score = ScoreClientRepository::new(
            self.config.score_client_command.clone(),
            self.config.score_url.clone(),
            self.config.song_url.clone(),
            self.config.auth_token.clone(),
        );

        Ok(SongScoreWorkflowUseCase::new(
            Arc::new(SongHttpRepository::new(song)),
            Arc::new(score),
            Arc::new(FileLocalRepository::new()),
        ))
    }

    fn transient_policy(&self, retry: &RetryArgs) -> RetryPolicy {
        RetryPolicy::fixed(
            retry
                .max_retries
                .unwrap_or(self.config.transient_retry_attempts),
            retry
                .retry_delay
                .unwrap_or(self.config.transient_retry_delay_ms),
        )
    }
}

fn required_path(
    value: &Option<PathBuf>,
    missing_error: ConductorError,
) -> ConductorResult<PathBuf> {
    match value {
        Some(path) if !path.as_os_str().is_empty() => Ok(expand(path)),
        _ => Err(missing_error),
    }
}

/// 失敗したステップから再開するためのコマンド
fn resume_hint(result: &WorkflowResult, params: &SongScoreParams) -> Option<String> {
    let analysis_id = result.analysis_id.as_deref()?;

    if result.manifest_file.is_none() {
        Some(format!(
            "Rerun only this step: conductor song-manifest --study-id {} --analysis-id {} --data-directory {}",
            params.study_id(),
            analysis_id,
            params.data_directory().display()
        ))
    } else if !result.steps.uploaded {
        Some(format!(
            "Rerun only this step: conductor score-upload --manifest-file {}",
            params.manifest_file().display()
        ))
    } else if !result.steps.published {
        Some(format!(
            "Rerun only this step: conductor song-publish --study-id {} --analysis-id {}",
            params.study_id(),
            analysis_id
        ))
    } else {
        None
    }
}
