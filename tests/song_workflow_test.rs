//! SONG/Score Workflow Integration Tests
//!
//! 実ファイルのマニフェスト読み書きと SONG / Score フェイクを組み合わせた統合テスト

use async_trait::async_trait;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use conductor::adapter::repositories::file_local_repository::FileLocalRepository;
use conductor::application::dto::song_score_params::SongScoreParams;
use conductor::application::use_cases::song_score_workflow::SongScoreWorkflowUseCase;
use conductor::domain::entities::analysis::{Analysis, AnalysisFile};
use conductor::domain::entities::workflow_result::{WorkflowStatus, WorkflowSteps};
use conductor::domain::errors::{ConductorError, ConductorResult, ErrorKind};
use conductor::domain::repositories::score_repository::ScoreRepository;
use conductor::domain::repositories::song_repository::SongRepository;
use conductor::domain::services::retry_policy::RetryPolicy;
use conductor::driver::report::CommandResult;

const ANALYSIS_ID: &str = "6e3b2a0c-8f4e-4c36-9b7a-1d2f3e4a5b6c";

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// SONG フェイク
#[derive(Default)]
struct FakeSong {
    submitted: Mutex<Vec<Value>>,
    published: Mutex<Vec<String>>,
}

#[async_trait]
impl SongRepository for FakeSong {
    async fn submit_analysis(&self, _study_id: &str, analysis: &Value) -> ConductorResult<String> {
        self.submitted.lock().unwrap().push(analysis.clone());
        Ok(ANALYSIS_ID.to_string())
    }

    async fn get_analysis(&self, study_id: &str, analysis_id: &str) -> ConductorResult<Analysis> {
        Ok(Analysis {
            analysis_id: analysis_id.to_string(),
            study_id: Some(study_id.to_string()),
            analysis_state: Some("UNPUBLISHED".to_string()),
            files: vec![AnalysisFile {
                object_id: "a1".to_string(),
                file_name: "sample-01.bam".to_string(),
                file_md5sum: "9a0364b9e99bb480dd25e1f0284c8555".to_string(),
            }],
        })
    }

    async fn publish(&self, _study_id: &str, analysis_id: &str) -> ConductorResult<()> {
        self.published.lock().unwrap().push(analysis_id.to_string());
        Ok(())
    }
}

/// Score フェイク（失敗を指定できる）
struct FakeScore {
    fail_with: Option<(ErrorKind, bool)>,
    manifests: Mutex<Vec<PathBuf>>,
}

impl FakeScore {
    fn ok() -> Self {
        Self {
            fail_with: None,
            manifests: Mutex::new(Vec::new()),
        }
    }

    fn failing(kind: ErrorKind, retryable: bool) -> Self {
        Self {
            fail_with: Some((kind, retryable)),
            manifests: Mutex::new(Vec::new()),
        }
    }

    fn attempts(&self) -> usize {
        self.manifests.lock().unwrap().len()
    }
}

#[async_trait]
impl ScoreRepository for FakeScore {
    async fn upload(&self, manifest_file: &Path) -> ConductorResult<()> {
        self.manifests
            .lock()
            .unwrap()
            .push(manifest_file.to_path_buf());
        match self.fail_with {
            Some((kind, retryable)) => {
                Err(ConductorError::new(kind, "Score upload failed (exit 1)").retryable(retryable))
            }
            None => Ok(()),
        }
    }
}

fn workspace(with_data_file: bool) -> TempDir {
    let dir = TempDir::new().unwrap();
    if with_data_file {
        fs::write(dir.path().join("sample-01.bam"), "BAM-CONTENT").unwrap();
    }
    dir
}

fn params(dir: &Path) -> SongScoreParams {
    SongScoreParams::new(
        "demo",
        fixture("analysis.json"),
        dir,
        None,
        RetryPolicy::fixed(2, 1),
    )
    .unwrap()
}

fn use_case(
    song: Arc<FakeSong>,
    score: Arc<FakeScore>,
) -> SongScoreWorkflowUseCase<FakeSong, FakeScore, FileLocalRepository> {
    SongScoreWorkflowUseCase::new(song, score, Arc::new(FileLocalRepository::new()))
}

#[tokio::test]
async fn test_full_workflow_publishes_analysis() {
    let dir = workspace(true);
    let song = Arc::new(FakeSong::default());
    let score = Arc::new(FakeScore::ok());

    let result = use_case(song.clone(), score.clone())
        .execute(&params(dir.path()))
        .await
        .unwrap();

    assert_eq!(result.status, WorkflowStatus::Published);
    assert_eq!(result.analysis_id.as_deref(), Some(ANALYSIS_ID));
    assert_eq!(
        result.steps,
        WorkflowSteps {
            submitted: true,
            uploaded: true,
            published: true
        }
    );

    let manifest_path = dir.path().join("manifest.txt");
    let expected = format!(
        "{}\t\t\na1\t{}/sample-01.bam\t9a0364b9e99bb480dd25e1f0284c8555\n",
        ANALYSIS_ID,
        dir.path().display()
    );
    assert_eq!(fs::read_to_string(&manifest_path).unwrap(), expected);
    assert_eq!(*score.manifests.lock().unwrap(), vec![manifest_path]);
    assert_eq!(*song.published.lock().unwrap(), vec![ANALYSIS_ID.to_string()]);

    let submitted = song.submitted.lock().unwrap();
    assert_eq!(submitted[0]["studyId"], "demo");
}

#[tokio::test]
async fn test_upload_failure_is_partial_success() {
    let dir = workspace(true);
    let song = Arc::new(FakeSong::default());
    let score = Arc::new(FakeScore::failing(ErrorKind::Validation, false));

    let result = use_case(song.clone(), score)
        .execute(&params(dir.path()))
        .await
        .unwrap();

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
    assert!(song.published.lock().unwrap().is_empty());

    let report = CommandResult::from_workflow(&result, "unused");
    assert!(!report.success);
    assert_eq!(report.error_code.as_deref(), Some("VALIDATION"));
    assert_eq!(report.details["analysisId"], ANALYSIS_ID);
}

#[tokio::test]
async fn test_only_transient_upload_failures_are_retried() {
    let dir = workspace(true);

    let transient = Arc::new(FakeScore::failing(ErrorKind::Connection, true));
    let result = use_case(Arc::new(FakeSong::default()), transient.clone())
        .execute(&params(dir.path()))
        .await
        .unwrap();
    assert_eq!(result.status, WorkflowStatus::PartialSuccess);
    assert_eq!(transient.attempts(), 2);

    let hard = Arc::new(FakeScore::failing(ErrorKind::Auth, false));
    let result = use_case(Arc::new(FakeSong::default()), hard.clone())
        .execute(&params(dir.path()))
        .await
        .unwrap();
    assert_eq!(result.failure.as_ref().unwrap().kind(), ErrorKind::Auth);
    assert_eq!(hard.attempts(), 1);
}

#[tokio::test]
async fn test_missing_data_file_stops_before_upload() {
    let dir = workspace(false);
    let score = Arc::new(FakeScore::ok());

    let result = use_case(Arc::new(FakeSong::default()), score.clone())
        .execute(&params(dir.path()))
        .await
        .unwrap();

    assert_eq!(result.status, WorkflowStatus::PartialSuccess);
    assert!(result.manifest_file.is_some());
    let failure = result.failure.as_ref().unwrap();
    assert_eq!(failure.kind(), ErrorKind::File);
    assert!(failure.message().contains("sample-01.bam"));
    assert_eq!(score.attempts(), 0);
}

#[tokio::test]
async fn test_study_mismatch_is_hard_failure() {
    let dir = workspace(true);
    let song = Arc::new(FakeSong::default());
    let params = SongScoreParams::new(
        "other-study",
        fixture("analysis.json"),
        dir.path(),
        None,
        RetryPolicy::once(),
    )
    .unwrap();

    let err = use_case(song.clone(), Arc::new(FakeScore::ok()))
        .execute(&params)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(song.submitted.lock().unwrap().is_empty());
}
