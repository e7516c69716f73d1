//! # Submit Lyric Data Use Case
//!
//! Lyric 提出ワークフロー: `INIT → SUBMITTED → {VALID | INVALID} → COMMITTED`

use log::{info, warn};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

use super::validate_data_directory::ValidateDataDirectoryUseCase;
use crate::application::dto::submission_params::SubmissionParams;
use crate::domain::entities::submission::{Submission, SubmissionStatus};
use crate::domain::entities::validation_report::ValidationReport;
use crate::domain::entities::workflow_result::{WorkflowResult, WorkflowStatus};
use crate::domain::errors::{ConductorError, ConductorResult};
use crate::domain::repositories::data_file_repository::DataFileRepository;
use crate::domain::repositories::dictionary_repository::DictionaryRepository;
use crate::domain::repositories::lyric_repository::LyricRepository;

/// Lyric 提出ユースケース
pub struct SubmitLyricDataUseCase<L, F, D>
where
    L: LyricRepository,
    F: DataFileRepository,
    D: DictionaryRepository,
{
    lyric_repository: Arc<L>,
    validator: ValidateDataDirectoryUseCase<F, D>,
}

impl<L, F, D> SubmitLyricDataUseCase<L, F, D>
where
    L: LyricRepository,
    F: DataFileRepository,
    D: DictionaryRepository,
{
    pub fn new(lyric_repository: Arc<L>, file_repository: Arc<F>, dictionary_repository: Arc<D>) -> Self {
        Self {
            lyric_repository,
            validator: ValidateDataDirectoryUseCase::new(file_repository, dictionary_repository),
        }
    }

    /// ワークフローを実行する
    ///
    /// # Errors
    ///
    /// - 検証失敗: FILE / VALIDATION
    /// - INVALID: VALIDATION（テーブル別のエラー要約付き）
    /// - ポーリング上限: TIMEOUT（最後の確認が通信エラーなら CONNECTION）
    /// - コミット失敗: リトライせずそのまま返す
    pub async fn execute(&self, params: &SubmissionParams) -> ConductorResult<WorkflowResult> {
        let files = self
            .validator
            .execute(params.category_id(), params.data_directory())
            .await?;
        info!("Validated {} data file(s)", files.len());

        // INIT → SUBMITTED
        let receipt = self
            .lyric_repository
            .submit_data(params.category_id(), params.organization(), &files)
            .await?;
        info!(
            "Submission {} created (status {})",
            receipt.submission_id, receipt.status
        );

        let mut result = WorkflowResult::new();
        result.submission_id = Some(receipt.submission_id.clone());
        result.steps.submitted = true;
        result.steps.uploaded = true;

        // SUBMITTED → poll
        let submission = self
            .wait_for_validation(
                &receipt.submission_id,
                params.max_retries(),
                params.retry_delay(),
            )
            .await?;

        match submission.status {
            SubmissionStatus::Valid => {
                // VALID → COMMITTED
                self.lyric_repository
                    .commit(params.category_id(), &submission.submission_id)
                    .await?;
                info!("Submission {} committed", submission.submission_id);
            }
            SubmissionStatus::Committed => {
                warn!(
                    "Submission {} was already committed, skipping commit",
                    submission.submission_id
                );
            }
            SubmissionStatus::Invalid => return Err(invalid_submission_error(&submission)),
            SubmissionStatus::Pending => {
                return Err(ConductorError::unexpected(format!(
                    "Submission {} left polling while still PENDING",
                    submission.submission_id
                )))
            }
        }

        result.steps.published = true;
        Ok(result.finish(WorkflowStatus::Committed))
    }

    /// 最初の終端状態までポーリングする
    ///
    /// 最大 `max_retries` 回状態を確認し、各確認の間に `retry_delay` 待機する。
    /// 一時的なネットワークエラーは1回分の試行として数え、ポーリングを続ける。
    ///
    /// # Errors
    ///
    /// - 上限に達しても PENDING のままなら TIMEOUT エラー
    /// - 最後の確認が通信エラーで終わった場合はその CONNECTION エラー
    pub async fn wait_for_validation(
        &self,
        submission_id: &str,
        max_retries: u32,
        retry_delay: Duration,
    ) -> ConductorResult<Submission> {
        let max_retries = max_retries.max(1);
        let mut last_error: Option<ConductorError> = None;

        for attempt in 1..=max_retries {
            if attempt > 1 {
                sleep(retry_delay).await;
            }

            match self.lyric_repository.get_submission(submission_id).await {
                Ok(submission) if submission.status.is_terminal() => {
                    info!(
                        "Submission {} is {} (check {}/{})",
                        submission_id, submission.status, attempt, max_retries
                    );
                    return Ok(submission);
                }
                Ok(submission) => {
                    info!(
                        "Submission {} is {} (check {}/{}), waiting {}ms",
                        submission_id,
                        submission.status,
                        attempt,
                        max_retries,
                        retry_delay.as_millis()
                    );
                    last_error = None;
                }
                Err(e) if e.is_transient() => {
                    warn!(
                        "Status check {}/{} for submission {} failed: {}",
                        attempt, max_retries, submission_id, e
                    );
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        // 最後の確認で状態を取得できていなければ PENDING とは判断しない
        if let Some(err) = last_error {
            return Err(err
                .with_detail("submissionId", submission_id)
                .with_detail("attempts", max_retries)
                .with_suggestion(format!(
                    "Check the status of submission {} once Lyric is reachable again",
                    submission_id
                )));
        }

        Err(ConductorError::timeout(format!(
            "Submission {} was still being validated after {} status checks",
            submission_id, max_retries
        ))
        .with_detail("submissionId", submission_id)
        .with_detail("attempts", max_retries)
        .with_default_suggestions())
    }
}

fn invalid_submission_error(submission: &Submission) -> ConductorError {
    let report = submission
        .errors
        .as_ref()
        .map(ValidationReport::from_payload)
        .unwrap_or_default();

    let mut err = ConductorError::validation(format!(
        "Submission {} is INVALID\n{}",
        submission.submission_id,
        report.summary()
    ))
    .with_detail("submissionId", submission.submission_id.as_str())
    .with_detail("errorCount", report.total_errors())
    .with_detail("duplicateCount", report.duplicate_count())
    .with_detail(
        "tables",
        json!(report.tables.iter().map(|t| t.table.clone()).collect::<Vec<_>>()),
    );

    if report.duplicate_count() > 0 {
        err = err.with_suggestion(
            "Remove duplicate records: they already exist in the submission or in committed data",
        );
    }
    if report.total_errors() > report.duplicate_count() {
        err = err.with_suggestion("Fix the listed fields so they conform to the dictionary schema");
    }

    err.with_default_suggestions()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::data_file::FileCandidate;
    use crate::domain::entities::submission::SubmitReceipt;
    use crate::domain::errors::ErrorKind;
    use crate::domain::repositories::data_file_repository::MockDataFileRepository;
    use crate::domain::repositories::dictionary_repository::MockDictionaryRepository;
    use crate::domain::repositories::lyric_repository::MockLyricRepository;
    use mockall::Sequence;
    use std::path::PathBuf;

    fn files_repo() -> MockDataFileRepository {
        let mut files = MockDataFileRepository::new();
        files.expect_scan_csv_files().returning(|_| {
            Ok(vec![FileCandidate {
                path: PathBuf::from("/data/donor.csv"),
                file_name: "donor.csv".to_string(),
                size: 64,
                has_header: true,
            }])
        });
        files
    }

    fn dictionary_repo() -> MockDictionaryRepository {
        let mut dictionary = MockDictionaryRepository::new();
        dictionary
            .expect_schema_names()
            .returning(|_| Ok(vec!["donor".to_string()]));
        dictionary
    }

    fn params(max_retries: u32) -> SubmissionParams {
        SubmissionParams::new("1", "OICR", "/data", max_retries, 1).unwrap()
    }

    fn with_statuses(lyric: &mut MockLyricRepository, statuses: &[SubmissionStatus]) {
        let mut seq = Sequence::new();
        for status in statuses.iter().copied() {
            lyric
                .expect_get_submission()
                .times(1)
                .in_sequence(&mut seq)
                .returning(move |id| Ok(Submission::new(id, status)));
        }
    }

    fn expect_submit(lyric: &mut MockLyricRepository) {
        lyric.expect_submit_data().times(1).returning(|_, _, files| {
            assert_eq!(files[0].upload_name, "donor.csv");
            Ok(SubmitReceipt {
                submission_id: "17".to_string(),
                status: SubmissionStatus::Pending,
            })
        });
    }

    #[tokio::test]
    async fn test_valid_submission_is_committed() {
        let mut lyric = MockLyricRepository::new();
        expect_submit(&mut lyric);
        with_statuses(
            &mut lyric,
            &[
                SubmissionStatus::Pending,
                SubmissionStatus::Pending,
                SubmissionStatus::Valid,
            ],
        );
        lyric
            .expect_commit()
            .withf(|category, id| category == "1" && id == "17")
            .times(1)
            .returning(|_, _| Ok(()));

        let use_case =
            SubmitLyricDataUseCase::new(Arc::new(lyric), Arc::new(files_repo()), Arc::new(dictionary_repo()));
        let result = use_case.execute(&params(3)).await.unwrap();

        assert_eq!(result.status, WorkflowStatus::Committed);
        assert_eq!(result.submission_id.as_deref(), Some("17"));
        assert!(result.steps.submitted && result.steps.published);
    }

    #[tokio::test]
    async fn test_pending_forever_times_out() {
        let mut lyric = MockLyricRepository::new();
        expect_submit(&mut lyric);
        lyric
            .expect_get_submission()
            .times(4)
            .returning(|id| Ok(Submission::new(id, SubmissionStatus::Pending)));
        lyric.expect_commit().never();

        let use_case =
            SubmitLyricDataUseCase::new(Arc::new(lyric), Arc::new(files_repo()), Arc::new(dictionary_repo()));
        let err = use_case.execute(&params(4)).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Timeout);
        assert_eq!(err.details()["attempts"], 4);
    }

    #[tokio::test]
    async fn test_invalid_submission_is_not_committed() {
        let mut lyric = MockLyricRepository::new();
        expect_submit(&mut lyric);
        lyric.expect_get_submission().times(1).returning(|id| {
            Ok(Submission::new(id, SubmissionStatus::Invalid).with_errors(json!({
                "inserts": {
                    "donor": [
                        {"index": 0, "reason": "INVALID_BY_UNIQUE", "fieldName": "submitter_donor_id"},
                        {"index": 1, "reason": "INVALID_BY_CODELIST", "fieldName": "gender"}
                    ]
                }
            })))
        });
        lyric.expect_commit().never();

        let use_case =
            SubmitLyricDataUseCase::new(Arc::new(lyric), Arc::new(files_repo()), Arc::new(dictionary_repo()));
        let err = use_case.execute(&params(5)).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.message().contains("1 duplicate record(s)"));
        assert!(err.message().contains("INVALID_BY_CODELIST"));
        assert_eq!(err.details()["duplicateCount"], 1);
        assert!(err.suggestions()[0].contains("duplicate"));
    }

    #[tokio::test]
    async fn test_already_committed_skips_commit() {
        let mut lyric = MockLyricRepository::new();
        expect_submit(&mut lyric);
        with_statuses(&mut lyric, &[SubmissionStatus::Committed]);
        lyric.expect_commit().never();

        let use_case =
            SubmitLyricDataUseCase::new(Arc::new(lyric), Arc::new(files_repo()), Arc::new(dictionary_repo()));
        let result = use_case.execute(&params(3)).await.unwrap();

        assert_eq!(result.status, WorkflowStatus::Committed);
    }

    #[tokio::test]
    async fn test_transient_status_error_consumes_attempt() {
        let mut lyric = MockLyricRepository::new();
        expect_submit(&mut lyric);
        let mut seq = Sequence::new();
        lyric
            .expect_get_submission()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(ConductorError::connection("connection reset").retryable(true)));
        lyric
            .expect_get_submission()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|id| Ok(Submission::new(id, SubmissionStatus::Valid)));
        lyric.expect_commit().times(1).returning(|_, _| Ok(()));

        let use_case =
            SubmitLyricDataUseCase::new(Arc::new(lyric), Arc::new(files_repo()), Arc::new(dictionary_repo()));

        assert!(use_case.execute(&params(2)).await.is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_lyric_while_polling_is_connection_error() {
        let mut lyric = MockLyricRepository::new();
        expect_submit(&mut lyric);
        lyric
            .expect_get_submission()
            .times(3)
            .returning(|_| Err(ConductorError::connection("Connection refused").retryable(true)));
        lyric.expect_commit().never();

        let use_case =
            SubmitLyricDataUseCase::new(Arc::new(lyric), Arc::new(files_repo()), Arc::new(dictionary_repo()));
        let err = use_case.execute(&params(3)).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Connection);
        assert!(err.message().contains("Connection refused"));
        assert_eq!(err.details()["submissionId"], "17");
        assert_eq!(err.details()["attempts"], 3);
    }

    #[tokio::test]
    async fn test_pending_after_transient_error_still_times_out() {
        let mut lyric = MockLyricRepository::new();
        expect_submit(&mut lyric);
        let mut seq = Sequence::new();
        lyric
            .expect_get_submission()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(ConductorError::connection("connection reset").retryable(true)));
        lyric
            .expect_get_submission()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|id| Ok(Submission::new(id, SubmissionStatus::Pending)));

        let use_case =
            SubmitLyricDataUseCase::new(Arc::new(lyric), Arc::new(files_repo()), Arc::new(dictionary_repo()));
        let err = use_case.execute(&params(2)).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Timeout);
    }

    #[tokio::test]
    async fn test_auth_error_while_polling_aborts() {
        let mut lyric = MockLyricRepository::new();
        expect_submit(&mut lyric);
        lyric
            .expect_get_submission()
            .times(1)
            .returning(|_| Err(ConductorError::auth("401 Unauthorized")));
        lyric.expect_commit().never();

        let use_case =
            SubmitLyricDataUseCase::new(Arc::new(lyric), Arc::new(files_repo()), Arc::new(dictionary_repo()));
        let err = use_case.execute(&params(5)).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Auth);
    }

    #[tokio::test]
    async fn test_commit_failure_is_surfaced() {
        let mut lyric = MockLyricRepository::new();
        expect_submit(&mut lyric);
        with_statuses(&mut lyric, &[SubmissionStatus::Valid]);
        lyric
            .expect_commit()
            .times(1)
            .returning(|_, _| Err(ConductorError::connection("503 Service Unavailable").retryable(true)));

        let use_case =
            SubmitLyricDataUseCase::new(Arc::new(lyric), Arc::new(files_repo()), Arc::new(dictionary_repo()));
        let err = use_case.execute(&params(3)).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Connection);
    }
}
