//! # SONG/Score Parameters DTO
//!
//! SONG/Score ワークフローのパラメータ

use std::path::{Path, PathBuf};

use super::submission_params::missing;
use crate::domain::errors::{ConductorError, ConductorResult};
use crate::domain::services::retry_policy::RetryPolicy;

/// Manifest file name used when none is given
pub const DEFAULT_MANIFEST_NAME: &str = "manifest.txt";

/// SONG/Score ワークフローのパラメータ
#[derive(Debug, Clone)]
pub struct SongScoreParams {
    study_id: String,
    analysis_file: PathBuf,
    data_directory: PathBuf,
    manifest_file: PathBuf,
    retry: RetryPolicy,
}

impl SongScoreParams {
    /// `manifest_file` を省略した場合はデータディレクトリ直下の `manifest.txt`
    pub fn new(
        study_id: impl Into<String>,
        analysis_file: impl AsRef<Path>,
        data_directory: impl AsRef<Path>,
        manifest_file: Option<PathBuf>,
        retry: RetryPolicy,
    ) -> ConductorResult<Self> {
        let study_id = validate_study_id(&study_id.into())?;

        if analysis_file.as_ref().as_os_str().is_empty() {
            return Err(missing("analysis file", "--analysis-file", "ANALYSIS_FILE"));
        }
        if data_directory.as_ref().as_os_str().is_empty() {
            return Err(missing("data directory", "--data-directory", "DATA_DIRECTORY"));
        }

        let analysis_file = expand(analysis_file.as_ref());
        let data_directory = expand(data_directory.as_ref());
        let manifest_file = manifest_file
            .map(|p| expand(&p))
            .unwrap_or_else(|| data_directory.join(DEFAULT_MANIFEST_NAME));

        Ok(Self {
            study_id,
            analysis_file,
            data_directory,
            manifest_file,
            retry,
        })
    }

    pub fn study_id(&self) -> &str {
        &self.study_id
    }

    pub fn analysis_file(&self) -> &Path {
        &self.analysis_file
    }

    pub fn data_directory(&self) -> &Path {
        &self.data_directory
    }

    pub fn manifest_file(&self) -> &Path {
        &self.manifest_file
    }

    pub fn retry(&self) -> &RetryPolicy {
        &self.retry
    }
}

/// studyId の検証
pub fn validate_study_id(study_id: &str) -> ConductorResult<String> {
    let study_id = study_id.trim();
    if study_id.is_empty() {
        return Err(missing("study id", "--study-id", "STUDY_ID"));
    }
    Ok(study_id.to_string())
}

/// analysisId の検証（SONG は UUID を払い出す）
pub fn validate_analysis_id(analysis_id: &str) -> ConductorResult<String> {
    let analysis_id = analysis_id.trim();
    if analysis_id.is_empty() {
        return Err(missing("analysis id", "--analysis-id", "ANALYSIS_ID"));
    }
    uuid::Uuid::parse_str(analysis_id).map_err(|e| {
        ConductorError::args(format!("'{}' is not a valid analysis id: {}", analysis_id, e))
            .with_suggestion("Analysis ids are UUIDs, as printed by the song-submit command")
    })?;
    Ok(analysis_id.to_string())
}

/// Expands `~` in a path
pub fn expand(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).to_string())
}
