//! File Data Repository Implementation
//!
//! DataFileRepository のファイルシステム実装

use async_trait::async_trait;
use log::{debug, info};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::domain::entities::data_file::FileCandidate;
use crate::domain::errors::{ConductorError, ConductorResult};
use crate::domain::repositories::data_file_repository::DataFileRepository;

/// ファイルシステムベースのデータファイルリポジトリ
pub struct FileDataRepository;

impl FileDataRepository {
    pub fn new() -> Self {
        Self
    }

    /// ディレクトリ直下のCSVファイルを列挙（内部実装）
    fn scan_internal(directory: &Path) -> ConductorResult<Vec<FileCandidate>> {
        if !directory.exists() {
            return Err(ConductorError::file(format!(
                "Data directory does not exist: {}",
                directory.display()
            ))
            .with_detail("path", directory.display().to_string())
            .with_default_suggestions());
        }
        if !directory.is_dir() {
            return Err(ConductorError::file(format!(
                "Not a directory: {}",
                directory.display()
            ))
            .with_detail("path", directory.display().to_string())
            .with_suggestion("Pass the directory that contains the CSV files"));
        }

        let mut candidates = Vec::new();

        for entry in WalkDir::new(directory)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| {
                ConductorError::file(format!("Failed to read {}: {}", directory.display(), e))
                    .with_default_suggestions()
            })?;
            let path = entry.path();
            if !path.is_file() || !is_csv(path) {
                continue;
            }

            let metadata = entry
                .metadata()
                .map_err(|e| ConductorError::file(format!("{}: {}", path.display(), e)))?;
            let has_header = has_header_line(path)?;

            debug!(
                "Found {} ({} bytes, header: {})",
                path.display(),
                metadata.len(),
                has_header
            );
            candidates.push(FileCandidate {
                path: path.to_path_buf(),
                file_name: entry.file_name().to_string_lossy().to_string(),
                size: metadata.len(),
                has_header,
            });
        }

        info!(
            "Found {} CSV file(s) in {}",
            candidates.len(),
            directory.display()
        );

        Ok(candidates)
    }
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false)
}

/// 最初の空白でない行が存在するか
fn has_header_line(path: &Path) -> ConductorResult<bool> {
    let file = File::open(path).map_err(|e| ConductorError::from_io(&e, path))?;
    for line in BufReader::new(file).lines() {
        let line = line.map_err(|e| ConductorError::from_io(&e, path))?;
        if !line.trim().is_empty() {
            return Ok(true);
        }
    }
    Ok(false)
}

#[async_trait]
impl DataFileRepository for FileDataRepository {
    async fn scan_csv_files(&self, directory: &Path) -> ConductorResult<Vec<FileCandidate>> {
        let directory: PathBuf = directory.to_path_buf();
        tokio::task::spawn_blocking(move || Self::scan_internal(&directory))
            .await
            .map_err(|e| ConductorError::unexpected(format!("Failed to spawn blocking task: {}", e)))?
    }
}

impl Default for FileDataRepository {
    fn default() -> Self {
        Self::new()
    }
}
