//! File Local Repository Implementation
//!
//! アナリシスJSON・マニフェストの読み書き

use async_trait::async_trait;
use log::info;
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::domain::entities::manifest::Manifest;
use crate::domain::errors::{ConductorError, ConductorResult};
use crate::domain::repositories::local_file_repository::LocalFileRepository;

/// ローカルファイルリポジトリ
pub struct FileLocalRepository;

impl FileLocalRepository {
    pub fn new() -> Self {
        Self
    }

    async fn read_non_empty(path: &Path, what: &str) -> ConductorResult<String> {
        if !path.is_file() {
            return Err(ConductorError::file(format!(
                "{} not found: {}",
                what,
                path.display()
            ))
            .with_detail("path", path.display().to_string())
            .with_default_suggestions());
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ConductorError::from_io(&e, path))?;

        if content.trim().is_empty() {
            return Err(ConductorError::file(format!(
                "{} is empty: {}",
                what,
                path.display()
            ))
            .with_detail("path", path.display().to_string()));
        }

        Ok(content)
    }
}

#[async_trait]
impl LocalFileRepository for FileLocalRepository {
    async fn read_analysis(&self, path: &Path) -> ConductorResult<Value> {
        let content = Self::read_non_empty(path, "Analysis file").await?;

        serde_json::from_str(&content).map_err(|e| {
            ConductorError::validation(format!(
                "Analysis file is not valid JSON: {} ({})",
                path.display(),
                e
            ))
            .with_detail("path", path.display().to_string())
            .with_detail("line", e.line())
            .with_suggestion("Validate the analysis file with a JSON linter")
        })
    }

    async fn write_manifest(&self, path: &Path, manifest: &Manifest) -> ConductorResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ConductorError::from_io(&e, parent))?;
        }

        tokio::fs::write(path, manifest.render())
            .await
            .map_err(|e| ConductorError::from_io(&e, path))?;

        info!(
            "Wrote manifest with {} file(s) to {}",
            manifest.entries.len(),
            path.display()
        );
        Ok(())
    }

    async fn read_manifest(&self, path: &Path) -> ConductorResult<Manifest> {
        let content = Self::read_non_empty(path, "Manifest file").await?;

        Manifest::parse(&content).map_err(|e| {
            ConductorError::validation(format!(
                "Malformed manifest {} at line {}: {}",
                path.display(),
                e.line,
                e.reason
            ))
            .with_detail("path", path.display().to_string())
            .with_suggestion("Regenerate the manifest with the song-manifest command")
        })
    }

    async fn missing_files(&self, paths: &[PathBuf]) -> Vec<PathBuf> {
        let mut missing = Vec::new();
        for path in paths {
            if !tokio::fs::try_exists(path).await.unwrap_or(false) {
                missing.push(path.clone());
            }
        }
        missing
    }
}

impl Default for FileLocalRepository {
    fn default() -> Self {
        Self::new()
    }
}
