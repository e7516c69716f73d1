//! # Local File Repository Trait
//!
//! アナリシスJSON・マニフェストなどローカルファイルの読み書きを抽象化

use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};

#[cfg(test)]
use mockall::automock;

use crate::domain::entities::manifest::Manifest;
use crate::domain::errors::ConductorResult;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait LocalFileRepository: Send + Sync {
    /// アナリシスJSONファイルを読み込む
    ///
    /// # Errors
    ///
    /// ファイルが存在しない・空・読み取り不可なら FILE エラー、
    /// JSONとして不正なら VALIDATION エラー
    async fn read_analysis(&self, path: &Path) -> ConductorResult<Value>;

    async fn write_manifest(&self, path: &Path, manifest: &Manifest) -> ConductorResult<()>;

    async fn read_manifest(&self, path: &Path) -> ConductorResult<Manifest>;

    /// 存在しないファイルを返す
    async fn missing_files(&self, paths: &[PathBuf]) -> Vec<PathBuf>;
}
