//! # Data File Repository Trait
//!
//! ローカルのデータディレクトリ走査を抽象化

use async_trait::async_trait;
use std::path::Path;

#[cfg(test)]
use mockall::automock;

use crate::domain::entities::data_file::FileCandidate;
use crate::domain::errors::ConductorResult;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait DataFileRepository: Send + Sync {
    /// ディレクトリ直下の `*.csv` ファイルを列挙する
    ///
    /// # Errors
    ///
    /// パスが存在しない、またはディレクトリでない場合は FILE エラー
    async fn scan_csv_files(&self, directory: &Path) -> ConductorResult<Vec<FileCandidate>>;
}
