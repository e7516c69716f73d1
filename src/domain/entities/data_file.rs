//! # Data File Value Objects
//!
//! 提出対象のCSVファイル

use std::path::PathBuf;

/// ディレクトリ走査で見つかったCSVファイル（未検証）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCandidate {
    pub path: PathBuf,
    /// File name including the `.csv` extension
    pub file_name: String,
    pub size: u64,
    /// 空白以外のヘッダー行があるか
    pub has_header: bool,
}

impl FileCandidate {
    /// 拡張子を除いたファイル名
    pub fn stem(&self) -> &str {
        self.file_name
            .rsplit_once('.')
            .map(|(stem, _)| stem)
            .unwrap_or(&self.file_name)
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0 || !self.has_header
    }
}

/// 検証済みCSVファイル
///
/// `upload_name` はスキーマ名に合わせたアップロード時のファイル名
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvFile {
    pub path: PathBuf,
    pub schema: String,
    pub upload_name: String,
}

impl CsvFile {
    pub fn is_renamed(&self) -> bool {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy() != self.upload_name)
            .unwrap_or(true)
    }
}
