//! # Validate Data Directory Use Case
//!
//! 提出前のCSVディレクトリ検証ユースケース

use log::{debug, info};
use std::path::Path;
use std::sync::Arc;

use crate::domain::entities::data_file::CsvFile;
use crate::domain::errors::ConductorResult;
use crate::domain::repositories::data_file_repository::DataFileRepository;
use crate::domain::repositories::dictionary_repository::DictionaryRepository;
use crate::domain::services::schema_matching::SchemaMatchingService;

/// データディレクトリ検証ユースケース
///
/// ローカルの検査を先に行い、問題がなければディクショナリを問い合わせる
pub struct ValidateDataDirectoryUseCase<F: DataFileRepository, D: DictionaryRepository> {
    file_repository: Arc<F>,
    dictionary_repository: Arc<D>,
}

impl<F: DataFileRepository, D: DictionaryRepository> ValidateDataDirectoryUseCase<F, D> {
    pub fn new(file_repository: Arc<F>, dictionary_repository: Arc<D>) -> Self {
        Self {
            file_repository,
            dictionary_repository,
        }
    }

    /// ディレクトリを検証し、アップロード対象のファイルを返す
    ///
    /// # Errors
    ///
    /// - ディレクトリが存在しない・CSVが無い・空ファイルがある場合は FILE エラー
    /// - スキーマ名に一致しないファイルがある場合は、全ての不正ファイルを列挙した FILE エラー
    pub async fn execute(&self, category_id: &str, directory: &Path) -> ConductorResult<Vec<CsvFile>> {
        let candidates = self.file_repository.scan_csv_files(directory).await?;
        debug!("Found {} CSV candidates in {}", candidates.len(), directory.display());

        let schemas = self.dictionary_repository.schema_names(category_id).await?;
        debug!("Category {} schemas: {}", category_id, schemas.join(", "));

        let files = SchemaMatchingService::resolve(&candidates, &schemas)?;

        for file in files.iter().filter(|f| f.is_renamed()) {
            info!(
                "{} will be submitted as {}",
                file.path.display(),
                file.upload_name
            );
        }

        Ok(files)
    }
}
