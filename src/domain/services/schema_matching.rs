//! # Schema Matching Service
//!
//! CSVファイル名とディクショナリのスキーマ名の対応付け

use serde_json::json;

use crate::domain::entities::data_file::{CsvFile, FileCandidate};
use crate::domain::errors::{ConductorError, ConductorResult};

/// スキーマ名照合サービス
pub struct SchemaMatchingService;

impl SchemaMatchingService {
    /// ファイル名（拡張子なし）に対応するスキーマを探す
    ///
    /// 完全一致を優先し、なければ最長の前方一致を返す。大文字小文字は区別しない。
    pub fn match_schema<'a>(stem: &str, schemas: &'a [String]) -> Option<&'a String> {
        let stem = stem.to_lowercase();

        if let Some(exact) = schemas.iter().find(|s| s.to_lowercase() == stem) {
            return Some(exact);
        }

        schemas
            .iter()
            .filter(|s| !s.is_empty() && stem.starts_with(&s.to_lowercase()))
            .max_by_key(|s| s.len())
    }

    /// 候補ファイルを検証してアップロード対象に変換する
    ///
    /// # Errors
    ///
    /// 不正なファイルが1つでもあれば、全ての不正ファイルを列挙した FILE エラーを返す
    pub fn resolve(
        candidates: &[FileCandidate],
        schemas: &[String],
    ) -> ConductorResult<Vec<CsvFile>> {
        if schemas.is_empty() {
            return Err(ConductorError::validation(
                "The dictionary registered for this category has no schemas",
            )
            .with_suggestion("Check that the category is linked to a published dictionary"));
        }

        if candidates.is_empty() {
            return Err(ConductorError::file("No CSV files found in the data directory")
                .with_suggestion(format!(
                    "Add one CSV file per schema, named after it: {}",
                    schema_list(schemas)
                )));
        }

        let mut resolved: Vec<CsvFile> = Vec::new();
        let mut invalid: Vec<String> = Vec::new();

        for candidate in candidates {
            if candidate.is_empty() {
                invalid.push(format!("{} (file is empty)", candidate.file_name));
                continue;
            }

            let Some(schema) = Self::match_schema(candidate.stem(), schemas) else {
                invalid.push(format!("{} (no matching schema)", candidate.file_name));
                continue;
            };

            if let Some(existing) = resolved.iter().find(|f| &f.schema == schema) {
                invalid.push(format!(
                    "{} (schema '{}' already provided by {})",
                    candidate.file_name,
                    schema,
                    existing
                        .path
                        .file_name()
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_default()
                ));
                continue;
            }

            resolved.push(CsvFile {
                path: candidate.path.clone(),
                schema: schema.clone(),
                upload_name: format!("{}.csv", schema),
            });
        }

        if !invalid.is_empty() {
            return Err(ConductorError::file(format!(
                "Invalid data files found: {}",
                invalid.join(", ")
            ))
            .with_detail("invalidFiles", json!(invalid))
            .with_detail("availableSchemas", json!(schemas))
            .with_suggestion(format!(
                "Name each CSV file after a schema: {}",
                schema_list(schemas)
            ))
            .with_suggestion("Files whose name starts with a schema name are uploaded under that schema")
            .with_suggestion("Remove empty CSV files from the directory"));
        }

        Ok(resolved)
    }
}

fn schema_list(schemas: &[String]) -> String {
    schemas.join(", ")
}
