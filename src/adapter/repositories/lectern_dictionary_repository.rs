//! Lectern Dictionary Repository Implementation
//!
//! カテゴリ → ディクショナリ（Lyric）→ スキーマ名（Lectern）の順に解決する

use async_trait::async_trait;
use log::debug;
use serde::Deserialize;
use serde_json::Value;

use crate::adapter::http::HttpClient;
use crate::domain::errors::{ConductorError, ConductorResult};
use crate::domain::repositories::dictionary_repository::DictionaryRepository;

#[derive(Debug, Deserialize)]
struct CategoryResponse {
    dictionary: Option<DictionaryRef>,
}

#[derive(Debug, Deserialize)]
struct DictionaryRef {
    name: String,
    version: String,
}

#[derive(Debug, Deserialize)]
struct DictionaryResponse {
    #[serde(default)]
    schemas: Vec<SchemaRef>,
}

#[derive(Debug, Deserialize)]
struct SchemaRef {
    name: String,
}

/// Lectern ディクショナリリポジトリ
pub struct LecternDictionaryRepository {
    lyric: HttpClient,
    lectern: HttpClient,
}

impl LecternDictionaryRepository {
    pub fn new(lyric: HttpClient, lectern: HttpClient) -> Self {
        Self { lyric, lectern }
    }

    async fn dictionary_for_category(&self, category_id: &str) -> ConductorResult<DictionaryRef> {
        let category: CategoryResponse = self
            .lyric
            .get_json(&format!("/category/{}", category_id))
            .await?;

        category.dictionary.ok_or_else(|| {
            ConductorError::validation(format!(
                "Category {} has no registered dictionary",
                category_id
            ))
            .with_suggestion("Register the category with a dictionary before submitting data")
        })
    }
}

/// Lectern answers either a list of dictionaries or a single one
fn parse_dictionaries(value: Value) -> ConductorResult<Vec<DictionaryResponse>> {
    let parsed = match value {
        Value::Array(_) => serde_json::from_value(value),
        other => serde_json::from_value(other).map(|d| vec![d]),
    };
    parsed.map_err(|e| {
        ConductorError::connection(format!("Unexpected dictionary format from Lectern: {}", e))
    })
}

#[async_trait]
impl DictionaryRepository for LecternDictionaryRepository {
    async fn schema_names(&self, category_id: &str) -> ConductorResult<Vec<String>> {
        let dictionary = self.dictionary_for_category(category_id).await?;
        debug!(
            "Category {} uses dictionary {} v{}",
            category_id, dictionary.name, dictionary.version
        );

        let value: Value = self
            .lectern
            .get_json_with_query(
                "/dictionaries",
                &[
                    ("name", dictionary.name.as_str()),
                    ("version", dictionary.version.as_str()),
                ],
            )
            .await?;

        let found = parse_dictionaries(value)?.into_iter().next().ok_or_else(|| {
            ConductorError::validation(format!(
                "Dictionary {} v{} was not found in Lectern",
                dictionary.name, dictionary.version
            ))
            .with_suggestion("Check that the dictionary is registered in Lectern")
        })?;

        Ok(found.schemas.into_iter().map(|s| s.name).collect())
    }
}
