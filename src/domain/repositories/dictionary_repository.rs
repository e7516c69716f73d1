//! # Dictionary Repository Trait
//!
//! カテゴリに紐づくディクショナリのスキーマ名取得を抽象化

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use crate::domain::errors::ConductorResult;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait DictionaryRepository: Send + Sync {
    /// カテゴリのディクショナリに含まれるスキーマ名
    async fn schema_names(&self, category_id: &str) -> ConductorResult<Vec<String>>;
}
