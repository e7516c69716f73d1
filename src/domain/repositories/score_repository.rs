//! # Score Repository Trait
//!
//! マニフェストに記載されたファイルの Score へのアップロードを抽象化

use async_trait::async_trait;
use std::path::Path;

#[cfg(test)]
use mockall::automock;

use crate::domain::errors::ConductorResult;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ScoreRepository: Send + Sync {
    async fn upload(&self, manifest_file: &Path) -> ConductorResult<()>;
}
