//! # Analysis Entity
//!
//! SONG 側のアナリシス（ファイルメタデータの集合）

use serde::{Deserialize, Serialize};

/// アナリシスに含まれるファイル
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisFile {
    pub object_id: String,
    pub file_name: String,
    pub file_md5sum: String,
}

/// アナリシス
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub analysis_id: String,
    #[serde(default)]
    pub study_id: Option<String>,
    #[serde(default)]
    pub analysis_state: Option<String>,
    #[serde(default)]
    pub files: Vec<AnalysisFile>,
}

impl Analysis {
    pub fn is_published(&self) -> bool {
        self.analysis_state.as_deref() == Some("PUBLISHED")
    }
}
