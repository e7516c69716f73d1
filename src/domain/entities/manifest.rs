//! # Manifest Value Object
//!
//! Score アップロード用のタブ区切りマニフェスト
//!
//! ```text
//! <analysisId>\t\t
//! <objectId>\t<filePath>\t<md5>
//! ```

use super::analysis::Analysis;

/// マニフェストの1行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub object_id: String,
    pub file_path: String,
    pub md5: String,
}

impl ManifestEntry {
    pub fn new(
        object_id: impl Into<String>,
        file_path: impl Into<String>,
        md5: impl Into<String>,
    ) -> Self {
        Self {
            object_id: object_id.into(),
            file_path: file_path.into(),
            md5: md5.into(),
        }
    }

    pub fn to_line(&self) -> String {
        format!("{}\t{}\t{}", self.object_id, self.file_path, self.md5)
    }
}

/// マニフェスト
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub analysis_id: String,
    pub entries: Vec<ManifestEntry>,
}

/// Manifest text that could not be parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestParseError {
    pub line: usize,
    pub reason: String,
}

impl Manifest {
    pub fn new(analysis_id: impl Into<String>, entries: Vec<ManifestEntry>) -> Self {
        Self {
            analysis_id: analysis_id.into(),
            entries,
        }
    }

    /// アナリシスのファイル情報からマニフェストを作る
    ///
    /// ファイルパスは `data_dir` とファイル名を `/` で連結する
    pub fn from_analysis(analysis: &Analysis, data_dir: &str) -> Self {
        let base = data_dir.trim_end_matches('/');
        let entries = analysis
            .files
            .iter()
            .map(|file| {
                ManifestEntry::new(
                    file.object_id.clone(),
                    format!("{}/{}", base, file.file_name),
                    file.file_md5sum.clone(),
                )
            })
            .collect();

        Self::new(analysis.analysis_id.clone(), entries)
    }

    /// ファイル内容としてレンダリング
    pub fn render(&self) -> String {
        let mut out = format!("{}\t\t\n", self.analysis_id);
        for entry in &self.entries {
            out.push_str(&entry.to_line());
            out.push('\n');
        }
        out
    }

    /// マニフェストファイルの内容を解析する
    pub fn parse(content: &str) -> Result<Self, ManifestParseError> {
        let mut lines = content.lines().enumerate().filter(|(_, l)| !l.trim().is_empty());

        let (_, header) = lines.next().ok_or_else(|| ManifestParseError {
            line: 1,
            reason: "manifest is empty".to_string(),
        })?;
        let analysis_id = header.split('\t').next().unwrap_or_default().trim();
        if analysis_id.is_empty() {
            return Err(ManifestParseError {
                line: 1,
                reason: "header line has no analysis id".to_string(),
            });
        }

        let mut entries = Vec::new();
        for (idx, line) in lines {
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() != 3 || fields.iter().any(|f| f.trim().is_empty()) {
                return Err(ManifestParseError {
                    line: idx + 1,
                    reason: "expected <objectId>\\t<filePath>\\t<md5>".to_string(),
                });
            }
            entries.push(ManifestEntry::new(fields[0], fields[1], fields[2]));
        }

        Ok(Self::new(analysis_id, entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::analysis::AnalysisFile;

    fn analysis(files: Vec<AnalysisFile>) -> Analysis {
        Analysis {
            analysis_id: "an-1".to_string(),
            study_id: Some("demo".to_string()),
            analysis_state: Some("UNPUBLISHED".to_string()),
            files,
        }
    }

    #[test]
    fn test_render_single_file() {
        let manifest = Manifest::from_analysis(
            &analysis(vec![AnalysisFile {
                object_id: "a1".to_string(),
                file_name: "f.bam".to_string(),
                file_md5sum: "abc".to_string(),
            }]),
            "/data",
        );

        assert_eq!(manifest.render(), "an-1\t\t\na1\t/data/f.bam\tabc\n");
    }

    #[test]
    fn test_trailing_slash_in_data_dir() {
        let manifest = Manifest::from_analysis(
            &analysis(vec![AnalysisFile {
                object_id: "a1".to_string(),
                file_name: "f.bam".to_string(),
                file_md5sum: "abc".to_string(),
            }]),
            "/data/",
        );

        assert_eq!(manifest.entries[0].file_path, "/data/f.bam");
    }

    #[test]
    fn test_render_without_files_is_header_only() {
        let manifest = Manifest::from_analysis(&analysis(vec![]), "/data");
        assert_eq!(manifest.render(), "an-1\t\t\n");
    }

    #[test]
    fn test_parse_rendered_manifest() {
        let content = "an-1\t\t\na1\t/data/f.bam\tabc\nb2\t/data/g.vcf.gz\tdef\n";
        let manifest = Manifest::parse(content).unwrap();

        assert_eq!(manifest.analysis_id, "an-1");
        assert_eq!(manifest.entries.len(), 2);
        assert_eq!(manifest.entries[1].file_path, "/data/g.vcf.gz");
    }

    #[test]
    fn test_parse_rejects_malformed_line() {
        let err = Manifest::parse("an-1\t\t\na1\t/data/f.bam\n").unwrap_err();
        assert_eq!(err.line, 2);
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert!(Manifest::parse("\n\n").is_err());
    }
}
