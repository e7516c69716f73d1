//! Score Client Repository Implementation
//!
//! 外部の `score-client` プロセスでマニフェストのファイルをアップロードする

use async_trait::async_trait;
use log::{debug, info};
use std::io;
use std::path::Path;
use std::process::Output;
use tokio::process::Command;

use crate::adapter::http::classify::classify_message;
use crate::domain::errors::{ConductorError, ConductorResult, ErrorKind};
use crate::domain::repositories::score_repository::ScoreRepository;

/// Default executable looked up on `PATH`
pub const DEFAULT_SCORE_CLIENT_COMMAND: &str = "score-client";

/// Score クライアントリポジトリ
pub struct ScoreClientRepository {
    /// Executable plus any leading arguments, split on whitespace
    command: String,
    storage_url: String,
    metadata_url: String,
    token: Option<String>,
}

impl ScoreClientRepository {
    pub fn new(
        command: impl Into<String>,
        storage_url: impl Into<String>,
        metadata_url: impl Into<String>,
        token: Option<String>,
    ) -> Self {
        Self {
            command: command.into(),
            storage_url: storage_url.into(),
            metadata_url: metadata_url.into(),
            token,
        }
    }

    fn build_command(&self, manifest_file: &Path) -> ConductorResult<Command> {
        let mut parts = self.command.split_whitespace();
        let program = parts.next().ok_or_else(|| {
            ConductorError::args("No Score client command configured")
                .with_suggestion("Set score_client_command in the config file")
        })?;

        let mut command = Command::new(program);
        command
            .args(parts)
            .arg("upload")
            .arg("--manifest")
            .arg(manifest_file)
            .env("STORAGE_URL", &self.storage_url)
            .env("METADATA_URL", &self.metadata_url)
            .kill_on_drop(true);
        if let Some(token) = &self.token {
            command.env("ACCESSTOKEN", token);
        }
        Ok(command)
    }

    fn spawn_error(&self, err: &io::Error) -> ConductorError {
        if err.kind() == io::ErrorKind::NotFound {
            ConductorError::args(format!("Score client not found: {}", self.command))
                .with_suggestion("Install score-client and make sure it is on PATH")
                .with_suggestion("Or set score_client_command in the config file")
        } else {
            ConductorError::unexpected(format!(
                "Failed to start Score client '{}': {}",
                self.command, err
            ))
        }
    }

    fn failure_error(&self, manifest_file: &Path, output: &Output) -> ConductorError {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let text = if stderr.is_empty() { stdout } else { stderr };
        let exit = output
            .status
            .code()
            .map(|c| c.to_string())
            .unwrap_or_else(|| "signal".to_string());

        let message = if text.is_empty() {
            format!("Score upload failed (exit {})", exit)
        } else {
            format!("Score upload failed (exit {}): {}", exit, last_lines(&text, 5))
        };

        let kind = classify_message(&text);
        let err = ConductorError::new(kind, message)
            .with_detail("manifestFile", manifest_file.display().to_string())
            .with_detail("storageUrl", self.storage_url.as_str())
            .retryable(kind == ErrorKind::Connection);

        let err = match kind {
            ErrorKind::File => err.with_suggestion(
                "Check that every file in the manifest exists in the data directory",
            ),
            ErrorKind::Validation => {
                err.with_suggestion("Check that the file checksums match the analysis")
            }
            _ => err,
        };
        err.with_default_suggestions()
    }
}

fn last_lines(text: &str, n: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    lines[lines.len().saturating_sub(n)..].join("\n")
}

#[async_trait]
impl ScoreRepository for ScoreClientRepository {
    async fn upload(&self, manifest_file: &Path) -> ConductorResult<()> {
        let mut command = self.build_command(manifest_file)?;
        info!(
            "Running Score client for manifest {}",
            manifest_file.display()
        );

        let output = command.output().await.map_err(|e| self.spawn_error(&e))?;
        debug!(
            "Score client stdout: {}",
            String::from_utf8_lossy(&output.stdout).trim()
        );

        if !output.status.success() {
            return Err(self.failure_error(manifest_file, &output));
        }
        Ok(())
    }
}
