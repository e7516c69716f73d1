//! CLI Argument Parsing
//!
//! CLIの引数解析

use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

use crate::adapter::config::DEFAULT_CONFIG_PATH;

/// Lyric / SONG / Score への提出を実行するCLI
#[derive(Parser, Debug, Clone)]
#[command(name = "conductor")]
#[command(
    about = "Submit data to Lyric, SONG and Score from the command line",
    long_about = None
)]
pub struct Args {
    /// Config file path
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    #[command(flatten)]
    pub services: ServiceArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// サービス接続設定（設定ファイルより優先）
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct ServiceArgs {
    /// Bearer token passed to every service
    #[arg(long, env = "AUTH_TOKEN", global = true, hide_env_values = true)]
    pub auth_token: Option<String>,

    #[arg(long, env = "LYRIC_URL", global = true)]
    pub lyric_url: Option<String>,

    #[arg(long, env = "LECTERN_URL", global = true)]
    pub lectern_url: Option<String>,

    #[arg(long, env = "SONG_URL", global = true)]
    pub song_url: Option<String>,

    #[arg(long, env = "SCORE_URL", global = true)]
    pub score_url: Option<String>,

    /// Per-request HTTP timeout in seconds
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,
}

/// リトライ設定
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct RetryArgs {
    /// Maximum number of attempts
    #[arg(long)]
    pub max_retries: Option<u32>,

    /// Delay between attempts in milliseconds
    #[arg(long)]
    pub retry_delay: Option<u64>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Validate a CSV directory, submit it to Lyric, wait for validation and commit
    LyricUpload(LyricUploadArgs),
    /// Submit an analysis, generate the manifest, upload files and publish
    SongWorkflow(SongWorkflowArgs),
    /// Submit an analysis to SONG
    SongSubmit(SongSubmitArgs),
    /// Generate the Score manifest for a submitted analysis
    SongManifest(SongManifestArgs),
    /// Upload the files listed in a manifest to Score
    ScoreUpload(ScoreUploadArgs),
    /// Publish a submitted analysis
    SongPublish(SongPublishArgs),
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::LyricUpload(_) => "lyric-upload",
            Command::SongWorkflow(_) => "song-workflow",
            Command::SongSubmit(_) => "song-submit",
            Command::SongManifest(_) => "song-manifest",
            Command::ScoreUpload(_) => "score-upload",
            Command::SongPublish(_) => "song-publish",
        }
    }
}

#[derive(ClapArgs, Debug, Clone)]
pub struct LyricUploadArgs {
    #[arg(long, env = "CATEGORY_ID")]
    pub category_id: Option<String>,

    #[arg(long, env = "ORGANIZATION")]
    pub organization: Option<String>,

    /// Directory containing one CSV file per schema
    #[arg(short, long, env = "DATA_DIRECTORY")]
    pub data_directory: Option<PathBuf>,

    /// Status checks before giving up, and delay between them
    #[command(flatten)]
    pub retry: RetryArgs,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct SongWorkflowArgs {
    #[arg(long, env = "STUDY_ID")]
    pub study_id: Option<String>,

    #[arg(long, env = "ANALYSIS_FILE")]
    pub analysis_file: Option<PathBuf>,

    #[arg(short, long, env = "DATA_DIRECTORY")]
    pub data_directory: Option<PathBuf>,

    /// Defaults to manifest.txt in the data directory
    #[arg(long, env = "MANIFEST_FILE")]
    pub manifest_file: Option<PathBuf>,

    #[command(flatten)]
    pub retry: RetryArgs,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct SongSubmitArgs {
    #[arg(long, env = "STUDY_ID")]
    pub study_id: Option<String>,

    #[arg(long, env = "ANALYSIS_FILE")]
    pub analysis_file: Option<PathBuf>,

    #[command(flatten)]
    pub retry: RetryArgs,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct SongManifestArgs {
    #[arg(long, env = "STUDY_ID")]
    pub study_id: Option<String>,

    #[arg(long, env = "ANALYSIS_ID")]
    pub analysis_id: Option<String>,

    #[arg(short, long, env = "DATA_DIRECTORY")]
    pub data_directory: Option<PathBuf>,

    #[arg(long, env = "MANIFEST_FILE")]
    pub manifest_file: Option<PathBuf>,

    #[command(flatten)]
    pub retry: RetryArgs,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ScoreUploadArgs {
    #[arg(long, env = "MANIFEST_FILE")]
    pub manifest_file: Option<PathBuf>,

    #[command(flatten)]
    pub retry: RetryArgs,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct SongPublishArgs {
    #[arg(long, env = "STUDY_ID")]
    pub study_id: Option<String>,

    #[arg(long, env = "ANALYSIS_ID")]
    pub analysis_id: Option<String>,

    #[command(flatten)]
    pub retry: RetryArgs,
}
