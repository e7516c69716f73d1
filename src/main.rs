//! Conductor - Genomics Data Submission CLI
//!
//! Lyric / SONG / Score への提出ワークフローを実行

// coverage_nightly cfg が設定されている場合のみ coverage_attribute を有効化
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

use anyhow::Result;
use clap::Parser;
use log::debug;
use std::process::ExitCode;

use conductor::adapter::config::Config;
use conductor::driver::{Args, CommandResult, CommandRunner};

#[cfg_attr(coverage_nightly, coverage(off))]
#[tokio::main]
async fn main() -> Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    // Load configuration
    let config = match Config::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            let result = CommandResult::from_config_error(&e, &args.config);
            result.print();
            return Ok(result.exit_code());
        }
    };

    // Flags and environment variables take precedence over the file
    let runner = CommandRunner::new(config, &args.services);
    debug!("Effective timeout: {}s", runner.config().timeout_secs);

    let result = runner.run(&args.command).await;
    result.print();

    Ok(result.exit_code())
}
