//! # Driver Layer (Presentation)
//!
//! CLIやその他の外部インターフェースを提供
//!
//! ## 特徴
//!
//! - コマンドごとに依存性注入（DI）を行い、Use Caseを呼び出す
//! - 結果を CommandResult に変換して表示する
//!
//! ## 構成要素
//!
//! - **cli**: CLI引数のパース
//! - **runner**: 設定の解決とコマンドの実行
//! - **report**: 結果の表示と終了コード

pub mod cli;
pub mod report;
pub mod runner;

pub use cli::Args;
pub use report::CommandResult;
pub use runner::CommandRunner;
