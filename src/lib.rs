//! # Conductor
//!
//! Lyric / Lectern / SONG / Score へのデータ提出を自動化するCLI
//!
//! このプロジェクトはクリーンアーキテクチャを採用しており、以下の4層で構成されています：
//!
//! - **Domain層**: 提出ワークフローのエンティティ・エラー分類・リポジトリトレイト（外部依存なし）
//! - **Application層**: 提出ワークフロー（ユースケース）
//! - **Adapter層**: 外部システムとの統合（HTTP, score-client, ファイルシステム）
//! - **Driver層**: CLI、依存性注入、結果表示

// coverage_nightly cfg が設定されている場合のみ coverage_attribute を有効化
// カバレッジ計測時に外部サービス依存コードを除外するために使用
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

// Domain層（純粋なビジネスロジック）
pub mod domain;

// Application層（ユースケース）
pub mod application;

// Adapter層（Infrastructure）
pub mod adapter;

// Driver層（Presentation）
pub mod driver;
