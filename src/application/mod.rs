//! # Application Layer
//!
//! アプリケーション固有のビジネスフロー（ユースケース）
//!
//! ## 特徴
//!
//! - Domain層のエンティティとサービスを組み合わせてワークフローを実現
//! - Repository traitに依存（実装には依存しない）
//! - 外部システムの詳細は知らない
//!
//! ## 構成要素
//!
//! - **dto**: 検証済みパラメータ
//! - **retry**: 一時エラーのリトライ
//! - **use_cases**: ユースケース

pub mod dto;
pub mod retry;
pub mod use_cases;
