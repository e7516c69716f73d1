//! # Domain Entities
//!
//! ビジネスエンティティとバリューオブジェクトを定義するモジュール
//!
//! ## エンティティ
//!
//! - **Submission**: Lyric サブミッションと観測された状態
//! - **Analysis**: SONG アナリシスとファイル情報
//! - **Manifest**: Score アップロード用マニフェスト
//! - **ValidationReport**: INVALID サブミッションのエラー要約
//! - **WorkflowResult**: ワークフローの監査証跡

pub mod analysis;
pub mod data_file;
pub mod manifest;
pub mod submission;
pub mod validation_report;
pub mod workflow_result;
