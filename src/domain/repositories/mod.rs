//! # Domain Repositories
//!
//! Repository trait（インターフェース）定義
//!
//! ## 特徴
//!
//! - Domain層では実装を持たない（traitの定義のみ）
//! - Adapter層で具体的な実装を提供（HTTP, ファイルシステム, 外部プロセス）
//! - 依存性逆転の原則（DIP）を実現

pub mod data_file_repository;
pub mod dictionary_repository;
pub mod local_file_repository;
pub mod lyric_repository;
pub mod score_repository;
pub mod song_repository;
