//! Adapter Layer
//!
//! 外部システム（Lyric, Lectern, SONG, Score, ファイルシステム）との統合

pub mod config;
pub mod http;
pub mod repositories;
