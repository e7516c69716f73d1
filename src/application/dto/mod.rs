//! # Data Transfer Objects
//!
//! コマンドごとの検証済みパラメータ

pub mod song_score_params;
pub mod submission_params;
