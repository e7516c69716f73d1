//! # Use Cases
//!
//! アプリケーションのビジネスフロー（ユースケース）
//!
//! ## ユースケース
//!
//! - **ValidateDataDirectoryUseCase**: CSVディレクトリの検証
//! - **SubmitLyricDataUseCase**: Lyric 提出 → 検証待ち → コミット
//! - **SongScoreWorkflowUseCase**: SONG 提出 → マニフェスト → Score アップロード → 公開

pub mod song_score_workflow;
pub mod submit_lyric_data;
pub mod validate_data_directory;
