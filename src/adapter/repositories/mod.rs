//! Repository Implementations
//!
//! Domain層のRepositoryトレイトの実装

pub mod file_data_repository;
pub mod file_local_repository;
pub mod lectern_dictionary_repository;
pub mod lyric_http_repository;
pub mod score_client_repository;
pub mod song_http_repository;
