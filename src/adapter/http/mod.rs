//! HTTP Adapter Modules
//!
//! REST 呼び出しとエラー分類

pub mod classify;
pub mod client;

#[cfg(test)]
pub(crate) mod test_server;

pub use client::HttpClient;
