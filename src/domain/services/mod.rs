//! # Domain Services
//!
//! エンティティに属さないビジネスルール
//!
//! - **SchemaMatchingService**: CSVファイル名とスキーマ名の照合
//! - **RetryPolicy**: ポーリング・リトライ設定

pub mod retry_policy;
pub mod schema_matching;
