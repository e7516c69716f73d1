//! HTTP Client Wrapper
//!
//! 認証ヘッダ・タイムアウト・エラー変換を備えた REST クライアント

use log::debug;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use super::classify::{classify_status, classify_transport};
use crate::domain::errors::{ConductorError, ConductorResult};

const USER_AGENT: &str = concat!("conductor/", env!("CARGO_PKG_VERSION"));

/// Per-call timeout used when the config does not set one
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// サービス単位のHTTPクライアント
#[derive(Clone)]
pub struct HttpClient {
    service: &'static str,
    base_url: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new(
        service: &'static str,
        base_url: &str,
        token: Option<String>,
        timeout: Duration,
    ) -> ConductorResult<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ConductorError::args(format!("No URL configured for {}", service))
                .with_default_suggestions());
        }

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| {
                ConductorError::unexpected(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            service,
            base_url,
            token: token.filter(|t| !t.trim().is_empty()),
            client,
        })
    }

    pub fn service(&self) -> &'static str {
        self.service
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// ベースURLとパスを連結
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ConductorResult<T> {
        let url = self.url(path);
        let body = self.send(self.request(Method::GET, &url), &url).await?;
        self.decode(&url, &body)
    }

    pub async fn get_json_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> ConductorResult<T> {
        let url = self.url(path);
        let body = self
            .send(self.request(Method::GET, &url).query(query), &url)
            .await?;
        self.decode(&url, &body)
    }

    pub async fn post_json<B, T>(&self, path: &str, payload: &B) -> ConductorResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        let body = self
            .send(self.request(Method::POST, &url).json(payload), &url)
            .await?;
        self.decode(&url, &body)
    }

    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> ConductorResult<T> {
        let url = self.url(path);
        let body = self
            .send(self.request(Method::POST, &url).multipart(form), &url)
            .await?;
        self.decode(&url, &body)
    }

    /// 本文なしのリクエスト（コミット・公開など）
    ///
    /// レスポンス本文は検証せずに返す
    pub async fn send_empty(&self, method: Method, path: &str) -> ConductorResult<String> {
        let url = self.url(path);
        self.send(self.request(method, &url), &url).await
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, request: RequestBuilder, url: &str) -> ConductorResult<String> {
        debug!("{} request: {}", self.service, url);

        let response = request
            .send()
            .await
            .map_err(|e| classify_transport(self.service, url, &e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| classify_transport(self.service, url, &e))?;

        debug!("{} response: HTTP {}", self.service, status.as_u16());

        if !status.is_success() {
            return Err(classify_status(self.service, url, status.as_u16(), &body));
        }

        Ok(body)
    }

    fn decode<T: DeserializeOwned>(&self, url: &str, body: &str) -> ConductorResult<T> {
        let text = if body.trim().is_empty() { "null" } else { body };
        serde_json::from_str(text).map_err(|e| {
            ConductorError::connection(format!(
                "Unexpected response from {} at {}: {}",
                self.service, url, e
            ))
            .with_detail("service", self.service)
            .with_detail("url", url)
            .with_suggestion(format!(
                "Verify the {} URL points at the right service",
                self.service
            ))
        })
    }
}
