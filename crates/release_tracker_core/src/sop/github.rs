//! GitHub contents API client.

use super::{ContentsApi, SopError};
use crate::config::SopConfig;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::StatusCode;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ContentsResponse {
    content: Option<String>,
}

/// Blocking client for `GET /repos/{org}/{repo}/contents/{path}?ref=...`.
pub struct GithubContentsClient {
    http: Client,
    api_base: String,
    org: String,
}

impl GithubContentsClient {
    /// Builds a client with the configured timeout and optional token.
    pub fn new(config: &SopConfig) -> Result<Self, SopError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("release-tracker/", env!("CARGO_PKG_VERSION"))),
        );
        if let Some(token) = config.token.as_deref() {
            // Tokens with non-visible characters are dropped; lookups then run
            // unauthenticated.
            if let Ok(value) = HeaderValue::from_str(&format!("Bearer {token}")) {
                headers.insert(AUTHORIZATION, value);
            }
        }

        let http = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            org: config.org.clone(),
        })
    }

    fn contents_url(&self, repo: &str, path: &str) -> String {
        format!("{}/repos/{}/{}/contents/{}", self.api_base, self.org, repo, path)
    }
}

impl ContentsApi for GithubContentsClient {
    fn file_contents(
        &self,
        repo: &str,
        path: &str,
        git_ref: &str,
    ) -> Result<Option<String>, SopError> {
        let response = self
            .http
            .get(self.contents_url(repo, path))
            .query(&[("ref", git_ref)])
            .send()?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if !status.is_success() => Err(SopError::Status(status.as_u16())),
            _ => Ok(response.json::<ContentsResponse>()?.content),
        }
    }
}
