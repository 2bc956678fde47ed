//! GitHub REST API release directory

use std::io::Read;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use tracing::debug;

use super::{Release, ReleaseDirectory};
use crate::error::{CorralError, Result, release};

const USER_AGENT: &str = concat!("corral/", env!("CARGO_PKG_VERSION"));
const JSON_MEDIA_TYPE: &str = "application/vnd.github+json";
const BINARY_MEDIA_TYPE: &str = "application/octet-stream";
const PAGE_SIZE: usize = 100;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const API_TIMEOUT: Duration = Duration::from_secs(60);

/// Release directory backed by `api.github.com` (or a compatible host)
///
/// API calls carry a total timeout. Asset downloads only have the connect timeout, since
/// reading a large archive over a slow link can take arbitrarily long.
pub struct GithubReleaseDirectory {
    client: Client,
    api_url: String,
    api_timeout: Duration,
}

impl GithubReleaseDirectory {
    /// Create a client for the given API base URL, authenticating with `token` when set
    pub fn new(api_url: &str, token: Option<&str>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(token) = token {
            let value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|e| {
                CorralError::HttpRequestFailed {
                    message: format!("invalid GitHub token: {e}"),
                }
            })?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(None::<Duration>)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            api_timeout: API_TIMEOUT,
        })
    }

    #[cfg(test)]
    fn with_api_timeout(mut self, api_timeout: Duration) -> Self {
        self.api_timeout = api_timeout;
        self
    }

    fn get_release(&self, owner: &str, repo: &str, path: &str, label: &str) -> Result<Release> {
        let url = format!("{}/repos/{owner}/{repo}/releases/{path}", self.api_url);
        debug!("GET {url}");
        let response = self
            .client
            .get(&url)
            .header(ACCEPT, JSON_MEDIA_TYPE)
            .timeout(self.api_timeout)
            .send()?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(release::not_found(format!("{owner}/{repo}"), label));
        }
        let response = check_status(response)?;
        Ok(response.json()?)
    }
}

impl ReleaseDirectory for GithubReleaseDirectory {
    fn latest_release(&self, owner: &str, repo: &str) -> Result<Release> {
        self.get_release(owner, repo, "latest", "latest")
    }

    fn release_by_tag(&self, owner: &str, repo: &str, tag: &str) -> Result<Release> {
        self.get_release(owner, repo, &format!("tags/{tag}"), tag)
    }

    fn list_releases(&self, owner: &str, repo: &str) -> Result<Vec<Release>> {
        let mut releases = Vec::new();
        for page in 1.. {
            let url = format!(
                "{}/repos/{owner}/{repo}/releases?per_page={PAGE_SIZE}&page={page}",
                self.api_url
            );
            debug!("GET {url}");
            let response = self
                .client
                .get(&url)
                .header(ACCEPT, JSON_MEDIA_TYPE)
                .timeout(self.api_timeout)
                .send()?;
            if response.status() == StatusCode::NOT_FOUND {
                return Err(release::not_found(format!("{owner}/{repo}"), "any"));
            }
            let batch: Vec<Release> = check_status(response)?.json()?;
            let last_page = batch.len() < PAGE_SIZE;
            releases.extend(batch);
            if last_page {
                break;
            }
        }
        Ok(releases)
    }

    fn download_asset(
        &self,
        owner: &str,
        repo: &str,
        asset_id: u64,
    ) -> Result<(Box<dyn Read>, Option<u64>)> {
        let url = format!("{}/repos/{owner}/{repo}/releases/assets/{asset_id}", self.api_url);
        debug!("GET {url}");
        let repository = format!("{owner}/{repo}");
        let response = self
            .client
            .get(&url)
            .header(ACCEPT, BINARY_MEDIA_TYPE)
            .send()
            .map_err(|e| release::download_failed(&repository, asset_id, e.to_string()))?;

        if !response.status().is_success() {
            return Err(release::download_failed(
                repository,
                asset_id,
                format!("HTTP {}", response.status()),
            ));
        }

        let length = response.content_length();
        Ok((Box::new(response), length))
    }
}

fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    Err(CorralError::HttpRequestFailed {
        message: format!("HTTP {status}: {}", body.trim()),
    })
}
