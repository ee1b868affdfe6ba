//! GitHub REST implementation of [`ReleaseForge`].

use std::collections::HashSet;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Deserialize;

use crate::config::MatrixConfig;
use crate::error::ForgeError;
use crate::forge::ReleaseForge;

/// Build an HTTP client for the GitHub API.
///
/// GitHub rejects requests without a `User-Agent`. The token, when given,
/// raises the rate limit and is marked sensitive so it never shows up in
/// debug output.
///
/// # Errors
///
/// Returns an error if the token is not a valid header value or the client
/// cannot be constructed.
pub fn build_client(token: Option<&str>) -> Result<Client, ForgeError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("application/vnd.github+json"),
    );

    if let Some(token) = token.filter(|t| !t.is_empty()) {
        let mut value = HeaderValue::from_str(&format!("Bearer {token}"))?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }

    let client = Client::builder()
        .user_agent(crate::USER_AGENT)
        .default_headers(headers)
        .build()?;
    Ok(client)
}

#[derive(Deserialize)]
struct GitRef {
    object: GitObject,
}

#[derive(Deserialize)]
struct GitObject {
    sha: String,
}

#[derive(Deserialize)]
struct Release {
    assets: Vec<ReleaseAsset>,
}

#[derive(Deserialize)]
struct ReleaseAsset {
    name: String,
}

/// GitHub (or GitHub Enterprise) forge.
#[derive(Debug, Clone)]
pub struct GitHubForge {
    client: Client,
    api: String,
    upstream_repo: String,
    release_repo: String,
    release_tag: String,
}

impl GitHubForge {
    /// Create a forge against an API base URL (normally
    /// [`GITHUB_API`](crate::config::GITHUB_API)),
    /// using the repositories and tag from `config`.
    pub fn with_api(client: Client, api: &str, config: &MatrixConfig) -> Self {
        Self {
            client,
            api: api.trim_end_matches('/').to_string(),
            upstream_repo: config.upstream_repo.clone(),
            release_repo: config.release_repo.clone(),
            release_tag: config.release_tag.clone(),
        }
    }

    fn ref_url(&self, git_ref: &str) -> String {
        format!("{}/repos/{}/git/ref/{git_ref}", self.api, self.upstream_repo)
    }

    fn release_url(&self) -> String {
        format!(
            "{}/repos/{}/releases/tags/{}",
            self.api, self.release_repo, self.release_tag
        )
    }
}

#[async_trait]
impl ReleaseForge for GitHubForge {
    fn key(&self) -> String {
        format!("github:{}", self.api)
    }

    async fn resolve_ref(&self, git_ref: &str) -> Result<String, ForgeError> {
        let url = self.ref_url(git_ref);
        tracing::debug!("GET {url}");

        let resp: GitRef = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(resp.object.sha)
    }

    async fn release_assets(&self) -> Result<HashSet<String>, ForgeError> {
        let url = self.release_url();
        tracing::debug!("GET {url}");

        let release: Release = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(release.assets.into_iter().map(|a| a.name).collect())
    }
}
