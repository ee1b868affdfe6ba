//! Remote source-control lookups needed to generate the matrix.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::error::ForgeError;

pub mod github;

/// A forge that can resolve git refs and list published release assets.
#[async_trait]
pub trait ReleaseForge: Send + Sync {
    /// Identifier for log lines (e.g. `github:https://api.github.com`).
    fn key(&self) -> String;

    /// Resolve a ref such as `heads/main` or `tags/2.27.0` in the upstream
    /// repository to its full commit hash.
    ///
    /// # Errors
    ///
    /// Fails if the lookup does not succeed or the response is malformed.
    async fn resolve_ref(&self, git_ref: &str) -> Result<String, ForgeError>;

    /// Names of the assets already attached to the release tag.
    ///
    /// # Errors
    ///
    /// Fails if the listing does not succeed or the response is malformed.
    async fn release_assets(&self) -> Result<HashSet<String>, ForgeError>;
}
