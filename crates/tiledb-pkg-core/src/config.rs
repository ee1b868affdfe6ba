//! Built-in matrix definition and filesystem layout.
//!
//! The defaults follow the upstream TileDB release workflow
//! (`TileDB-Inc/TileDB/.github/workflows/release.yml`). Upstream only ships
//! dynamic builds; the static builds are added here for consumers that
//! distribute statically linked binaries.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tiledb_pkg_schema::PlatformConfig;

use crate::error::ConfigError;

/// Default GitHub REST API base.
pub const GITHUB_API: &str = "https://api.github.com/";

/// Repository the library sources (and refs) come from.
pub const UPSTREAM_REPO: &str = "TileDB-Inc/TileDB";

/// Repository the packaged tarballs are published to.
pub const RELEASE_REPO: &str = "TileDB-Inc/tiledb-rs";

/// Rolling release tag holding the published tarballs.
pub const NIGHTLY_TAG: &str = "nightlies";

/// Versions packaged by default.
pub const DEFAULT_VERSIONS: [&str; 2] = ["main", "2.27.0"];

const MANYLINUX_X86_64: &str = "quay.io/pypa/manylinux_2_28_x86_64:2025.03.15-1";
const MANYLINUX_AARCH64: &str = "quay.io/pypa/manylinux_2_28_aarch64:2025.03.15-1";

/// The built-in platform table.
pub fn default_platforms() -> Vec<PlatformConfig> {
    vec![
        PlatformConfig::new("linux-x86_64", "ubuntu-20.04", "x64-linux-release")
            .with_manylinux(MANYLINUX_X86_64),
        PlatformConfig::new("linux-x86_64-noavx2", "ubuntu-20.04", "x64-linux-release")
            .with_cmake_args("-DCOMPILER_SUPPORTS_AVX2=OFF")
            .with_manylinux(MANYLINUX_X86_64),
        PlatformConfig::new("linux-aarch64", "linux-arm64-ubuntu24", "arm64-linux-release")
            .with_manylinux(MANYLINUX_AARCH64),
        PlatformConfig::new("macos-x86_64", "macos-13", "x64-osx-release")
            .with_cmake_args("-DCMAKE_OSX_ARCHITECTURES=x86_64")
            .with_deployment_target("11"),
        PlatformConfig::new("macos-arm64", "macos-latest", "arm64-osx-release")
            .with_cmake_args("-DCMAKE_OSX_ARCHITECTURES=arm64")
            .with_deployment_target("11"),
    ]
}

/// Public download prefix for assets of a release tag.
pub fn download_base(release_repo: &str, tag: &str) -> String {
    format!("https://github.com/{release_repo}/releases/download/{tag}")
}

/// What to build: versions, platforms, and where to look things up.
///
/// Every field has a default, so a TOML file only needs the parts it
/// overrides:
///
/// ```toml
/// versions = ["main", "2.28.0"]
///
/// [[platforms]]
/// platform = "linux-x86_64"
/// os = "ubuntu-22.04"
/// triplet = "x64-linux-release"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MatrixConfig {
    /// Library versions; `main` tracks the default branch, anything else is a tag.
    pub versions: Vec<String>,
    /// Platform templates, in output order.
    pub platforms: Vec<PlatformConfig>,
    /// `owner/repo` whose refs give each version's commit.
    pub upstream_repo: String,
    /// `owner/repo` whose release holds already published tarballs.
    pub release_repo: String,
    /// Release tag listing the published tarballs.
    pub release_tag: String,
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            versions: DEFAULT_VERSIONS.iter().map(ToString::to_string).collect(),
            platforms: default_platforms(),
            upstream_repo: UPSTREAM_REPO.to_string(),
            release_repo: RELEASE_REPO.to_string(),
            release_tag: NIGHTLY_TAG.to_string(),
        }
    }
}

impl MatrixConfig {
    /// Load a matrix configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, does not parse, or fails
    /// [`MatrixConfig::validate`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse a matrix configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text does not parse or the result is invalid.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject matrices that cannot produce a sensible build list.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when there are no versions or
    /// platforms, or when a version or platform id is repeated.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.versions.is_empty() {
            return Err(ConfigError::Invalid("no versions listed".to_string()));
        }
        if self.platforms.is_empty() {
            return Err(ConfigError::Invalid("no platforms listed".to_string()));
        }

        let mut seen = HashSet::new();
        for version in &self.versions {
            if version.trim().is_empty() {
                return Err(ConfigError::Invalid("empty version".to_string()));
            }
            if !seen.insert(version.as_str()) {
                return Err(ConfigError::Invalid(format!("duplicate version '{version}'")));
            }
        }

        let mut seen = HashSet::new();
        for platform in &self.platforms {
            if !seen.insert(platform.platform.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate platform '{}'",
                    platform.platform
                )));
            }
        }

        Ok(())
    }

    /// Download prefix for tarballs published under this config's release.
    pub fn download_base(&self) -> String {
        download_base(&self.release_repo, &self.release_tag)
    }
}

/// Directories the release assembler reads from and writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseLayout {
    /// Tarballs (with sidecars) fetched from the existing release.
    pub prebuilt_dir: PathBuf,
    /// Tarballs produced by this pipeline's build jobs.
    pub artifacts_dir: PathBuf,
    /// Output directory, uploaded as the new release.
    pub release_dir: PathBuf,
    /// URL prefix written into the manifest.
    pub download_base: String,
}

impl Default for ReleaseLayout {
    fn default() -> Self {
        Self {
            prebuilt_dir: PathBuf::from("prebuilt"),
            artifacts_dir: PathBuf::from("artifacts"),
            release_dir: PathBuf::from("release"),
            download_base: download_base(RELEASE_REPO, NIGHTLY_TAG),
        }
    }
}

impl ReleaseLayout {
    /// Resolve every directory relative to `root`.
    pub fn rooted_at(root: &Path) -> Self {
        let default = Self::default();
        Self {
            prebuilt_dir: root.join(default.prebuilt_dir),
            artifacts_dir: root.join(default.artifacts_dir),
            release_dir: root.join(default.release_dir),
            download_base: default.download_base,
        }
    }
}
