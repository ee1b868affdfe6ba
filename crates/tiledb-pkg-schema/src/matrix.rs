//! Build matrix entries and the names derived from them.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::platform::{PlatformConfig, archive_extension};
use crate::{SHORT_SHA_LEN, TARBALL_PREFIX};

/// Library linkage of a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Linkage {
    /// Shared library build (`BUILD_SHARED_LIBS=ON`).
    Dynamic,
    /// Statically linked build (`BUILD_SHARED_LIBS=OFF`).
    Static,
}

impl Linkage {
    /// All linkage modes, in matrix order.
    pub const ALL: [Linkage; 2] = [Linkage::Dynamic, Linkage::Static];

    /// Capitalized name, as serialized in the matrix.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dynamic => "Dynamic",
            Self::Static => "Static",
        }
    }

    /// Value for the CMake `BUILD_SHARED_LIBS` option.
    pub fn build_shared_libs(&self) -> &'static str {
        match self {
            Self::Dynamic => "ON",
            Self::Static => "OFF",
        }
    }

    /// Suffix appended to package versions of this linkage.
    pub fn package_suffix(&self) -> &'static str {
        match self {
            Self::Dynamic => "",
            Self::Static => "-static",
        }
    }
}

/// One entry of the build matrix.
///
/// Carries the platform template plus everything derived for a single
/// (version, linkage) combination. Serialized flat: the template fields sit
/// next to the derived ones in the same JSON object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Platform template this entry was derived from.
    #[serde(flatten)]
    pub platform: PlatformConfig,

    /// Library version (`main` or a release tag such as `2.27.0`).
    pub version: String,

    /// Short commit hash the version resolved to.
    pub sha: String,

    /// CMake `BUILD_SHARED_LIBS` value matching `linkage`.
    #[serde(default)]
    pub build_shared_libs: String,

    /// Linkage of this build.
    pub linkage: Linkage,

    /// `<version>-<sha>[-static]`
    pub pkg_version: String,

    /// Package filename, e.g. `tiledb-linux-x86_64-main-abc1234.tar.gz`.
    pub tarball: String,

    /// Whether `tarball` is already published and can be reused.
    pub prebuilt: bool,
}

impl BuildConfig {
    /// Derive a matrix entry from a platform template.
    ///
    /// `sha` may be a full commit hash; it is shortened here. The entry
    /// starts out not prebuilt, see [`BuildConfig::mark_prebuilt`].
    pub fn new(platform: &PlatformConfig, version: &str, sha: &str, linkage: Linkage) -> Self {
        let sha = short_sha(sha).to_string();
        let pkg_version = package_version(version, &sha, linkage);
        let tarball = tarball_name(&platform.platform, &pkg_version);

        Self {
            platform: platform.clone(),
            version: version.to_string(),
            sha,
            build_shared_libs: linkage.build_shared_libs().to_string(),
            linkage,
            pkg_version,
            tarball,
            prebuilt: false,
        }
    }

    /// Set `prebuilt` if the tarball is among the already published assets.
    pub fn mark_prebuilt(&mut self, published: &HashSet<String>) {
        self.prebuilt = published.contains(&self.tarball);
    }

    /// Platform name used in filenames and the manifest.
    pub fn package_platform(&self) -> &str {
        self.platform.package_platform()
    }

    /// Filename of the checksum sidecar for this entry's tarball.
    pub fn sidecar_name(&self) -> String {
        format!("{}.sha256", self.tarball)
    }
}

/// First [`SHORT_SHA_LEN`] characters of a commit hash.
pub fn short_sha(sha: &str) -> &str {
    sha.get(..SHORT_SHA_LEN).unwrap_or(sha)
}

/// `<version>-<sha>`, with `-static` appended for static builds.
pub fn package_version(version: &str, sha: &str, linkage: Linkage) -> String {
    format!("{version}-{sha}{}", linkage.package_suffix())
}

/// `tiledb-<platform>-<pkg_version>.<ext>`, using the packaged platform name.
pub fn tarball_name(platform: &str, pkg_version: &str) -> String {
    let platform = crate::platform::package_platform(platform);
    format!(
        "{TARBALL_PREFIX}-{platform}-{pkg_version}.{}",
        archive_extension(platform)
    )
}
