//! Per-platform build templates and platform naming rules.

use serde::{Deserialize, Serialize};

/// Build template for one target platform.
///
/// These mirror the upstream TileDB release workflow, extended with static
/// builds. A template is never mutated; each matrix entry gets its own copy.
///
/// # Example
///
/// ```
/// use tiledb_pkg_schema::PlatformConfig;
///
/// let linux = PlatformConfig::new("linux-aarch64", "linux-arm64-ubuntu24", "arm64-linux-release");
/// assert_eq!(linux.package_platform(), "linux-arm64");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// Platform identifier (e.g. `linux-x86_64`).
    pub platform: String,

    /// CI runner image the build executes on (e.g. `ubuntu-20.04`).
    pub os: String,

    /// Extra CMake arguments for this platform.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cmake_args: Option<String>,

    /// Minimum macOS version passed through to the toolchain.
    #[serde(
        rename = "MACOSX_DEPLOYMENT_TARGET",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub macosx_deployment_target: Option<String>,

    /// vcpkg triplet used for third-party dependencies.
    pub triplet: String,

    /// Container image for manylinux-style builds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manylinux: Option<String>,
}

impl PlatformConfig {
    /// Create a template with only the required fields set.
    pub fn new(platform: impl Into<String>, os: impl Into<String>, triplet: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            os: os.into(),
            cmake_args: None,
            macosx_deployment_target: None,
            triplet: triplet.into(),
            manylinux: None,
        }
    }

    /// Set the CMake arguments.
    pub fn with_cmake_args(mut self, args: impl Into<String>) -> Self {
        self.cmake_args = Some(args.into());
        self
    }

    /// Set the macOS deployment target.
    pub fn with_deployment_target(mut self, target: impl Into<String>) -> Self {
        self.macosx_deployment_target = Some(target.into());
        self
    }

    /// Set the manylinux container image.
    pub fn with_manylinux(mut self, image: impl Into<String>) -> Self {
        self.manylinux = Some(image.into());
        self
    }

    /// Platform name as it appears in package filenames and the manifest.
    pub fn package_platform(&self) -> &str {
        package_platform(&self.platform)
    }
}

/// Map a platform id to the name TileDB packaging uses for it.
///
/// Upstream publishes `linux-aarch64` builds as `linux-arm64`; every other
/// platform keeps its id.
pub fn package_platform(platform: &str) -> &str {
    match platform {
        "linux-aarch64" => "linux-arm64",
        other => other,
    }
}

/// Archive extension for a packaged platform name (without leading dot).
pub fn archive_extension(package_platform: &str) -> &'static str {
    if package_platform.contains("windows") {
        "zip"
    } else {
        "tar.gz"
    }
}
