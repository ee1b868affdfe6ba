//! Wire types shared by the matrix generator and the release assembler.
//!
//! A [`BuildConfig`] is produced by `tiledb-pkg matrix`, serialized to JSON,
//! and read back by `tiledb-pkg release` from the `RELEASE_MATRIX`
//! environment variable. Field names are part of the pipeline contract.

pub mod hash;
pub mod manifest;
pub mod matrix;
pub mod platform;

// Re-exports
pub use hash::*;
pub use manifest::{Manifest, ManifestLine};
pub use matrix::{BuildConfig, Linkage};
pub use platform::PlatformConfig;

/// Prefix of every packaged tarball name.
pub const TARBALL_PREFIX: &str = "tiledb";

/// The version name that tracks the upstream default branch.
pub const MAIN_VERSION: &str = "main";

/// Number of commit hash characters kept in package versions.
pub const SHORT_SHA_LEN: usize = 7;
