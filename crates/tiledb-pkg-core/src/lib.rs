//! Core logic for TileDB packaging: forge lookups, matrix generation,
//! checksums and release assembly.

pub mod checksum;
pub mod config;
pub mod error;
pub mod forge;
pub mod matrix;
pub mod release;
pub mod verify;

pub use config::{MatrixConfig, ReleaseLayout};
pub use error::{ConfigError, ForgeError, ReleaseError};
pub use forge::ReleaseForge;
pub use forge::github::GitHubForge;

/// User Agent string sent with every API request
pub const USER_AGENT: &str = concat!("tiledb-pkg/", env!("CARGO_PKG_VERSION"));
