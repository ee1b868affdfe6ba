//! Check every sidecar in a release directory against its file.

use std::fs;
use std::path::{Path, PathBuf};

use tiledb_pkg_schema::Sha256Digest;

use crate::checksum::{SIDECAR_EXTENSION, SidecarCheck, verify_sidecar};
use crate::error::ReleaseError;

/// Result for a single sidecar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyStatus {
    /// The file matches its recorded digest.
    Ok,
    /// The file's digest differs from the recorded one.
    Mismatch {
        /// Digest recorded in the sidecar.
        expected: Sha256Digest,
        /// Digest of the file on disk.
        actual: Sha256Digest,
    },
    /// The sidecar exists but the file it describes does not.
    Missing,
}

/// Verification results for a release directory, sorted by file name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerifyReport {
    /// One entry per sidecar found.
    pub entries: Vec<(PathBuf, VerifyStatus)>,
}

impl VerifyReport {
    /// True when every checked file matched.
    pub fn is_ok(&self) -> bool {
        self.entries.iter().all(|(_, s)| *s == VerifyStatus::Ok)
    }

    /// Entries that did not match.
    pub fn failures(&self) -> impl Iterator<Item = &(PathBuf, VerifyStatus)> {
        self.entries.iter().filter(|(_, s)| *s != VerifyStatus::Ok)
    }
}

/// Verify all `*.sha256` sidecars directly inside `dir`.
///
/// # Errors
///
/// Returns an error if the directory cannot be listed, or a sidecar cannot
/// be read or holds an invalid digest. Mismatches and missing files are
/// reported, not returned as errors.
pub fn verify_release_dir(dir: &Path) -> Result<VerifyReport, ReleaseError> {
    let entries = fs::read_dir(dir).map_err(|e| ReleaseError::io("Failed to list", dir, e))?;

    let mut sidecars = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|e| ReleaseError::io("Failed to list", dir, e))?
            .path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == SIDECAR_EXTENSION) {
            sidecars.push(path);
        }
    }
    sidecars.sort();

    let mut report = VerifyReport::default();
    for sidecar in sidecars {
        let target = sidecar.with_extension("");
        let status = if target.is_file() {
            match verify_sidecar(&target)? {
                SidecarCheck::Match => VerifyStatus::Ok,
                SidecarCheck::Mismatch { expected, actual } => {
                    VerifyStatus::Mismatch { expected, actual }
                }
            }
        } else {
            VerifyStatus::Missing
        };
        tracing::debug!("{}: {status:?}", target.display());
        report.entries.push((target, status));
    }

    Ok(report)
}
