//! `tiledb-pkg verify`

use std::path::Path;

use anyhow::{Context, Result, bail};
use tiledb_pkg_core::verify::{VerifyStatus, verify_release_dir};

/// Re-hash every file with a sidecar and fail on any mismatch.
pub(crate) fn verify(release_dir: &Path) -> Result<()> {
    let report = verify_release_dir(release_dir)
        .with_context(|| format!("failed to verify {}", release_dir.display()))?;

    for (path, status) in &report.entries {
        let name = path.file_name().map_or_else(
            || path.display().to_string(),
            |n| n.to_string_lossy().into_owned(),
        );
        match status {
            VerifyStatus::Ok => println!("  ok {name}"),
            VerifyStatus::Missing => println!("  missing {name}"),
            VerifyStatus::Mismatch { expected, actual } => {
                println!("  mismatch {name}: expected {expected}, got {actual}");
            }
        }
    }

    let failed = report.failures().count();
    if failed > 0 {
        bail!("{failed} of {} files failed verification", report.entries.len());
    }

    println!("  {} files verified", report.entries.len());
    Ok(())
}
