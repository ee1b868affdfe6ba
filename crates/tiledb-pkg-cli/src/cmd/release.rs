//! `tiledb-pkg release`

use std::path::PathBuf;

use anyhow::{Context, Result};
use tiledb_pkg_core::ReleaseLayout;
use tiledb_pkg_core::release::{ReleaseAssembler, parse_matrix};

/// Build a layout from command-line directories, defaulting the URL prefix.
pub(crate) fn layout(
    prebuilt_dir: PathBuf,
    artifacts_dir: PathBuf,
    release_dir: PathBuf,
    download_url: Option<String>,
) -> ReleaseLayout {
    let default = ReleaseLayout::default();
    ReleaseLayout {
        prebuilt_dir,
        artifacts_dir,
        release_dir,
        download_base: download_url.unwrap_or(default.download_base),
    }
}

/// Assemble the release directory from the JSON build matrix.
pub(crate) fn release(matrix_json: &str, layout: ReleaseLayout) -> Result<()> {
    let configs = parse_matrix(matrix_json).context("failed to parse RELEASE_MATRIX")?;
    tracing::info!(
        "assembling {} configurations into {}",
        configs.len(),
        layout.release_dir.display()
    );

    let summary = ReleaseAssembler::new(layout)
        .assemble(&configs)
        .context("failed to assemble release")?;

    tracing::info!(
        "{} prebuilt, {} built, manifest {} ({})",
        summary.prebuilt,
        summary.built,
        summary.manifest.display(),
        summary.manifest_sha256
    );
    Ok(())
}
