//! Build matrix generation.
//!
//! Produces one [`BuildConfig`] per (version, linkage, platform) triple,
//! except dynamic builds of tagged versions: upstream TileDB already
//! publishes those, so they are fetched rather than rebuilt.

use tiledb_pkg_schema::{BuildConfig, Linkage, MAIN_VERSION};

use crate::config::MatrixConfig;
use crate::error::ForgeError;
use crate::forge::ReleaseForge;

/// Git ref that a version name resolves through.
pub fn git_ref(version: &str) -> String {
    if version == MAIN_VERSION {
        format!("heads/{MAIN_VERSION}")
    } else {
        format!("tags/{version}")
    }
}

/// Whether a (version, linkage) pair is built by this pipeline.
pub fn is_packaged(version: &str, linkage: Linkage) -> bool {
    linkage == Linkage::Static || version == MAIN_VERSION
}

/// Generate the full build matrix.
///
/// The published asset list is fetched once up front; each version's commit
/// is resolved once, before its entries are produced. Entries come out in
/// version, linkage, platform order.
///
/// # Errors
///
/// Returns the first forge error. Nothing is retried.
pub async fn generate<F>(forge: &F, config: &MatrixConfig) -> Result<Vec<BuildConfig>, ForgeError>
where
    F: ReleaseForge + ?Sized,
{
    let published = forge.release_assets().await?;
    tracing::info!(
        "{} assets published under {}",
        published.len(),
        config.release_tag
    );

    let mut matrix = Vec::new();
    for version in &config.versions {
        let sha = forge.resolve_ref(&git_ref(version)).await?;
        tracing::info!("{version} -> {sha}");

        for linkage in Linkage::ALL {
            if !is_packaged(version, linkage) {
                continue;
            }

            for platform in &config.platforms {
                let mut build = BuildConfig::new(platform, version, &sha, linkage);
                build.mark_prebuilt(&published);
                tracing::debug!(
                    "{} ({})",
                    build.tarball,
                    if build.prebuilt { "prebuilt" } else { "build" }
                );
                matrix.push(build);
            }
        }
    }

    let prebuilt = matrix.iter().filter(|b| b.prebuilt).count();
    tracing::info!(
        "{} configurations, {prebuilt} prebuilt, {} to build",
        matrix.len(),
        matrix.len() - prebuilt
    );

    Ok(matrix)
}
