//! `tiledb-pkg matrix`

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tiledb_pkg_core::forge::github::build_client;
use tiledb_pkg_core::{GitHubForge, MatrixConfig, ReleaseForge, matrix as generator};

/// Generate the build matrix and print it to stdout.
pub(crate) async fn matrix(
    config: Option<&Path>,
    api_url: &str,
    token: Option<&str>,
    pretty: bool,
) -> Result<()> {
    let config = match config {
        Some(path) => MatrixConfig::load(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => MatrixConfig::default(),
    };

    let client = build_client(token)?;
    let forge = GitHubForge::with_api(client, api_url, &config);
    tracing::info!("querying {}", forge.key());

    let builds = generator::generate(&forge, &config)
        .await
        .context("failed to generate build matrix")?;

    let json = if pretty {
        serde_json::to_string_pretty(&builds)?
    } else {
        serde_json::to_string(&builds)?
    };

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{json}")?;
    stdout.flush()?;
    Ok(())
}
