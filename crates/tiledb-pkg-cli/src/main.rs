//! tiledb-pkg - build matrix and release assembly for TileDB packages

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tiledb_pkg_core::config::GITHUB_API;
use tracing_subscriber::EnvFilter;

mod cmd;

#[derive(Parser, Debug)]
#[command(name = "tiledb-pkg")]
#[command(author, version, about = "Package TileDB builds for release", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the build matrix as JSON
    Matrix {
        /// TOML file overriding the built-in versions and platforms
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// GitHub API base URL
        #[arg(long, env = "GITHUB_API_URL", default_value = GITHUB_API)]
        api_url: String,

        /// GitHub token (raises the API rate limit)
        #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
        token: Option<String>,

        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },

    /// Stage tarballs into the release directory and write releases.csv
    Release {
        /// Build matrix JSON, as printed by `tiledb-pkg matrix`
        #[arg(long, env = "RELEASE_MATRIX", hide_env_values = true)]
        matrix: String,

        /// Directory holding already published tarballs and their sidecars
        #[arg(long, default_value = "prebuilt")]
        prebuilt_dir: PathBuf,

        /// Directory holding freshly built tarballs
        #[arg(long, default_value = "artifacts")]
        artifacts_dir: PathBuf,

        /// Output directory
        #[arg(long, default_value = "release")]
        release_dir: PathBuf,

        /// URL prefix for manifest download links
        #[arg(long)]
        download_url: Option<String>,
    },

    /// Check every .sha256 sidecar in the release directory
    Verify {
        /// Directory to check
        #[arg(long, default_value = "release")]
        release_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout is reserved for the matrix JSON.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Matrix {
            config,
            api_url,
            token,
            pretty,
        } => cmd::matrix::matrix(config.as_deref(), &api_url, token.as_deref(), pretty).await,
        Commands::Release {
            matrix,
            prebuilt_dir,
            artifacts_dir,
            release_dir,
            download_url,
        } => cmd::release::release(
            &matrix,
            cmd::release::layout(prebuilt_dir, artifacts_dir, release_dir, download_url),
        ),
        Commands::Verify { release_dir } => cmd::verify::verify(&release_dir),
    }
}
