//! The `releases.csv` manifest published next to release artifacts.
//!
//! Each line is `PLATFORM,VERSION,LINKAGE,URL,SHA256`. Consumers look up a
//! prebuilt library by platform, version and linkage, so the format is fixed.

use crate::hash::Sha256Digest;
use crate::matrix::BuildConfig;

/// One row of the release manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestLine {
    /// Packaged platform name, uppercased (e.g. `LINUX-ARM64`).
    pub platform: String,
    /// Library version.
    pub version: String,
    /// Linkage, lowercased (`dynamic` / `static`).
    pub linkage: String,
    /// Public download URL of the tarball.
    pub url: String,
    /// Digest of the tarball.
    pub sha256: Sha256Digest,
}

impl ManifestLine {
    /// Build the manifest row for a matrix entry.
    ///
    /// `download_base` is the URL prefix the tarball is published under.
    pub fn new(config: &BuildConfig, download_base: &str, sha256: Sha256Digest) -> Self {
        Self {
            platform: config.package_platform().to_uppercase(),
            version: config.version.clone(),
            linkage: config.linkage.as_str().to_lowercase(),
            url: format!("{}/{}", download_base.trim_end_matches('/'), config.tarball),
            sha256,
        }
    }

    /// Render as a CSV record without a line terminator.
    pub fn to_csv(&self) -> String {
        [
            self.platform.as_str(),
            self.version.as_str(),
            self.linkage.as_str(),
            self.url.as_str(),
            self.sha256.as_str(),
        ]
        .join(",")
    }
}

/// The full release manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    /// Rows in insertion order; sorting happens at render time.
    pub lines: Vec<ManifestLine>,
}

impl Manifest {
    /// Create an empty manifest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a row.
    pub fn push(&mut self, line: ManifestLine) {
        self.lines.push(line);
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the manifest has no rows.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Render the file contents.
    ///
    /// Records are sorted by their rendered bytes and followed by an empty
    /// entry, so a non-empty manifest always ends with `\n`.
    pub fn render(&self) -> String {
        let mut records: Vec<String> = self.lines.iter().map(ManifestLine::to_csv).collect();
        records.sort();
        records.push(String::new());
        records.join("\n")
    }
}
