//! Release assembly: stage tarballs into the release directory and write
//! the checksummed `releases.csv` manifest.
//!
//! The result is only meaningful after [`ReleaseAssembler::assemble`]
//! returns `Ok`; a failed run can leave a partially populated directory.

use std::fs;
use std::path::{Path, PathBuf};

use tiledb_pkg_schema::{BuildConfig, Manifest, ManifestLine, Sha256Digest};

use crate::checksum::{read_sidecar, sidecar_path, write_sidecar};
use crate::config::ReleaseLayout;
use crate::error::ReleaseError;

/// Filename of the release manifest.
pub const MANIFEST_NAME: &str = "releases.csv";

/// Decode the build matrix produced by `tiledb-pkg matrix`.
///
/// # Errors
///
/// Returns [`ReleaseError::Matrix`] if the JSON is malformed or an entry is
/// missing a required field.
pub fn parse_matrix(json: &str) -> Result<Vec<BuildConfig>, ReleaseError> {
    Ok(serde_json::from_str(json)?)
}

/// Where a configuration's tarball comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactSource {
    /// Already published: tarball and sidecar are copied as-is.
    Prebuilt,
    /// Built by this pipeline: tarball is copied, sidecar is generated.
    Built,
}

impl ArtifactSource {
    /// Pick the source for a matrix entry.
    pub fn for_config(config: &BuildConfig) -> Self {
        if config.prebuilt {
            Self::Prebuilt
        } else {
            Self::Built
        }
    }

    /// Directory the tarball is taken from.
    pub fn source_dir<'a>(&self, layout: &'a ReleaseLayout) -> &'a Path {
        match self {
            Self::Prebuilt => &layout.prebuilt_dir,
            Self::Built => &layout.artifacts_dir,
        }
    }

    /// Files copied verbatim from the source directory.
    pub fn copied_files(&self, config: &BuildConfig) -> Vec<String> {
        match self {
            Self::Prebuilt => vec![config.tarball.clone(), config.sidecar_name()],
            Self::Built => vec![config.tarball.clone()],
        }
    }
}

/// Counts and outputs of a finished assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseSummary {
    /// Entries copied from the prebuilt directory.
    pub prebuilt: usize,
    /// Entries copied from the artifacts directory and checksummed.
    pub built: usize,
    /// Path of the written manifest.
    pub manifest: PathBuf,
    /// Digest of the manifest.
    pub manifest_sha256: Sha256Digest,
}

/// Stages release files according to a [`ReleaseLayout`].
#[derive(Debug, Clone)]
pub struct ReleaseAssembler {
    layout: ReleaseLayout,
}

impl ReleaseAssembler {
    /// Create an assembler over the given directories.
    pub fn new(layout: ReleaseLayout) -> Self {
        Self { layout }
    }

    /// The directories in use.
    pub fn layout(&self) -> &ReleaseLayout {
        &self.layout
    }

    /// Stage every configuration, then write the manifest and its sidecar.
    ///
    /// # Errors
    ///
    /// Aborts on the first missing source file or failed write.
    pub fn assemble(&self, configs: &[BuildConfig]) -> Result<ReleaseSummary, ReleaseError> {
        let release_dir = &self.layout.release_dir;
        fs::create_dir_all(release_dir)
            .map_err(|e| ReleaseError::io("Failed to create", release_dir, e))?;

        let mut prebuilt = 0;
        let mut built = 0;
        for config in configs {
            match self.stage(config)? {
                ArtifactSource::Prebuilt => prebuilt += 1,
                ArtifactSource::Built => built += 1,
            }
        }

        let (manifest, manifest_sha256) = self.write_manifest(configs)?;
        Ok(ReleaseSummary {
            prebuilt,
            built,
            manifest,
            manifest_sha256,
        })
    }

    /// Copy one configuration's files into the release directory.
    ///
    /// Freshly built tarballs get a sidecar generated; prebuilt ones keep
    /// the sidecar they were published with.
    ///
    /// # Errors
    ///
    /// Returns an error if a source file is missing or a copy fails.
    pub fn stage(&self, config: &BuildConfig) -> Result<ArtifactSource, ReleaseError> {
        let source = ArtifactSource::for_config(config);
        let from_dir = source.source_dir(&self.layout);

        for name in source.copied_files(config) {
            let from = from_dir.join(&name);
            let to = self.layout.release_dir.join(&name);
            fs::copy(&from, &to).map_err(|e| ReleaseError::io("Failed to copy", &from, e))?;
        }

        let tarball = self.layout.release_dir.join(&config.tarball);
        match source {
            ArtifactSource::Prebuilt => {
                tracing::info!("prebuilt {}", config.tarball);
            }
            ArtifactSource::Built => {
                let digest = write_sidecar(&tarball)?;
                tracing::info!("built {} {digest}", config.tarball);
            }
        }

        Ok(source)
    }

    /// Build the manifest from the sidecars already in the release directory.
    ///
    /// # Errors
    ///
    /// Returns an error if a sidecar is missing or holds an invalid digest.
    pub fn manifest(&self, configs: &[BuildConfig]) -> Result<Manifest, ReleaseError> {
        let mut manifest = Manifest::new();
        for config in configs {
            let tarball = self.layout.release_dir.join(&config.tarball);
            let digest = read_sidecar(&sidecar_path(&tarball))?;
            manifest.push(ManifestLine::new(config, &self.layout.download_base, digest));
        }
        Ok(manifest)
    }

    /// Write `releases.csv` and `releases.csv.sha256`.
    ///
    /// Returns the manifest path and its digest.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest cannot be built or written.
    pub fn write_manifest(
        &self,
        configs: &[BuildConfig],
    ) -> Result<(PathBuf, Sha256Digest), ReleaseError> {
        let manifest = self.manifest(configs)?;
        let path = self.layout.release_dir.join(MANIFEST_NAME);

        fs::write(&path, manifest.render())
            .map_err(|e| ReleaseError::io("Failed to write", &path, e))?;
        let digest = write_sidecar(&path)?;

        tracing::info!("wrote {} ({} entries)", path.display(), manifest.len());
        Ok((path, digest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::sha256_file;
    use tempfile::{TempDir, tempdir};
    use tiledb_pkg_schema::{Linkage, PlatformConfig};

    fn config(platform: &str, version: &str, linkage: Linkage, prebuilt: bool) -> BuildConfig {
        let template = PlatformConfig::new(platform, "runner", "triplet");
        let mut cfg = BuildConfig::new(&template, version, "deadbee", linkage);
        cfg.prebuilt = prebuilt;
        cfg
    }

    fn workspace() -> (TempDir, ReleaseAssembler) {
        let tmp = tempdir().unwrap();
        let layout = ReleaseLayout::rooted_at(tmp.path());
        fs::create_dir_all(&layout.prebuilt_dir).unwrap();
        fs::create_dir_all(&layout.artifacts_dir).unwrap();
        (tmp, ReleaseAssembler::new(layout))
    }

    fn put_prebuilt(assembler: &ReleaseAssembler, cfg: &BuildConfig, sidecar: &str) {
        let dir = &assembler.layout().prebuilt_dir;
        fs::write(dir.join(&cfg.tarball), "prebuilt bytes").unwrap();
        fs::write(dir.join(cfg.sidecar_name()), sidecar).unwrap();
    }

    fn put_artifact(assembler: &ReleaseAssembler, cfg: &BuildConfig, contents: &str) {
        fs::write(
            assembler.layout().artifacts_dir.join(&cfg.tarball),
            contents,
        )
        .unwrap();
    }

    #[test]
    fn source_selection() {
        let pre = config("linux-x86_64", "main", Linkage::Dynamic, true);
        let fresh = config("linux-x86_64", "main", Linkage::Static, false);
        assert_eq!(ArtifactSource::for_config(&pre), ArtifactSource::Prebuilt);
        assert_eq!(ArtifactSource::for_config(&fresh), ArtifactSource::Built);
        assert_eq!(ArtifactSource::Prebuilt.copied_files(&pre).len(), 2);
        assert_eq!(
            ArtifactSource::Built.copied_files(&fresh),
            vec![fresh.tarball.clone()]
        );
    }

    #[test]
    fn parse_matrix_rejects_garbage() {
        assert!(matches!(
            parse_matrix("[{\"platform\": 1}]"),
            Err(ReleaseError::Matrix(_))
        ));
        assert!(matches!(parse_matrix("not json"), Err(ReleaseError::Matrix(_))));
        assert!(parse_matrix("[]").unwrap().is_empty());
    }

    #[test]
    fn parse_matrix_round_trips_generated_json() {
        let cfgs = vec![config("linux-aarch64", "main", Linkage::Dynamic, false)];
        let json = serde_json::to_string(&cfgs).unwrap();
        assert_eq!(parse_matrix(&json).unwrap(), cfgs);
    }

    #[test]
    fn stages_built_artifact_with_sidecar() {
        let (_tmp, assembler) = workspace();
        let cfg = config("linux-aarch64", "main", Linkage::Dynamic, false);
        put_artifact(&assembler, &cfg, "fresh bytes");
        fs::create_dir_all(&assembler.layout().release_dir).unwrap();

        assert_eq!(assembler.stage(&cfg).unwrap(), ArtifactSource::Built);

        let release = &assembler.layout().release_dir;
        let staged = release.join("tiledb-linux-arm64-main-deadbee.tar.gz");
        assert_eq!(fs::read_to_string(&staged).unwrap(), "fresh bytes");

        let sidecar = fs::read_to_string(sidecar_path(&staged)).unwrap();
        let digest = sha256_file(&staged).unwrap();
        assert_eq!(
            sidecar,
            format!("{digest}  tiledb-linux-arm64-main-deadbee.tar.gz\n")
        );
    }

    #[test]
    fn stages_prebuilt_verbatim() {
        let (_tmp, assembler) = workspace();
        let cfg = config("macos-arm64", "main", Linkage::Dynamic, true);
        let sidecar = format!("{}  {}\n", "c".repeat(64), cfg.tarball);
        put_prebuilt(&assembler, &cfg, &sidecar);
        fs::create_dir_all(&assembler.layout().release_dir).unwrap();

        assert_eq!(assembler.stage(&cfg).unwrap(), ArtifactSource::Prebuilt);

        let release = &assembler.layout().release_dir;
        assert_eq!(
            fs::read_to_string(release.join(cfg.sidecar_name())).unwrap(),
            sidecar
        );
    }

    #[test]
    fn missing_artifact_aborts() {
        let (_tmp, assembler) = workspace();
        let cfg = config("linux-x86_64", "main", Linkage::Static, false);
        let err = assembler.assemble(&[cfg]).unwrap_err();
        match err {
            ReleaseError::Io { action, path, .. } => {
                assert_eq!(action, "Failed to copy");
                assert!(path.ends_with("artifacts/tiledb-linux-x86_64-main-deadbee-static.tar.gz"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_prebuilt_sidecar_aborts() {
        let (_tmp, assembler) = workspace();
        let cfg = config("linux-x86_64", "main", Linkage::Dynamic, true);
        fs::write(assembler.layout().prebuilt_dir.join(&cfg.tarball), "x").unwrap();
        assert!(matches!(
            assembler.assemble(&[cfg]),
            Err(ReleaseError::Io { .. })
        ));
    }

    #[test]
    fn assembles_sorted_manifest() {
        let (_tmp, assembler) = workspace();
        let pre = config("macos-arm64", "main", Linkage::Dynamic, true);
        let fresh_arm = config("linux-aarch64", "2.27.0", Linkage::Static, false);
        let fresh_x86 = config("linux-x86_64", "main", Linkage::Dynamic, false);

        put_prebuilt(
            &assembler,
            &pre,
            &format!("{}  {}\n", "a".repeat(64), pre.tarball),
        );
        put_artifact(&assembler, &fresh_arm, "arm");
        put_artifact(&assembler, &fresh_x86, "x86");

        let configs = vec![pre, fresh_arm.clone(), fresh_x86];
        let summary = assembler.assemble(&configs).unwrap();
        assert_eq!(summary.prebuilt, 1);
        assert_eq!(summary.built, 2);

        let release = &assembler.layout().release_dir;
        assert_eq!(summary.manifest, release.join(MANIFEST_NAME));

        let csv = fs::read_to_string(&summary.manifest).unwrap();
        assert!(csv.ends_with('\n'));
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);

        let arm_digest = sha256_file(&release.join(&fresh_arm.tarball)).unwrap();
        assert_eq!(
            lines[0],
            format!(
                "LINUX-ARM64,2.27.0,static,https://github.com/TileDB-Inc/tiledb-rs/releases/download/nightlies/tiledb-linux-arm64-2.27.0-deadbee-static.tar.gz,{arm_digest}"
            )
        );
        assert!(lines[1].starts_with("LINUX-X86_64,main,dynamic,"));
        assert!(lines[2].starts_with("MACOS-ARM64,main,dynamic,"));
        assert!(lines[2].ends_with(&"a".repeat(64)));

        let manifest_sidecar = fs::read_to_string(release.join("releases.csv.sha256")).unwrap();
        assert_eq!(
            manifest_sidecar,
            format!("{}  releases.csv\n", summary.manifest_sha256)
        );
        assert_eq!(sha256_file(&summary.manifest).unwrap(), summary.manifest_sha256);
    }

    #[test]
    fn manifest_repeats_prebuilt_token_verbatim() {
        let (_tmp, assembler) = workspace();
        let cfg = config("linux-x86_64", "main", Linkage::Dynamic, true);
        let token = "AB".repeat(32);
        let sidecar = format!("{token}  {}\n", cfg.tarball);
        put_prebuilt(&assembler, &cfg, &sidecar);

        let summary = assembler.assemble(std::slice::from_ref(&cfg)).unwrap();

        let release = &assembler.layout().release_dir;
        assert_eq!(
            fs::read_to_string(release.join(cfg.sidecar_name())).unwrap(),
            sidecar
        );
        let csv = fs::read_to_string(&summary.manifest).unwrap();
        assert_eq!(
            csv,
            format!(
                "LINUX-X86_64,main,dynamic,https://github.com/TileDB-Inc/tiledb-rs/releases/download/nightlies/{},{token}\n",
                cfg.tarball
            )
        );
    }

    #[test]
    fn invalid_prebuilt_digest_aborts() {
        let (_tmp, assembler) = workspace();
        let cfg = config("linux-x86_64", "main", Linkage::Dynamic, true);
        put_prebuilt(&assembler, &cfg, "oops\n");
        assert!(matches!(
            assembler.assemble(&[cfg]),
            Err(ReleaseError::Digest { .. })
        ));
    }

    #[test]
    fn empty_matrix_writes_empty_manifest() {
        let (_tmp, assembler) = workspace();
        let summary = assembler.assemble(&[]).unwrap();
        assert_eq!(fs::read_to_string(&summary.manifest).unwrap(), "");
        assert_eq!(summary.prebuilt + summary.built, 0);
    }
}
