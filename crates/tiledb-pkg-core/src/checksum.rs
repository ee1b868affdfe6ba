//! SHA-256 checksums and `.sha256` sidecar files.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tiledb_pkg_schema::Sha256Digest;

use crate::error::ReleaseError;

/// Extension appended to a file's name to get its sidecar.
pub const SIDECAR_EXTENSION: &str = "sha256";

/// Path of the sidecar for `path` (`foo.tar.gz` -> `foo.tar.gz.sha256`).
pub fn sidecar_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(SIDECAR_EXTENSION);
    PathBuf::from(name)
}

/// Compute SHA256 hash of a file (streaming)
///
/// # Errors
///
/// Returns an error if the file cannot be opened or read.
pub fn sha256_file(path: &Path) -> Result<Sha256Digest, ReleaseError> {
    let mut file = fs::File::open(path).map_err(|e| ReleaseError::io("Failed to open", path, e))?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 65536]; // 64KB buffer

    loop {
        let bytes_read = file
            .read(&mut buffer)
            .map_err(|e| ReleaseError::io("Failed to read", path, e))?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(Sha256Digest::from_bytes(&hasher.finalize()))
}

/// Hash `path` and write `<path>.sha256` next to it.
///
/// The sidecar names the file by basename only, so it stays valid when the
/// pair is moved together.
///
/// # Errors
///
/// Returns an error if the file cannot be hashed or the sidecar written.
pub fn write_sidecar(path: &Path) -> Result<Sha256Digest, ReleaseError> {
    let digest = sha256_file(path)?;
    let basename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let sidecar = sidecar_path(path);
    fs::write(&sidecar, digest.sidecar_line(&basename))
        .map_err(|e| ReleaseError::io("Failed to write", &sidecar, e))?;

    tracing::debug!("{digest}  {basename}");
    Ok(digest)
}

/// Read the digest recorded in a sidecar file.
///
/// # Errors
///
/// Returns an error if the sidecar cannot be read or its first token is not
/// a SHA-256 digest.
pub fn read_sidecar(sidecar: &Path) -> Result<Sha256Digest, ReleaseError> {
    let contents = fs::read_to_string(sidecar)
        .map_err(|e| ReleaseError::io("Failed to read", sidecar, e))?;
    Sha256Digest::from_sidecar(&contents).map_err(|source| ReleaseError::Digest {
        path: sidecar.to_path_buf(),
        source,
    })
}

/// Outcome of checking one file against its sidecar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SidecarCheck {
    /// The file hashes to the recorded digest.
    Match,
    /// The file's digest differs from the recorded one.
    Mismatch {
        /// Digest recorded in the sidecar.
        expected: Sha256Digest,
        /// Digest of the file on disk.
        actual: Sha256Digest,
    },
}

/// Re-hash `path` and compare it with `<path>.sha256`.
///
/// # Errors
///
/// Returns an error if either file cannot be read or the sidecar is invalid.
pub fn verify_sidecar(path: &Path) -> Result<SidecarCheck, ReleaseError> {
    let expected = read_sidecar(&sidecar_path(path))?;
    let actual = sha256_file(path)?;

    if expected.matches(&actual) {
        Ok(SidecarCheck::Match)
    } else {
        Ok(SidecarCheck::Mismatch { expected, actual })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    // sha256("hello world")
    const HELLO: &str = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";

    #[test]
    fn sidecar_path_appends() {
        assert_eq!(
            sidecar_path(Path::new("release/tiledb-macos-arm64-main-abc1234.tar.gz")),
            PathBuf::from("release/tiledb-macos-arm64-main-abc1234.tar.gz.sha256")
        );
        assert_eq!(
            sidecar_path(Path::new("releases.csv")),
            PathBuf::from("releases.csv.sha256")
        );
    }

    #[test]
    fn hashes_file() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("hello.txt");
        fs::write(&path, "hello world").unwrap();
        assert_eq!(sha256_file(&path).unwrap().as_str(), HELLO);
    }

    #[test]
    fn hashes_file_larger_than_buffer() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("big.bin");
        let data = vec![7u8; 200_000];
        fs::write(&path, &data).unwrap();

        let expected = Sha256Digest::from_bytes(&Sha256::digest(&data));
        assert_eq!(sha256_file(&path).unwrap(), expected);
    }

    #[test]
    fn sidecar_format_is_exact() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("tiledb-linux-x86_64-main-deadbee.tar.gz");
        fs::write(&path, "hello world").unwrap();

        let digest = write_sidecar(&path).unwrap();
        assert_eq!(digest.as_str(), HELLO);

        let written = fs::read_to_string(sidecar_path(&path)).unwrap();
        assert_eq!(
            written,
            format!("{HELLO}  tiledb-linux-x86_64-main-deadbee.tar.gz\n")
        );
        assert_eq!(read_sidecar(&sidecar_path(&path)).unwrap(), digest);
    }

    #[test]
    fn missing_file_is_an_error() {
        let tmp = tempdir().unwrap();
        let err = write_sidecar(&tmp.path().join("absent.tar.gz")).unwrap_err();
        assert!(matches!(err, ReleaseError::Io { .. }));
    }

    #[test]
    fn garbage_sidecar_is_rejected() {
        let tmp = tempdir().unwrap();
        let sidecar = tmp.path().join("x.tar.gz.sha256");
        fs::write(&sidecar, "not-a-digest  x.tar.gz\n").unwrap();
        assert!(matches!(
            read_sidecar(&sidecar),
            Err(ReleaseError::Digest { .. })
        ));
    }

    #[test]
    fn detects_tampering() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("a.tar.gz");
        fs::write(&path, "hello world").unwrap();
        write_sidecar(&path).unwrap();
        assert_eq!(verify_sidecar(&path).unwrap(), SidecarCheck::Match);

        fs::write(&path, "hello world!").unwrap();
        match verify_sidecar(&path).unwrap() {
            SidecarCheck::Mismatch { expected, actual } => {
                assert_eq!(expected.as_str(), HELLO);
                assert_ne!(actual.as_str(), HELLO);
            }
            SidecarCheck::Match => panic!("tampered file verified"),
        }
    }

    #[test]
    fn uppercase_sidecar_verifies() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("a.tar.gz");
        fs::write(&path, "hello world").unwrap();
        fs::write(
            sidecar_path(&path),
            format!("{}  a.tar.gz\n", HELLO.to_uppercase()),
        )
        .unwrap();

        assert_eq!(verify_sidecar(&path).unwrap(), SidecarCheck::Match);
        assert_eq!(
            read_sidecar(&sidecar_path(&path)).unwrap().as_str(),
            HELLO.to_uppercase()
        );
    }
}
