//! Artifact extraction and wasm checksums.

use super::ArtifactResult;
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use zip::result::ZipError;
use zip::ZipArchive;

/// SHA-256 of one wasm module found in an artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WasmChecksum {
    /// Path relative to the artifact directory.
    pub path: PathBuf,
    /// Uppercase hex digest.
    pub sha256: String,
}

impl fmt::Display for WasmChecksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Data Hash {}: {}", self.path.display(), self.sha256)
    }
}

/// Result of unpacking a downloaded artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractOutcome {
    /// Extracted and the zip removed.
    Extracted {
        dir: PathBuf,
        checksums: Vec<WasmChecksum>,
    },
    /// The download was not a readable zip; it is kept for inspection.
    KeptArchive { path: PathBuf, reason: String },
}

/// Extract `zip_path` into `output_dir`, then list wasm checksums.
pub fn extract_archive(zip_path: &Path, output_dir: &Path) -> ArtifactResult<ExtractOutcome> {
    tracing::info!(dir = %output_dir.display(), "extracting artifact");

    let file = File::open(zip_path)?;
    let extracted = ZipArchive::new(file).and_then(|mut archive| archive.extract(output_dir));
    match extracted {
        Ok(()) => {}
        Err(ZipError::Io(e)) => return Err(e.into()),
        Err(other) => {
            tracing::warn!(
                path = %zip_path.display(),
                error = %other,
                "downloaded file is not a valid zip, keeping it"
            );
            return Ok(ExtractOutcome::KeptArchive {
                path: zip_path.to_path_buf(),
                reason: other.to_string(),
            });
        }
    }

    fs::remove_file(zip_path)?;
    let checksums = wasm_checksums(output_dir)?;
    if checksums.is_empty() {
        tracing::info!("no .wasm files found in the artifact");
    }

    Ok(ExtractOutcome::Extracted {
        dir: output_dir.to_path_buf(),
        checksums,
    })
}

/// Checksums of every `*.wasm` file under `dir`, sorted by relative path.
pub fn wasm_checksums(dir: &Path) -> io::Result<Vec<WasmChecksum>> {
    let mut files = Vec::new();
    collect_wasm_files(dir, &mut files)?;
    files.sort();

    files
        .into_iter()
        .map(|file| {
            let sha256 = sha256_file(&file)?;
            let path = file.strip_prefix(dir).unwrap_or(&file).to_path_buf();
            Ok(WasmChecksum { path, sha256 })
        })
        .collect()
}

/// Streamed SHA-256 of a file, uppercase hex.
pub fn sha256_file(path: &Path) -> io::Result<String> {
    let mut hasher = Sha256::new();
    let mut file = File::open(path)?;
    io::copy(&mut file, &mut hasher)?;
    Ok(hex::encode_upper(hasher.finalize()))
}

fn collect_wasm_files(dir: &Path, out: &mut Vec<PathBuf>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            collect_wasm_files(&path, out)?;
        } else if file_type.is_file() && path.extension().is_some_and(|ext| ext == "wasm") {
            out.push(path);
        }
    }
    Ok(())
}
