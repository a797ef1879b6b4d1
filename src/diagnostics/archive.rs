//! gzip-compressed tar bundles.

use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io;
use std::path::Path;

/// Pack `source_dir` into `archive_path`.
///
/// Entries are stored under the source directory's own name, so the bundle
/// unpacks into a single folder.
pub fn write_tar_gz(source_dir: &Path, archive_path: &Path) -> io::Result<()> {
    let root = source_dir.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("cannot archive '{}': no directory name", source_dir.display()),
        )
    })?;

    let file = File::create(archive_path)?;
    let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));
    builder.append_dir_all(root, source_dir)?;
    builder.into_inner()?.finish()?;
    Ok(())
}
