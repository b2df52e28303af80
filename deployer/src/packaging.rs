//! Release archive packaging.
//!
//! Each architecture's DLL is zipped on its own as
//! `<output_dir>/<Product>_<arch>.zip`. The program database is not archived;
//! it is copied next to the archive under the same stem so crash dumps can be
//! symbolised later.

use crate::arch::Architecture;
use crate::builder::BuildArtifact;
use crate::error::{DeployError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Archive and symbol paths produced for one architecture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagedArtifact {
    /// Architecture the files belong to.
    pub arch: Architecture,
    /// The DLL that was archived.
    pub binary_path: Utf8PathBuf,
    /// The created `.zip` archive.
    pub archive_path: Utf8PathBuf,
    /// The copied `.pdb`.
    pub debug_symbols_path: Utf8PathBuf,
}

/// The archive stem for `product` on `arch`, e.g. `DSpellCheck_x64`.
#[must_use]
pub fn archive_stem(product: &str, arch: Architecture) -> String {
    format!("{product}_{}", arch.tag())
}

/// Zip `artifact`'s binary into `<output_dir>/<archive_stem>.zip` and copy
/// its debug symbols to `<output_dir>/<archive_stem>.pdb`.
///
/// `output_dir` is created when missing. An existing archive is never
/// overwritten.
///
/// # Errors
///
/// Returns [`DeployError::ArchiveCollision`] if the archive already exists,
/// and I/O or zip errors if reading the inputs or writing the outputs fails.
/// A partially written archive is removed before the error is returned.
pub fn package(
    artifact: &BuildArtifact,
    output_dir: &Utf8Path,
    archive_stem: &str,
) -> Result<PackagedArtifact> {
    fs::create_dir_all(output_dir)?;
    let archive_path = output_dir.join(format!("{archive_stem}.zip"));
    let debug_symbols_path = output_dir.join(format!("{archive_stem}.pdb"));

    let archive = create_exclusive(&archive_path)?;
    if let Err(err) = write_archive(archive, &artifact.binary_path) {
        remove_partial_archive(&archive_path);
        return Err(err);
    }
    debug!("archived {} into {archive_path}", artifact.binary_path);

    fs::copy(&artifact.debug_symbols_path, &debug_symbols_path)?;
    debug!("copied {} to {debug_symbols_path}", artifact.debug_symbols_path);

    Ok(PackagedArtifact {
        arch: artifact.arch,
        binary_path: artifact.binary_path.clone(),
        archive_path,
        debug_symbols_path,
    })
}

/// Delete an archive left behind by a failed write. A failure to delete is
/// logged, since the next run will report the leftover as a collision.
fn remove_partial_archive(path: &Utf8Path) {
    if let Err(err) = fs::remove_file(path) {
        debug!("could not remove partial archive {path}: {err}");
    }
}

fn create_exclusive(path: &Utf8Path) -> Result<File> {
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| match e.kind() {
            io::ErrorKind::AlreadyExists => DeployError::ArchiveCollision {
                path: path.to_owned(),
            },
            _ => DeployError::Io(e),
        })
}

fn write_archive(file: File, binary_path: &Utf8Path) -> Result<()> {
    let entry_name = binary_path.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("binary path has no file name: {binary_path}"),
        )
    })?;

    let mut source = BufReader::new(File::open(binary_path)?);
    let mut zip = ZipWriter::new(file);
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    zip.start_file(entry_name, options)?;
    io::copy(&mut source, &mut zip)?;
    zip.finish()?;
    Ok(())
}
