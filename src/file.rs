//! Whole-file wrappers around the codec.
//!
//! Output is assembled in memory, written to a temporary file next to the
//! destination and renamed into place, so a failed call leaves no output.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::{debug, info};
use tempfile::NamedTempFile;

use crate::decoder::decompress;
use crate::encoder::{CodecOptions, CompressionReport, compress_with};
use crate::error::Result;

pub const COMPRESSED_EXTENSION: &str = "huf";
pub const RESTORED_EXTENSION: &str = "orig";

/// `<path>.<extension>`, appended rather than replacing any existing extension.
pub fn with_suffix(path: &Path, extension: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}

pub fn compress_file(
    input: &Path,
    output: &Path,
    options: &CodecOptions,
) -> Result<CompressionReport> {
    info!("Reading input file: {}", input.display());
    let data = fs::read(input)?;
    let (bytes, report) = compress_with(&data, options)?;
    write_atomic(output, &bytes)?;
    Ok(report)
}

/// Returns the number of bytes restored.
pub fn decompress_file(input: &Path, output: &Path) -> Result<usize> {
    info!("Reading encoded file: {}", input.display());
    let data = fs::read(input)?;
    let bytes = decompress(&data)?;
    write_atomic(output, &bytes)?;
    Ok(bytes.len())
}

pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(bytes)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| e.error)?;

    debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}
