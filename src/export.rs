//! Export: pair a label raster with the source grid's metadata and write
//! the labeled copy.
//!
//! The source file is reopened read-only for its headers at export time,
//! so a file moved or deleted since loading fails here with an I/O error
//! and nothing is written. The output is written to a temporary file next
//! to the destination and renamed into place, so a failed export never
//! leaves a half-written file under the final name.

use std::path::{Path, PathBuf};

use ndarray::Array2;
use thiserror::Error;

use crate::data::{self, SegyError};

/// Errors from the export action. These are fatal to the export only; the
/// interactive session carries on.
#[derive(Error, Debug)]
pub enum ExportError {
    /// Reading the source metadata or writing the copy failed.
    #[error(transparent)]
    Segy(#[from] SegyError),

    /// Placing the finished file at its destination failed.
    #[error("could not move labeled grid into place: {0}")]
    Rename(std::io::Error),
}

/// Output path for a labeled copy: `prefix + basename(input)`, resolved
/// in the current working directory.
pub fn labeled_output_path(input: &Path, prefix: &str) -> PathBuf {
    let basename = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    PathBuf::from(format!("{prefix}{basename}"))
}

/// Write `labels` as a labeled copy of the grid at `source`.
///
/// Returns the destination path on success. The copy carries every header
/// block of the source verbatim; only the trace payloads differ.
pub fn export_labels(
    source: &Path,
    labels: &Array2<u8>,
    output: &Path,
) -> Result<PathBuf, ExportError> {
    let metadata = data::read_metadata(source)?;

    let tmp = temp_path(output);
    if let Err(err) = data::write_labeled(&metadata, labels, &tmp) {
        // Do not leave a stray partial file behind.
        let _ = std::fs::remove_file(&tmp);
        return Err(err.into());
    }
    std::fs::rename(&tmp, output).map_err(ExportError::Rename)?;

    log::info!(
        "exported {} labeled traces to {}",
        labels.nrows(),
        output.display()
    );
    Ok(output.to_path_buf())
}

fn temp_path(output: &Path) -> PathBuf {
    let mut name = output
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    output.with_file_name(name)
}
