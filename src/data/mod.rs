//! The grid data source: loading 2D seismic sections and writing labeled
//! copies.
//!
//! The tool reads a section once for display and reopens the file for
//! metadata when exporting; both acquisitions are short-lived and
//! read-only.

mod section;
mod segy;

pub use section::Section;
pub use segy::{SampleFormat, SegyError, SegyMetadata, read_metadata, read_section, write_labeled};
