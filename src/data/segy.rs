//! Minimal SEG-Y reader/writer.
//!
//! Implements the subset the tool needs: the 3200-byte textual header, the
//! 400-byte binary header, optional extended textual headers, and
//! fixed-length traces of 4-byte samples in IBM (format code 1) or IEEE
//! (format code 5) floating point. Trace count is derived from the file
//! size. Anything else - variable-length traces, integer sample formats,
//! stanza-terminated extended headers - is rejected with a typed error
//! rather than guessed at.
//!
//! Headers are treated as opaque byte blocks: the tool never interprets
//! them beyond the three binary-header fields below, and the exporter
//! copies them verbatim so the labeled file stays structurally identical
//! to its source.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

use ndarray::Array2;
use thiserror::Error;

use super::Section;

/// Length of the (extended) textual header blocks.
pub const TEXT_HEADER_LEN: usize = 3200;
/// Length of the binary file header.
pub const BINARY_HEADER_LEN: usize = 400;
/// Length of each trace header.
pub const TRACE_HEADER_LEN: usize = 240;
/// All supported sample formats are 4 bytes wide.
const SAMPLE_LEN: usize = 4;

// Binary header field offsets (zero-based within the 400-byte block).
const BIN_SAMPLES_PER_TRACE: usize = 20;
const BIN_FORMAT_CODE: usize = 24;
const BIN_EXT_HEADER_COUNT: usize = 304;

/// Errors from SEG-Y reading and writing.
#[derive(Error, Debug)]
pub enum SegyError {
    /// I/O failure while reading or writing the file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file does not follow the structure this reader supports.
    #[error("malformed SEG-Y file: {0}")]
    Malformed(String),

    /// Sample format code other than IBM (1) or IEEE (5) float.
    #[error("unsupported sample format code {0} (only IBM and IEEE float are supported)")]
    UnsupportedFormat(u16),

    /// Label matrix shape does not match the grid being written.
    #[error("label matrix is {found:?} but the grid is {expected:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },
}

/// Trace sample encoding, from the binary header's format code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleFormat {
    /// Format code 1: IBM System/360 hexadecimal float.
    IbmFloat,
    /// Format code 5: IEEE 754 single precision.
    IeeeFloat,
}

impl SampleFormat {
    fn from_code(code: u16) -> Result<Self, SegyError> {
        match code {
            1 => Ok(Self::IbmFloat),
            5 => Ok(Self::IeeeFloat),
            other => Err(SegyError::UnsupportedFormat(other)),
        }
    }

    pub fn code(self) -> u16 {
        match self {
            Self::IbmFloat => 1,
            Self::IeeeFloat => 5,
        }
    }

    fn decode(self, bytes: [u8; 4]) -> f32 {
        match self {
            Self::IbmFloat => ibm_to_f32(u32::from_be_bytes(bytes)),
            Self::IeeeFloat => f32::from_be_bytes(bytes),
        }
    }

    fn encode(self, value: f32) -> [u8; 4] {
        match self {
            Self::IbmFloat => f32_to_ibm(value).to_be_bytes(),
            Self::IeeeFloat => value.to_be_bytes(),
        }
    }
}

/// Convert an IBM hexadecimal float to IEEE single precision.
///
/// IBM layout: sign bit, 7-bit excess-64 base-16 exponent, 24-bit
/// fraction in [1/16, 1).
fn ibm_to_f32(bits: u32) -> f32 {
    if bits & 0x7fff_ffff == 0 {
        return 0.0;
    }
    let sign = if bits >> 31 == 1 { -1.0f32 } else { 1.0 };
    let exponent = ((bits >> 24) & 0x7f) as i32 - 64;
    let fraction = (bits & 0x00ff_ffff) as f32 / (1u32 << 24) as f32;
    sign * fraction * 16f32.powi(exponent)
}

/// Convert an IEEE single to IBM hexadecimal float. Values the IBM format
/// cannot represent exactly are truncated toward zero.
fn f32_to_ibm(value: f32) -> u32 {
    if value == 0.0 {
        return 0;
    }
    let sign = if value < 0.0 { 1u32 } else { 0 };
    let mut fraction = value.abs();
    let mut exponent = 0i32;
    while fraction >= 1.0 {
        fraction /= 16.0;
        exponent += 1;
    }
    while fraction < 0.0625 {
        fraction *= 16.0;
        exponent -= 1;
    }
    let bits = (fraction * (1u32 << 24) as f32) as u32 & 0x00ff_ffff;
    (sign << 31) | ((exponent + 64).clamp(0, 127) as u32) << 24 | bits
}

/// Everything the exporter must carry over from a source file: the header
/// blocks verbatim plus the structural facts needed to lay out traces.
#[derive(Debug, Clone)]
pub struct SegyMetadata {
    /// The 3200-byte textual header, verbatim (EBCDIC or ASCII; never
    /// transcoded).
    pub textual: Vec<u8>,
    /// The 400-byte binary header, verbatim.
    pub binary: Vec<u8>,
    /// Extended textual headers, verbatim, 3200 bytes each.
    pub extended: Vec<u8>,
    /// Every 240-byte trace header, in file order.
    pub trace_headers: Vec<[u8; TRACE_HEADER_LEN]>,
    pub format: SampleFormat,
    pub samples_per_trace: usize,
}

impl SegyMetadata {
    pub fn trace_count(&self) -> usize {
        self.trace_headers.len()
    }

    /// `(rows, cols)` = (traces, samples per trace), matching
    /// [`Section::shape`].
    pub fn shape(&self) -> (usize, usize) {
        (self.trace_count(), self.samples_per_trace)
    }
}

/// Parsed file headers plus trace layout, before any trace is read.
struct FileLayout {
    textual: Vec<u8>,
    binary: Vec<u8>,
    extended: Vec<u8>,
    format: SampleFormat,
    samples_per_trace: usize,
    trace_count: usize,
}

fn parse_layout<R: Read + Seek>(reader: &mut R) -> Result<FileLayout, SegyError> {
    let total = reader.seek(SeekFrom::End(0))? as usize;
    reader.seek(SeekFrom::Start(0))?;

    if total < TEXT_HEADER_LEN + BINARY_HEADER_LEN {
        return Err(SegyError::Malformed(
            "file too short for textual and binary headers".into(),
        ));
    }

    let mut textual = vec![0u8; TEXT_HEADER_LEN];
    reader.read_exact(&mut textual)?;
    let mut binary = vec![0u8; BINARY_HEADER_LEN];
    reader.read_exact(&mut binary)?;

    let samples_per_trace =
        u16::from_be_bytes([binary[BIN_SAMPLES_PER_TRACE], binary[BIN_SAMPLES_PER_TRACE + 1]])
            as usize;
    if samples_per_trace == 0 {
        return Err(SegyError::Malformed(
            "binary header declares zero samples per trace".into(),
        ));
    }

    let code = u16::from_be_bytes([binary[BIN_FORMAT_CODE], binary[BIN_FORMAT_CODE + 1]]);
    let format = SampleFormat::from_code(code)?;

    let ext_count =
        i16::from_be_bytes([binary[BIN_EXT_HEADER_COUNT], binary[BIN_EXT_HEADER_COUNT + 1]]);
    if ext_count < 0 {
        return Err(SegyError::Malformed(
            "stanza-terminated extended textual headers are not supported".into(),
        ));
    }
    let ext_len = ext_count as usize * TEXT_HEADER_LEN;
    let data_start = TEXT_HEADER_LEN + BINARY_HEADER_LEN + ext_len;
    if total < data_start {
        return Err(SegyError::Malformed(format!(
            "file too short for {} declared extended textual header(s)",
            ext_count
        )));
    }
    let mut extended = vec![0u8; ext_len];
    reader.read_exact(&mut extended)?;

    let trace_len = TRACE_HEADER_LEN + samples_per_trace * SAMPLE_LEN;
    let body = total - data_start;
    if body % trace_len != 0 {
        return Err(SegyError::Malformed(format!(
            "trace data ({} bytes) is not a whole number of {}-byte traces",
            body, trace_len
        )));
    }

    Ok(FileLayout {
        textual,
        binary,
        extended,
        format,
        samples_per_trace,
        trace_count: body / trace_len,
    })
}

/// Load the sample matrix of a section for display and rasterization.
pub fn read_section(path: &Path) -> Result<Section, SegyError> {
    let mut reader = BufReader::new(File::open(path)?);
    let section = read_section_from(&mut reader)?;
    log::info!(
        "loaded {}: {} traces x {} samples",
        path.display(),
        section.rows(),
        section.cols()
    );
    Ok(section)
}

fn read_section_from<R: Read + Seek>(reader: &mut R) -> Result<Section, SegyError> {
    let layout = parse_layout(reader)?;
    let (rows, cols) = (layout.trace_count, layout.samples_per_trace);

    let mut samples = Array2::zeros((rows, cols));
    let mut payload = vec![0u8; cols * SAMPLE_LEN];
    for r in 0..rows {
        reader.seek(SeekFrom::Current(TRACE_HEADER_LEN as i64))?;
        reader.read_exact(&mut payload)?;
        for (c, chunk) in payload.chunks_exact(SAMPLE_LEN).enumerate() {
            samples[[r, c]] = layout
                .format
                .decode([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
    }

    Ok(Section::from_samples(samples))
}

/// Reopen a section for its metadata only: header blocks and trace
/// headers, with sample payloads skipped.
pub fn read_metadata(path: &Path) -> Result<SegyMetadata, SegyError> {
    let mut reader = BufReader::new(File::open(path)?);
    read_metadata_from(&mut reader)
}

fn read_metadata_from<R: Read + Seek>(reader: &mut R) -> Result<SegyMetadata, SegyError> {
    let layout = parse_layout(reader)?;
    let payload_len = (layout.samples_per_trace * SAMPLE_LEN) as i64;

    let mut trace_headers = Vec::with_capacity(layout.trace_count);
    for _ in 0..layout.trace_count {
        let mut header = [0u8; TRACE_HEADER_LEN];
        reader.read_exact(&mut header)?;
        reader.seek(SeekFrom::Current(payload_len))?;
        trace_headers.push(header);
    }

    Ok(SegyMetadata {
        textual: layout.textual,
        binary: layout.binary,
        extended: layout.extended,
        trace_headers,
        format: layout.format,
        samples_per_trace: layout.samples_per_trace,
    })
}

/// Write a labeled copy of a grid: all header blocks verbatim, with each
/// trace's sample payload replaced by the matching label raster row in the
/// source's native sample format.
pub fn write_labeled(
    metadata: &SegyMetadata,
    labels: &Array2<u8>,
    path: &Path,
) -> Result<(), SegyError> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_labeled_to(metadata, labels, &mut writer)?;
    writer.flush()?;
    Ok(())
}

fn write_labeled_to<W: Write>(
    metadata: &SegyMetadata,
    labels: &Array2<u8>,
    writer: &mut W,
) -> Result<(), SegyError> {
    if labels.dim() != metadata.shape() {
        return Err(SegyError::ShapeMismatch {
            expected: metadata.shape(),
            found: labels.dim(),
        });
    }

    writer.write_all(&metadata.textual)?;
    writer.write_all(&metadata.binary)?;
    writer.write_all(&metadata.extended)?;
    for (header, row) in metadata.trace_headers.iter().zip(labels.rows()) {
        writer.write_all(header)?;
        for &label in row {
            writer.write_all(&metadata.format.encode(f32::from(label)))?;
        }
    }
    Ok(())
}
