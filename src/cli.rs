//! Command-line options.
//!
//! The surface is small enough that the arguments are parsed by hand:
//! one positional input, two tuning flags, and an optional compare grid.

use std::path::PathBuf;

use thiserror::Error;

use crate::pick::DEFAULT_PICK_THRESHOLD;

/// Default output filename prefix.
pub const DEFAULT_PREFIX: &str = "labelmade-";

pub const USAGE: &str = "\
usage: labelmade [options] <input>

Label a 2D seismic section by drawing polygons over it.

arguments:
  <input>              source SEG-Y file

options:
  --threshold <float>  normalized pick distance for grabbing an outline
                       vertex (default 0.01)
  --prefix <string>    output filename prefix (default \"labelmade-\")
  -d, --compare <path> show a previously exported label grid as an
                       overlay; disables editing
  -h, --help           show this help

keys:
  enter   commit the outline as a polygon     escape  discard the outline
  d       delete the polygon under the cursor u       undo the last delete
  1-9     select a class, or reclassify the   w       write the labeled
          polygons under the cursor                   grid
";

/// Errors from argument parsing.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CliError {
    #[error("missing input file")]
    MissingInput,

    #[error("unexpected extra argument '{0}'")]
    ExtraArgument(String),

    #[error("unknown option '{0}'")]
    UnknownOption(String),

    #[error("option '{0}' expects a value")]
    MissingValue(String),

    #[error("invalid value '{value}' for '{option}'")]
    InvalidValue { option: String, value: String },

    /// `-h`/`--help`; not a failure, but parsing stops.
    #[error("help requested")]
    HelpRequested,
}

/// Parsed command-line options.
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    /// Source grid file.
    pub input: PathBuf,
    /// Normalized pick-distance tolerance for vertex hit-testing.
    pub threshold: f64,
    /// Output filename prefix.
    pub prefix: String,
    /// Previously exported label grid to overlay; switches the session to
    /// view-only.
    pub compare: Option<PathBuf>,
}

impl Options {
    /// Parse options from an argument iterator (without the program name).
    pub fn parse<I>(args: I) -> Result<Self, CliError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        let mut input = None;
        let mut threshold = DEFAULT_PICK_THRESHOLD;
        let mut prefix = DEFAULT_PREFIX.to_string();
        let mut compare = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-h" | "--help" => return Err(CliError::HelpRequested),
                "--threshold" => {
                    let value = args.next().ok_or_else(|| CliError::MissingValue(arg.clone()))?;
                    threshold = value.parse().map_err(|_| CliError::InvalidValue {
                        option: arg,
                        value,
                    })?;
                }
                "--prefix" => {
                    prefix = args.next().ok_or(CliError::MissingValue(arg))?;
                }
                "-d" | "--compare" => {
                    let value = args.next().ok_or(CliError::MissingValue(arg))?;
                    compare = Some(PathBuf::from(value));
                }
                _ if arg.starts_with('-') && arg.len() > 1 => {
                    return Err(CliError::UnknownOption(arg));
                }
                _ => {
                    if input.is_some() {
                        return Err(CliError::ExtraArgument(arg));
                    }
                    input = Some(PathBuf::from(arg));
                }
            }
        }

        Ok(Self {
            input: input.ok_or(CliError::MissingInput)?,
            threshold,
            prefix,
            compare,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Options, CliError> {
        Options::parse(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_defaults() {
        let options = parse(&["line.sgy"]).unwrap();
        assert_eq!(options.input, PathBuf::from("line.sgy"));
        assert_eq!(options.threshold, DEFAULT_PICK_THRESHOLD);
        assert_eq!(options.prefix, DEFAULT_PREFIX);
        assert_eq!(options.compare, None);
    }

    #[test]
    fn test_all_options() {
        let options = parse(&[
            "--threshold",
            "0.05",
            "--prefix",
            "labels/",
            "-d",
            "labelmade-line.sgy",
            "line.sgy",
        ])
        .unwrap();
        assert_eq!(options.threshold, 0.05);
        assert_eq!(options.prefix, "labels/");
        assert_eq!(options.compare, Some(PathBuf::from("labelmade-line.sgy")));
        assert_eq!(options.input, PathBuf::from("line.sgy"));
    }

    #[test]
    fn test_missing_input() {
        assert_eq!(parse(&[]), Err(CliError::MissingInput));
        assert_eq!(
            parse(&["--threshold", "0.1"]),
            Err(CliError::MissingInput)
        );
    }

    #[test]
    fn test_unknown_option() {
        assert_eq!(
            parse(&["--frobnicate", "line.sgy"]),
            Err(CliError::UnknownOption("--frobnicate".into()))
        );
    }

    #[test]
    fn test_extra_positional() {
        assert_eq!(
            parse(&["a.sgy", "b.sgy"]),
            Err(CliError::ExtraArgument("b.sgy".into()))
        );
    }

    #[test]
    fn test_bad_threshold() {
        assert_eq!(
            parse(&["--threshold", "wide", "line.sgy"]),
            Err(CliError::InvalidValue {
                option: "--threshold".into(),
                value: "wide".into(),
            })
        );
        assert_eq!(
            parse(&["line.sgy", "--threshold"]),
            Err(CliError::MissingValue("--threshold".into()))
        );
    }

    #[test]
    fn test_help() {
        assert_eq!(parse(&["-h"]), Err(CliError::HelpRequested));
        assert_eq!(parse(&["line.sgy", "--help"]), Err(CliError::HelpRequested));
    }
}
