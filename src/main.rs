use std::process::ExitCode;

use labelmade::{CliError, Options, USAGE};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let options = match Options::parse(std::env::args().skip(1)) {
        Ok(options) => options,
        Err(CliError::HelpRequested) => {
            print!("{USAGE}");
            return ExitCode::SUCCESS;
        }
        Err(err) => {
            eprintln!("error: {err}\n\n{USAGE}");
            return ExitCode::from(2);
        }
    };

    // Load failures abort before any window is shown.
    let section = match labelmade::read_section(&options.input) {
        Ok(section) => section,
        Err(err) => {
            eprintln!("error: cannot load {}: {err}", options.input.display());
            return ExitCode::FAILURE;
        }
    };

    let overlay = match &options.compare {
        Some(path) => match labelmade::read_section(path) {
            Ok(compare) if compare.shape() == section.shape() => Some(compare.class_labels()),
            Ok(compare) => {
                eprintln!(
                    "error: compare grid {} is {:?} but {} is {:?}",
                    path.display(),
                    compare.shape(),
                    options.input.display(),
                    section.shape()
                );
                return ExitCode::FAILURE;
            }
            Err(err) => {
                eprintln!("error: cannot load {}: {err}", path.display());
                return ExitCode::FAILURE;
            }
        },
        None => None,
    };

    if let Err(err) = labelmade::app::run(options, section, overlay) {
        eprintln!("error: {err}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
