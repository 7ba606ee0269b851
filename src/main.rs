mod cli;
mod viewer;

use std::process::ExitCode;

use log::{error, info};
use region_browser::{
    Error, Result,
    browser::{OverlayStyle, RegionBrowser},
    pipeline::propose_from_path,
};

use crate::cli::{Invocation, Settings};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = match cli::parse(std::env::args_os()) {
        Ok(Invocation::Run(settings)) => settings,
        Ok(Invocation::Info(output)) => {
            return match output.print() {
                Ok(()) => ExitCode::SUCCESS,
                Err(err) => {
                    error!("Failed to print help: {err}");
                    ExitCode::from(FAILURE_STATUS)
                }
            };
        }
        Err(err) => return fail(err),
    };

    match run(settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => fail(err),
    }
}

fn run(settings: Settings) -> Result<()> {
    info!(
        "Searching {} ({:?})",
        settings.input_image.display(),
        settings.search.mode
    );
    let proposals = propose_from_path(&settings.input_image, settings.height, &settings.search)?;
    println!(
        "Total number of Region Proposals: {}",
        proposals.regions.len()
    );

    let style = if settings.distinct_colors {
        OverlayStyle::distinct(proposals.regions.len())
    } else {
        OverlayStyle::default()
    };
    let browser = RegionBrowser::new(proposals.image, proposals.regions, settings.browser, style)?;
    viewer::run(browser)?;
    info!("Bye");
    Ok(())
}

const FAILURE_STATUS: u8 = 1;

/// What a fatal error leaves behind.
#[derive(Debug, PartialEq, Eq)]
struct Failure {
    status: u8,
    /// Logged to stderr.
    message: String,
    /// Printed to stdout.
    usage: String,
}

impl From<&Error> for Failure {
    fn from(err: &Error) -> Self {
        Failure {
            status: FAILURE_STATUS,
            message: err.to_string(),
            usage: cli::usage(),
        }
    }
}

fn fail(err: Error) -> ExitCode {
    let failure = Failure::from(&err);
    error!("{}", failure.message);
    println!("{}", failure.usage);
    ExitCode::from(failure.status)
}
