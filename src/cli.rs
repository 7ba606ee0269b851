use std::{ffi::OsString, path::PathBuf};

use clap::{CommandFactory, Parser, ValueEnum, error::ErrorKind};
use region_browser::{
    Error, Result,
    browser::{BrowserConfig, DEFAULT_STEP, DEFAULT_VISIBLE_COUNT},
    image_input::DEFAULT_HEIGHT,
    selective_search::{Backend, DEFAULT_SEED, DEFAULT_THREADS, Mode, SearchConfig},
};

/// Selective search method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Fast, lower recall
    #[value(name = "f")]
    Fast,
    /// Slow, higher recall
    #[value(name = "q")]
    Quality,
}

impl From<ModeArg> for Mode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Fast => Mode::Fast,
            ModeArg::Quality => Mode::Quality,
        }
    }
}

/// Region proposal implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendArg {
    /// Built-in selective search
    Builtin,
    /// OpenCV ximgproc selective search
    #[cfg(feature = "opencv")]
    Opencv,
}

impl From<BackendArg> for Backend {
    fn from(backend: BackendArg) -> Self {
        match backend {
            BackendArg::Builtin => Backend::Builtin,
            #[cfg(feature = "opencv")]
            BackendArg::Opencv => Backend::OpenCv,
        }
    }
}

/// Search an image for region proposals and browse them.
///
/// Press "m" for more regions, "l" for less and "q" to quit.
#[derive(Debug, Parser)]
#[command(version, after_help = KEYS_HELP)]
pub struct Cli {
    /// Input image
    pub input_image: PathBuf,

    /// Selective search method: f = fast, q = quality
    #[arg(value_enum)]
    pub mode: ModeArg,

    /// Regions shown at start
    #[arg(long, default_value_t = DEFAULT_VISIBLE_COUNT, allow_negative_numbers = true)]
    pub count: i64,

    /// Regions added or removed per key press
    #[arg(long, default_value_t = DEFAULT_STEP, allow_negative_numbers = true)]
    pub step: i64,

    /// Height the image is resized to before searching
    #[arg(long, default_value_t = DEFAULT_HEIGHT)]
    pub height: u32,

    /// Worker threads for the search (0 = one per core)
    #[arg(long, default_value_t = DEFAULT_THREADS)]
    pub threads: usize,

    /// Region proposal implementation (opencv when built with it, else builtin)
    #[arg(long, value_enum)]
    pub backend: Option<BackendArg>,

    /// Seed for the proposal ranking
    #[arg(long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Draw each region in its own colour instead of green
    #[arg(long)]
    pub distinct_colors: bool,
}

const KEYS_HELP: &str = "Keys: m = more regions, l = less regions, q = quit";

/// Validated settings for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub input_image: PathBuf,
    pub height: u32,
    pub search: SearchConfig,
    pub browser: BrowserConfig,
    pub distinct_colors: bool,
}

impl TryFrom<Cli> for Settings {
    type Error = Error;

    fn try_from(cli: Cli) -> Result<Self> {
        if cli.height == 0 {
            return Err(Error::InvalidConfiguration(
                "height must be positive".to_string(),
            ));
        }
        let browser = BrowserConfig {
            initial_count: cli.count,
            step: cli.step,
        };
        browser.validate()?;

        let mut search = SearchConfig::new(cli.mode.into());
        if let Some(backend) = cli.backend {
            search.backend = backend.into();
        }
        search.threads = cli.threads;
        search.seed = cli.seed;

        Ok(Settings {
            input_image: cli.input_image,
            height: cli.height,
            search,
            browser,
            distinct_colors: cli.distinct_colors,
        })
    }
}

/// What the command line asked for.
#[derive(Debug)]
pub enum Invocation {
    Run(Settings),
    /// `--help` or `--version`; the error carries the text to print.
    Info(clap::Error),
}

/// Parses and validates the command line.
pub fn parse<I, T>(args: I) -> Result<Invocation>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Cli::try_parse_from(args) {
        Ok(cli) => Ok(Invocation::Run(Settings::try_from(cli)?)),
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            Ok(Invocation::Info(err))
        }
        Err(err) => Err(Error::InvalidConfiguration(
            err.to_string().trim_end().to_string(),
        )),
    }
}

/// The usage text printed on a bad invocation.
pub fn usage() -> String {
    Cli::command().render_help().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(args: &[&str]) -> Settings {
        match parse(args.iter().copied()).unwrap() {
            Invocation::Run(settings) => settings,
            Invocation::Info(err) => panic!("unexpected info output: {err}"),
        }
    }

    #[test]
    fn test_defaults() {
        let s = settings(&["region-browser", "photo.jpg", "f"]);
        assert_eq!(s.input_image, PathBuf::from("photo.jpg"));
        assert_eq!(s.height, 600);
        assert_eq!(s.browser, BrowserConfig::default());
        assert_eq!(s.search, SearchConfig::new(Mode::Fast));
        assert!(!s.distinct_colors);
    }

    #[test]
    fn test_quality_mode_and_options() {
        let s = settings(&[
            "region-browser",
            "photo.jpg",
            "q",
            "--count",
            "10",
            "--step",
            "5",
            "--threads",
            "2",
            "--seed",
            "9",
            "--backend",
            "builtin",
            "--distinct-colors",
        ]);
        assert_eq!(s.search.mode, Mode::Quality);
        assert_eq!(s.search.threads, 2);
        assert_eq!(s.search.seed, 9);
        assert_eq!(s.search.backend, Backend::Builtin);
        assert_eq!(
            s.browser,
            BrowserConfig {
                initial_count: 10,
                step: 5
            }
        );
        assert!(s.distinct_colors);
    }

    #[test]
    fn test_unknown_mode_is_invalid_configuration() {
        let err = parse(["region-browser", "photo.jpg", "x"]).unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration(_)));
    }

    #[test]
    fn test_missing_arguments_are_invalid_configuration() {
        assert!(matches!(
            parse(["region-browser"]),
            Err(Error::InvalidConfiguration(_))
        ));
        assert!(matches!(
            parse(["region-browser", "photo.jpg"]),
            Err(Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_bad_browser_values_are_rejected() {
        for args in [
            ["region-browser", "photo.jpg", "f", "--step", "0"],
            ["region-browser", "photo.jpg", "f", "--count", "-1"],
            ["region-browser", "photo.jpg", "f", "--height", "0"],
        ] {
            assert!(matches!(parse(args), Err(Error::InvalidConfiguration(_))));
        }
    }

    #[test]
    fn test_help_is_info() {
        assert!(matches!(
            parse(["region-browser", "--help"]),
            Ok(Invocation::Info(_))
        ));
    }

    #[test]
    fn test_usage_mentions_modes() {
        let text = usage();
        assert!(text.contains("fast"));
        assert!(text.contains("quality"));
    }

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }
}
