use crate::present::DisplayMode;
use clap::{ArgAction, Parser};
use log::LevelFilter;
use std::path::PathBuf;
use std::time::Duration;

/// Command line of the `metasift` binary.
#[derive(Debug, Parser)]
#[command(
    name = "metasift",
    version,
    about = "Extract metadata (EXIF, IPTC, XMP, GPS) from images and videos using ExifTool",
    after_help = "Examples:\n  metasift image.jpg\n  metasift video.mp4 --save\n  metasift photo.png -s -d"
)]
pub struct Cli {
    /// Image or video file to inspect
    pub file_path: PathBuf,

    /// Save the metadata to a text report next to the file
    #[arg(short, long)]
    pub save: bool,

    /// Show the unprocessed ExifTool output instead of the categorized view
    #[arg(short, long)]
    pub raw: bool,

    /// Show every line of every category
    #[arg(short, long)]
    pub detailed: bool,

    /// Print a JSON document instead of the terminal view
    #[arg(short, long)]
    pub json: bool,

    /// Disable ANSI colors (also honoured via NO_COLOR)
    #[arg(long)]
    pub no_color: bool,

    /// ExifTool executable to run
    #[arg(long, env = "METASIFT_EXIFTOOL", default_value = "exiftool")]
    pub exiftool: PathBuf,

    /// Kill ExifTool if it runs longer than this many seconds
    #[arg(long, env = "METASIFT_TIMEOUT", value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Log level used when `RUST_LOG` is not set.
    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

/// Everything one run needs, resolved from the command line and environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub file_path: PathBuf,
    pub save: bool,
    pub mode: DisplayMode,
    pub json: bool,
    pub color: bool,
    pub exiftool: PathBuf,
    pub timeout: Option<Duration>,
}

impl Config {
    /// `terminal` tells whether stdout is a terminal; colors are only used there.
    pub fn from_cli(cli: Cli, terminal: bool) -> Self {
        let color = terminal && !cli.no_color && std::env::var_os("NO_COLOR").is_none();
        Self {
            mode: DisplayMode::from_flags(cli.raw, cli.detailed),
            timeout: cli.timeout.map(Duration::from_secs),
            file_path: cli.file_path,
            save: cli.save,
            json: cli.json,
            color,
            exiftool: cli.exiftool,
        }
    }

    /// Config for `file_path` with defaults, colors off.
    pub fn for_file(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
            save: false,
            mode: DisplayMode::default(),
            json: false,
            color: false,
            exiftool: PathBuf::from("exiftool"),
            timeout: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flags() {
        let cli = Cli::try_parse_from([
            "metasift",
            "photo.jpg",
            "-s",
            "--raw",
            "-d",
            "--timeout",
            "30",
        ])
        .unwrap();
        assert_eq!(cli.file_path, PathBuf::from("photo.jpg"));
        assert!(cli.save);
        assert!(cli.raw);
        assert!(cli.detailed);
        assert!(!cli.json);

        let config = Config::from_cli(cli, false);
        assert_eq!(config.mode, DisplayMode::Raw);
        assert_eq!(config.timeout, Some(Duration::from_secs(30)));
        assert!(!config.color);
    }

    #[test]
    fn test_no_color_flag_wins_on_terminal() {
        let cli = Cli::try_parse_from(["metasift", "a.mp4", "--no-color"]).unwrap();
        assert!(!Config::from_cli(cli, true).color);
    }

    #[test]
    fn test_missing_file_argument_is_an_error() {
        let err = Cli::try_parse_from(["metasift"]).unwrap_err();
        assert!(err.use_stderr());
    }

    #[test]
    fn test_help_is_not_an_error() {
        let err = Cli::try_parse_from(["metasift", "--help"]).unwrap_err();
        assert!(!err.use_stderr());
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_log_level_from_verbosity() {
        let quiet = Cli::try_parse_from(["metasift", "a.jpg"]).unwrap();
        assert_eq!(quiet.log_level(), LevelFilter::Warn);
        let chatty = Cli::try_parse_from(["metasift", "a.jpg", "-vv"]).unwrap();
        assert_eq!(chatty.log_level(), LevelFilter::Debug);
    }

    #[test]
    fn test_for_file_defaults() {
        let config = Config::for_file("clip.mov");
        assert_eq!(config.mode, DisplayMode::Summary);
        assert_eq!(config.exiftool, PathBuf::from("exiftool"));
        assert!(config.timeout.is_none());
    }
}
