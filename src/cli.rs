//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use archive_mirror::config::DEFAULT_OUTPUT_DIR;
use archive_mirror::{DEFAULT_PAGE_SIZE, FailurePolicy, MirrorConfig};

/// Mirror a remote image archive's metadata and images to local disk.
///
/// Pages through the archive listing, saves `{id}.json` and `{id}.jpg` for
/// every item, and pauses between pages to respect the archive's rate limits.
#[derive(Parser, Debug)]
#[command(name = "archive-mirror")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Archive API root
    #[arg(long, default_value = archive_mirror::archive::DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Directory receiving the downloaded files
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// Items requested per listing page (1-50)
    #[arg(short, long, default_value_t = DEFAULT_PAGE_SIZE as u8, value_parser = clap::value_parser!(u8).range(1..=50))]
    pub page_size: u8,

    /// Pause between pages in milliseconds (0 to disable, max 60000)
    #[arg(short, long, default_value_t = 500, value_parser = clap::value_parser!(u64).range(0..=60000))]
    pub throttle_ms: u64,

    /// Maximum concurrent item downloads (1-100); defaults to the page size
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub concurrency: Option<u8>,

    /// What to do when an item fails
    #[arg(long, value_enum, default_value_t = OnError::FailFast)]
    pub on_error: OnError,

    /// Stop after this many pages
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
    pub max_pages: Option<u16>,
}

/// CLI spelling of [`FailurePolicy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OnError {
    /// Abort on the first failed item
    FailFast,
    /// Finish the page, then abort listing every failed item
    CollectAll,
    /// Log failed items and keep going
    Continue,
}

impl From<OnError> for FailurePolicy {
    fn from(value: OnError) -> Self {
        match value {
            OnError::FailFast => Self::FailFast,
            OnError::CollectAll => Self::CollectAll,
            OnError::Continue => Self::Continue,
        }
    }
}

impl Args {
    /// Builds the run configuration from parsed flags.
    pub fn to_config(&self) -> MirrorConfig {
        let page_size = usize::from(self.page_size);
        MirrorConfig::new(self.base_url.clone(), self.output_dir.clone())
            .with_page_size(page_size)
            .with_throttle(Duration::from_millis(self.throttle_ms))
            .with_concurrency(self.concurrency.map_or(page_size, usize::from))
            .with_failure_policy(self.on_error.into())
            .with_max_pages(self.max_pages.map(usize::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default_args_parses_successfully() {
        let args = Args::try_parse_from(["archive-mirror"]).unwrap();
        assert_eq!(args.verbose, 0);
        assert!(!args.quiet);
        assert_eq!(args.base_url, "https://isic-archive.com/api/v1");
        assert_eq!(args.output_dir, PathBuf::from("data"));
        assert_eq!(args.page_size, 20);
        assert_eq!(args.throttle_ms, 500);
        assert_eq!(args.concurrency, None);
        assert_eq!(args.on_error, OnError::FailFast);
        assert_eq!(args.max_pages, None);
    }

    #[test]
    fn test_cli_defaults_map_to_default_config() {
        let config = Args::try_parse_from(["archive-mirror"]).unwrap().to_config();
        let defaults = MirrorConfig::default();
        assert_eq!(config.base_url, defaults.base_url);
        assert_eq!(config.output_dir, defaults.output_dir);
        assert_eq!(config.page_size, defaults.page_size);
        assert_eq!(config.throttle, defaults.throttle);
        assert_eq!(config.concurrency, defaults.concurrency);
        assert_eq!(config.failure_policy, defaults.failure_policy);
    }

    #[test]
    fn test_cli_verbose_flag_increments_count() {
        let args = Args::try_parse_from(["archive-mirror", "-vv"]).unwrap();
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_cli_page_size_max_value() {
        let args = Args::try_parse_from(["archive-mirror", "-p", "50"]).unwrap();
        assert_eq!(args.page_size, 50);
    }

    #[test]
    fn test_cli_page_size_over_max_rejected() {
        let err = Args::try_parse_from(["archive-mirror", "--page-size", "51"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_cli_page_size_zero_rejected() {
        let err = Args::try_parse_from(["archive-mirror", "-p", "0"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_cli_concurrency_defaults_to_page_size() {
        let config = Args::try_parse_from(["archive-mirror", "-p", "35"])
            .unwrap()
            .to_config();
        assert_eq!(config.concurrency, 35);
    }

    #[test]
    fn test_cli_concurrency_decoupled_from_page_size() {
        let config = Args::try_parse_from(["archive-mirror", "-p", "50", "-c", "4"])
            .unwrap()
            .to_config();
        assert_eq!(config.page_size, 50);
        assert_eq!(config.concurrency, 4);
    }

    #[test]
    fn test_cli_concurrency_over_max_rejected() {
        let err = Args::try_parse_from(["archive-mirror", "-c", "101"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_cli_throttle_zero_disables() {
        let config = Args::try_parse_from(["archive-mirror", "-t", "0"])
            .unwrap()
            .to_config();
        assert!(config.throttle.is_zero());
    }

    #[test]
    fn test_cli_throttle_over_max_rejected() {
        let err = Args::try_parse_from(["archive-mirror", "--throttle-ms", "60001"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_cli_on_error_values() {
        let args = Args::try_parse_from(["archive-mirror", "--on-error", "collect-all"]).unwrap();
        assert_eq!(
            FailurePolicy::from(args.on_error),
            FailurePolicy::CollectAll
        );

        let args = Args::try_parse_from(["archive-mirror", "--on-error", "continue"]).unwrap();
        assert_eq!(FailurePolicy::from(args.on_error), FailurePolicy::Continue);

        let err = Args::try_parse_from(["archive-mirror", "--on-error", "retry"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
    }

    #[test]
    fn test_cli_numeric_flags_widen_into_config() {
        let config = Args::try_parse_from([
            "archive-mirror",
            "-p",
            "50",
            "-c",
            "100",
            "--max-pages",
            "1000",
        ])
        .unwrap()
        .to_config();
        assert_eq!(config.page_size, 50);
        assert_eq!(config.concurrency, 100);
        assert_eq!(config.max_pages, Some(1000));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cli_max_pages_zero_rejected() {
        let err = Args::try_parse_from(["archive-mirror", "--max-pages", "0"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_cli_invalid_flag_returns_error() {
        let err = Args::try_parse_from(["archive-mirror", "--invalid-flag"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }
}
