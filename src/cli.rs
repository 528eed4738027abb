use clap::{ArgAction, Parser};
use exifsift_config::{Overrides, split};
use exifsift_pipeline::MatchPolicy;
use std::path::PathBuf;

/// Copy images whose embedded metadata matches a query into another
/// directory. Files already present in the destination are skipped.
///
/// Every option can also be set in a configuration file or through an
/// `EXIFSIFT_*` environment variable; the command line wins.
#[derive(Debug, Parser)]
#[command(name = "exifsift", version, about, long_about)]
pub struct Args {
    /// Directory to scan (recursively)
    #[arg(short, long, visible_alias = "src-dir", alias = "srcDir", value_name = "DIR")]
    pub source: Option<PathBuf>,

    /// Directory to receive matching files; must already exist
    #[arg(short, long, visible_alias = "dst-dir", alias = "dstDir", value_name = "DIR")]
    pub destination: Option<PathBuf>,

    /// Metadata key to look up, e.g. Keywords
    #[arg(short, long, visible_alias = "exif-key", alias = "exifKey")]
    pub key: Option<String>,

    /// Values to match (comma-separated)
    #[arg(short = 'q', long = "query", visible_alias = "exif-query", alias = "exifQuery", value_name = "TARGETS")]
    pub query: Option<String>,

    /// Require the value to equal a target instead of containing one
    #[arg(long)]
    pub exact: bool,

    /// File extensions to consider (comma-separated) [default: .jpg,.jpeg]
    #[arg(long, value_name = "EXTS")]
    pub extensions: Option<String>,

    /// Maximum files processed at once [default: 100]
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Path to the exiftool executable [default: looked up in PATH]
    #[arg(long, value_name = "PATH")]
    pub exiftool: Option<PathBuf>,

    /// Seconds allowed per metadata lookup [default: 30]
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Log and skip unreadable directories instead of aborting
    #[arg(long)]
    pub skip_unreadable: bool,

    /// Report what would be copied without copying anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Configuration file (toml, yaml or json)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(long)]
    pub quiet: bool,
}

impl Args {
    /// Everything given on the command line, as the top configuration layer.
    pub fn overrides(&self) -> Overrides {
        Overrides {
            source: self.source.clone(),
            destination: self.destination.clone(),
            key: self.key.clone(),
            targets: self.query.as_deref().map(split),
            extensions: self.extensions.as_deref().map(split),
            policy: self.exact.then_some(MatchPolicy::Exact),
            concurrency: self.jobs,
            exiftool: self.exiftool.clone(),
            timeout: self.timeout,
            skip_unreadable: self.skip_unreadable.then_some(true),
            dry_run: self.dry_run.then_some(true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use rstest::rstest;

    #[test]
    fn test_command() {
        Args::command().debug_assert();
    }

    #[rstest]
    #[case(&["exifsift", "-s", "/in", "-d", "/out", "-k", "Keywords", "-q", "beach,sunset"])]
    #[case(&["exifsift", "--src-dir", "/in", "--dst-dir", "/out", "--exif-key", "Keywords", "--exif-query", "beach,sunset"])]
    #[case(&["exifsift", "--srcDir", "/in", "--dstDir", "/out", "--exifKey", "Keywords", "--exifQuery", "beach, sunset"])]
    fn test_aliases(#[case] argv: &[&str]) {
        let overrides = Args::try_parse_from(argv).unwrap().overrides();
        assert_eq!(overrides.source, Some(PathBuf::from("/in")));
        assert_eq!(overrides.destination, Some(PathBuf::from("/out")));
        assert_eq!(overrides.key.as_deref(), Some("Keywords"));
        assert_eq!(overrides.targets, Some(vec!["beach".to_string(), "sunset".to_string()]));
        assert_eq!(overrides.policy, None);
        assert_eq!(overrides.dry_run, None);
    }

    #[test]
    fn test_flags_only_override_when_given() {
        let args = Args::try_parse_from(["exifsift", "--exact", "-n", "--skip-unreadable", "-j", "4", "-vv"]).unwrap();
        assert_eq!(args.verbose, 2);
        let overrides = args.overrides();
        assert_eq!(overrides.policy, Some(MatchPolicy::Exact));
        assert_eq!(overrides.dry_run, Some(true));
        assert_eq!(overrides.skip_unreadable, Some(true));
        assert_eq!(overrides.concurrency, Some(4));
        assert_eq!(overrides.source, None);
        assert_eq!(overrides.targets, None);
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Args::try_parse_from(["exifsift", "-v", "--quiet"]).is_err());
    }
}
