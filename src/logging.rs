use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Install the global subscriber. `RUST_LOG` wins over the command-line
/// verbosity when set.
pub fn init(verbose: u8, quiet: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level(verbose, quiet)));
    tracing_subscriber::registry().with(filter).with(fmt::layer().with_target(false)).init();
}

fn level(verbose: u8, quiet: bool) -> &'static str {
    match (quiet, verbose) {
        (true, _) => "warn",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, false, "info")]
    #[case(1, false, "debug")]
    #[case(3, false, "trace")]
    #[case(0, true, "warn")]
    fn test_level(#[case] verbose: u8, #[case] quiet: bool, #[case] expected: &str) {
        assert_eq!(level(verbose, quiet), expected);
    }
}
