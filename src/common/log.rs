use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};
use tracing_tree::HierarchicalLayer;
use tracing_tree::time::Uptime;

/// Installs the global subscriber.
///
/// `RUST_LOG` takes precedence; otherwise everything at `level` and above is
/// shown. Output goes to stderr as an indented span tree.
pub fn init_logging(level: Level) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_ascii_lowercase()));

    let tree = HierarchicalLayer::default()
        .with_writer(std::io::stderr)
        .with_indent_lines(true)
        .with_indent_amount(2)
        .with_targets(true)
        .with_timer(Uptime::default());

    // Ignore the error if a subscriber was already installed, e.g. by tests.
    _ = Registry::default().with(filter).with(tree).try_init();
}

/// Level picked from the command line flags.
pub fn level_for(debug: bool, verbose: bool) -> Level {
    if debug {
        Level::DEBUG
    } else if verbose {
        Level::INFO
    } else {
        Level::ERROR
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_wins_over_verbose() {
        assert_eq!(Level::DEBUG, level_for(true, true));
        assert_eq!(Level::INFO, level_for(false, true));
        assert_eq!(Level::ERROR, level_for(false, false));
    }
}
