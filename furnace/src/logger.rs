use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs the global subscriber. `verbose` wins over `quiet`; with neither,
/// `RUST_LOG` applies, falling back to `info`.
pub fn init(verbose: bool, quiet: bool) {
    tracing_subscriber::registry()
        .with(filter(verbose, quiet))
        .with(fmt::layer().with_target(false).compact())
        .init();
}

fn filter(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new("kiln=debug,furnace=debug")
    } else if quiet {
        EnvFilter::new("error")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("kiln=info,furnace=info"))
    }
}
