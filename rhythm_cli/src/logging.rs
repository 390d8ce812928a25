use anyhow::Result;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize tracing on stderr. `RUST_LOG` wins over the `verbose` flag when set.
pub fn init_logging(verbose: bool) -> Result<()> {
    let default = if verbose {
        "rhythm_core=debug,rhythm_cli=debug,beatmap_loader=debug,warn"
    } else {
        "rhythm_core=info,rhythm_cli=info,beatmap_loader=info,warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .try_init()?;

    Ok(())
}
