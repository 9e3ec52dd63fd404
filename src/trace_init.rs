#[cfg(feature = "trace")]
use std::sync::Once;

#[cfg(feature = "trace")]
static INIT: Once = Once::new();

/// Install a stderr tracing subscriber, mapping the engine verbosity level
/// to a default filter. `RUST_LOG` takes precedence when set.
#[cfg(feature = "trace")]
pub fn init_tracing(verbosity: u8) {
    INIT.call_once(|| {
        let default_filter = match verbosity {
            0 => "mt_engine=warn",
            1 => "mt_engine=info",
            2 => "mt_engine=debug",
            _ => "mt_engine=trace",
        };
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
            )
            .init();
    });
}

#[cfg(not(feature = "trace"))]
pub fn init_tracing(_verbosity: u8) {}
