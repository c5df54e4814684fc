//! Tracing setup for hosts embedding the client.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Filter used when neither `RUST_LOG` nor an explicit filter is given.
pub const DEFAULT_FILTER: &str = "rental_core=info";

/// Install a stderr fmt subscriber.
///
/// An explicit `filter` wins; otherwise `RUST_LOG`, then `DEFAULT_FILTER`.
/// Returns `false` when a global subscriber was already installed, in which
/// case the existing one is left in place.
pub fn init(filter: Option<&str>) -> bool {
    let env_filter = match filter {
        Some(f) => EnvFilter::new(f),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_filter(env_filter);

    let installed = tracing_subscriber::registry().with(fmt_layer).try_init().is_ok();
    if !installed {
        tracing::debug!("tracing subscriber already initialized");
    }
    installed
}
