//! Tracing subscriber setup for host applications.

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_DIRECTIVE: &str = "thumbforge_client=info";

/// Install the global subscriber: `RUST_LOG` (or `default_directive`)
/// filtering plus a human-readable or JSON formatter.
///
/// Fails if a global subscriber is already set.
pub fn init_tracing(default_directive: &str, json: bool) -> Result<(), TryInitError> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_directive.into());
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    }
}
