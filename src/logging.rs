//! Logging initialization.
//!
//! The crate emits `tracing` events at operation boundaries: edits at debug,
//! cascade lookups at trace, skipped imports and unsupported CSS at warn.
//! Applications that embed the model install their own subscriber; [`init`]
//! is a convenience for binaries and tests.

use std::sync::Once;

use tracing_subscriber::{util::SubscriberInitExt, EnvFilter};

/// Logging profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Human-readable output at debug level.
    Development,
    /// JSON structured output at info level.
    Production,
    /// Registry with no output layer.
    Test,
}

static INIT_ONCE: Once = Once::new();

/// Install a global subscriber for `profile`. Only the first call has any
/// effect. `RUST_LOG` overrides the default filter.
///
/// ```
/// folio::logging::init(folio::logging::Profile::Test);
/// ```
pub fn init(profile: Profile) {
    INIT_ONCE.call_once(|| {
        // try_init: an embedding application may already own the global subscriber.
        let _ = match profile {
            Profile::Development => tracing_subscriber::fmt()
                .with_env_filter(default_filter("folio=debug"))
                .finish()
                .try_init(),
            Profile::Production => tracing_subscriber::fmt()
                .json()
                .with_env_filter(default_filter("folio=info"))
                .finish()
                .try_init(),
            Profile::Test => tracing_subscriber::registry().try_init(),
        };
    });
}

fn default_filter(fallback: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
}
