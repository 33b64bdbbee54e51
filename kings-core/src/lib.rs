// kings-core/src/lib.rs
// Token Kings - Core Library Definitions

pub mod api;
pub mod config;
pub mod display;
pub mod service;
pub mod state;

// Re-export kings-common for convenience
pub use kings_common::{analytics, data, ranking};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Console logging for the binaries; `RUST_LOG` overrides the `info` default
pub fn init_tracing() {
    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_level(true)
        .compact();

    let _ = tracing_subscriber::registry()
        .with(console_layer)
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();
}
