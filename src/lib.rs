pub mod app;
pub mod catalog;
pub mod config;
pub mod error;
pub mod gateway;
pub mod profile;
pub mod views;

#[cfg(test)]
mod testing;

pub use app::FitFoodie;
pub use config::AppConfig;
pub use error::{GatewayError, StorageError, ValidationErrors};

/// Install the global `tracing` subscriber. `RUST_LOG` overrides the default
/// `info` filter. Calling it more than once is harmless.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();
}
