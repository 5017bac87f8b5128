/// Initializes the tracing/logging infrastructure.
///
/// Structured logging through `tracing-subscriber`:
/// - **Environment-based filtering**: controlled via the `RUST_LOG` environment variable
/// - **Compact formatting**: one line per event, target hidden
///
/// # Environment Variables
///
/// - `RUST_LOG=info` - Show info, warn, and error messages
/// - `RUST_LOG=debug` - Also show render spans and pagination decisions
/// - `RUST_LOG=hal_framework=trace` - Every resolved route and link
///
/// Calling it more than once is harmless: later calls leave the first subscriber in place.
///
/// # Example
///
/// ```ignore
/// hal_framework::tracing::setup_tracing();
/// tracing::info!("Application started");
/// ```
pub fn setup_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .try_init();
}
