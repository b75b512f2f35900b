//! Tracing/logging setup shared by every storefront binary.

pub mod tracing;

pub use tracing::LogFormat;

/// Initialize process-wide tracing, honoring `RUST_LOG` and
/// `STOREFRONT_LOG_FORMAT`.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    let format = std::env::var("STOREFRONT_LOG_FORMAT")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or_default();

    tracing::init(format);
}
