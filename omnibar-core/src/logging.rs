//! Logging bootstrap for embedders and tests.

use tracing_subscriber::EnvFilter;

/// Install a stderr subscriber honoring `RUST_LOG`, defaulting to
/// `omnibar=info`. Safe to call more than once; later calls are no-ops.
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("omnibar=info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init();
        init();
    }
}
