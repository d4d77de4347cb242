//! Tracing setup.

use tracing_subscriber::EnvFilter;

/// AWS SDK internals log every request at debug level.
const NOISY_CRATES: &str = ",aws_smithy_runtime=warn,aws_config=warn,hyper=warn";

/// Install a fmt subscriber filtered by `RUST_LOG`, defaulting to `info`.
///
/// Returns `false` when a global subscriber is already installed.
pub fn init() -> bool {
    init_with_default("info")
}

/// Like [`init`] with a different fallback directive when `RUST_LOG` is unset.
pub fn init_with_default(default_directive: &str) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{default_directive}{NOISY_CRATES}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}
