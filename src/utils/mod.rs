pub mod build_info;
pub mod paths;

use tracing_subscriber::{fmt, EnvFilter};

/// Filter used when neither `RUST_LOG` nor the config names one.
pub const DEFAULT_LOG_DIRECTIVE: &str = "trio_budget=info,trio_core=warn,trio_storage_json=warn";

/// Builds the filter: `RUST_LOG` wins, then `directive`, then the default.
pub fn log_filter(directive: Option<&str>) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    directive
        .and_then(|directive| EnvFilter::try_new(directive).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_DIRECTIVE))
}

/// Installs the global subscriber writing to stderr. A second install is a no-op.
pub fn init_tracing(directive: Option<&str>) {
    let _ = fmt()
        .with_env_filter(log_filter(directive))
        .with_writer(std::io::stderr)
        .try_init();
}
