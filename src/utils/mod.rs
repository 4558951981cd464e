use std::sync::Once;

static TRACING_INIT: Once = Once::new();

pub const DEFAULT_LOG_DIRECTIVE: &str = "tripflow=info";

/// Initializes the global tracing subscriber. `RUST_LOG` is honoured; `directives`
/// (comma separated) are layered on top of it.
pub fn init_tracing(directives: &str) {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let mut filter = EnvFilter::from_default_env();
        let mut rejected = Vec::new();
        for raw in directives.split(',').map(str::trim).filter(|d| !d.is_empty()) {
            match raw.parse() {
                Ok(directive) => filter = filter.add_directive(directive),
                Err(_) => rejected.push(raw.to_string()),
            }
        }

        if fmt().with_env_filter(filter).try_init().is_ok() && !rejected.is_empty() {
            tracing::warn!(?rejected, "ignored invalid log directives");
        }
    });
}
