//! Subscriber installation for riskmc logs.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable holding an `EnvFilter` directive string, e.g.
/// `riskmc_engine::simulation=debug,riskmc_engine::scenario=warn`.
pub const LOG_ENV: &str = "RISKMC_LOG";

/// Directive used when `RISKMC_LOG` is unset or unparsable. Matches every
/// `riskmc_*` crate target.
pub const DEFAULT_FILTER: &str = "riskmc=info";

static INIT: Once = Once::new();

/// Filter built from `RISKMC_LOG`, or `DEFAULT_FILTER` when that fails.
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the fmt subscriber once per process. A subscriber already set by
/// the host application is left in place.
pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_thread_ids(true))
            .with(env_filter())
            .try_init();
    });
}
