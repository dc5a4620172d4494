pub mod builders;
pub mod probe;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use depgraph::logging::{LOG_ENV, env_filter};
use tracing_subscriber::filter::LevelFilter;

/// Upper bound for a single graph run in tests.
pub const RUN_DEADLINE: Duration = Duration::from_secs(5);

static INIT: Once = Once::new();

/// Route engine logs into the test harness.
///
/// Uses the binary's filter resolution, so `DEPGRAPH_LOG` directives work
/// in tests too (e.g. `DEPGRAPH_LOG=depgraph::exec::lazy=debug`). Output is
/// only shown for failing tests unless run with `--nocapture`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let installed = tracing_subscriber::fmt()
            .with_env_filter(env_filter(None, LevelFilter::WARN))
            .with_test_writer()
            .with_target(true)
            .try_init();
        if let Err(e) = installed {
            eprintln!("{LOG_ENV} ignored, subscriber already set: {e}");
        }
    });
}

/// Await a graph run, failing the test if it exceeds [`RUN_DEADLINE`].
pub async fn with_timeout<F, T>(run: F) -> T
where
    F: Future<Output = T>,
{
    tokio::time::timeout(RUN_DEADLINE, run)
        .await
        .unwrap_or_else(|_| panic!("graph run exceeded {RUN_DEADLINE:?}"))
}
