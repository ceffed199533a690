use std::time::Instant;

use tracing::debug;

/// Runs a synchronous repository call from a UI handler and logs how long
/// it held the event loop.
pub fn run_blocking<F, T>(label: &str, f: F) -> T
where
    F: FnOnce() -> T,
{
    let started = Instant::now();
    let result = f();
    debug!(
        label,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "blocking call finished"
    );
    result
}
