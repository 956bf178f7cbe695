//! Progress logging utilities.

use log::info;

/// Logs throughput information after a batch of lookups.
pub fn log_progress(start_time: std::time::Instant, attempted: usize) {
    let elapsed_secs = start_time.elapsed().as_secs_f64();
    let rate = if elapsed_secs > 0.0 {
        attempted as f64 / elapsed_secs
    } else {
        0.0
    };
    info!(
        "Attempted {} lookups in {:.2} seconds (~{:.2} lookups/sec)",
        attempted, elapsed_secs, rate
    );
}
