//! Progress logging utilities.

use log::info;

/// Logs progress information about the export.
///
/// # Arguments
///
/// * `start_time` - The start time of the export
/// * `records` - Documents written to batches so far
/// * `batches` - Batches dispatched so far
pub fn log_progress(start_time: std::time::Instant, records: usize, batches: usize) {
    let elapsed_secs = start_time.elapsed().as_secs_f64();
    let rate = if elapsed_secs > 0.0 {
        records as f64 / elapsed_secs
    } else {
        0.0
    };
    info!(
        "Exported {} documents in {} batches in {:.2} seconds (~{:.2} docs/sec)",
        records, batches, elapsed_secs, rate
    );
}
