//! Statistics printing.

use log::{info, warn};
use strum::IntoEnumIterator;

use crate::error_handling::{ErrorType, InfoType, ProcessingStats};
use crate::pipeline::{RunOutcome, RunReport};

/// Prints a one-line summary of a finished run, plus the first failure if
/// any batch failed.
///
/// Works with both plain and JSON log formats (log::info! handles formatting).
pub fn print_run_summary(report: &RunReport) {
    match report.outcome() {
        RunOutcome::Clean => info!("{}", report.summary_line()),
        RunOutcome::CompletedWithErrors { .. } => {
            warn!("{}", report.summary_line());
            if let Some(first) = &report.first_failure {
                warn!("First failure: {}", first);
            }
        }
    }
}

/// Prints error and info statistics to the log.
///
/// This function is used internally and in tests.
pub fn print_error_statistics(error_stats: &ProcessingStats) {
    let total_errors = error_stats.total_errors();
    let total_info = error_stats.total_info();

    if total_errors > 0 {
        info!("Error Counts ({} total):", total_errors);
        for error_type in ErrorType::iter() {
            let count = error_stats.get_error_count(error_type);
            if count > 0 {
                info!("   {}: {}", error_type.as_str(), count);
            }
        }
    }

    if total_info > 0 {
        info!("Info Counts ({} total):", total_info);
        for info_type in InfoType::iter() {
            let count = error_stats.get_info_count(info_type);
            if count > 0 {
                info!("   {}: {}", info_type.as_str(), count);
            }
        }
    }
}
