//! Run report.

/// How a run that reached the end of the document stream turned out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every batch was ingested successfully
    Clean,
    /// The run finished but some batches failed to ingest
    CompletedWithErrors { failed_batches: usize },
}

/// Results of a completed pipeline run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Documents read from the source
    pub records_exported: usize,
    /// Batches sealed and handed to workers
    pub batches_dispatched: usize,
    /// Batches whose ingest call succeeded
    pub batches_ingested: usize,
    /// Batches whose ingest call failed
    pub failed_batches: usize,
    /// First failure reported by a worker, if any
    pub first_failure: Option<String>,
    /// Elapsed time in seconds
    pub elapsed_seconds: f64,
}

impl RunReport {
    pub fn outcome(&self) -> RunOutcome {
        if self.failed_batches == 0 {
            RunOutcome::Clean
        } else {
            RunOutcome::CompletedWithErrors {
                failed_batches: self.failed_batches,
            }
        }
    }

    pub fn is_clean(&self) -> bool {
        self.outcome() == RunOutcome::Clean
    }

    /// One-line, user-facing summary.
    pub fn summary_line(&self) -> String {
        let totals = format!(
            "{} document{} in {} batch{} in {:.1}s",
            self.records_exported,
            if self.records_exported == 1 { "" } else { "s" },
            self.batches_dispatched,
            if self.batches_dispatched == 1 { "" } else { "es" },
            self.elapsed_seconds
        );
        match self.outcome() {
            RunOutcome::Clean => format!("✅ Reindex completed: {}", totals),
            RunOutcome::CompletedWithErrors { failed_batches } => format!(
                "⚠️ Reindex completed with errors: {} ({} failed to ingest)",
                totals, failed_batches
            ),
        }
    }
}
