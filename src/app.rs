use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{info, instrument};

use crate::config::Config;
use crate::engine::{AllocationEngine, EngineError};
use crate::report::{write_allocation_report, write_xlsx_report, ReportError};
use crate::store::{StoreError, TableStore};

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Source read failed: {0}")]
    Store(#[from] StoreError),

    #[error("Computation failed: {0}")]
    Engine(#[from] EngineError),

    #[error("Report write failed: {0}")]
    Report(#[from] ReportError),
}

/// Outcome of one batch run, for the CLI summary.
#[derive(Debug)]
pub struct BatchSummary {
    pub tables_loaded: usize,
    pub invalid_rows: usize,
    pub allocated_rows: usize,
    pub reports_written: Vec<PathBuf>,
    pub load_duration: Duration,
    pub compute_duration: Duration,
    pub write_duration: Duration,
}

/// Run the batch: load the workbook, compute both derived tables, then write
/// every report. Both tables are computed before the first write, so a
/// computation failure aborts the run before any report file exists on disk.
#[instrument(skip(config))]
pub fn run(workbook_path: &Path, config: &Config) -> Result<BatchSummary, BatchError> {
    let load_start = Instant::now();
    let store = TableStore::load(workbook_path)?;
    let tables_loaded = store.len();
    let load_duration = load_start.elapsed();

    let engine =
        AllocationEngine::with_settings(store, config.tolerance_percent, config.anomaly_policy);

    let compute_start = Instant::now();
    let invalid_rows = engine.find_invalid_splits()?;
    let allocated = engine.compute_allocation()?;
    let compute_duration = compute_start.elapsed();

    info!(
        "Validation flagged {} rows, allocation produced {} rows",
        invalid_rows.len(),
        allocated.len()
    );

    let write_start = Instant::now();
    let mut reports_written = Vec::new();

    write_xlsx_report(&invalid_rows, &config.invalid_report_path)?;
    reports_written.push(config.invalid_report_path.clone());

    for path in &config.allocation_report_paths {
        write_allocation_report(&allocated, path)?;
        reports_written.push(path.clone());
    }
    let write_duration = write_start.elapsed();

    Ok(BatchSummary {
        tables_loaded,
        invalid_rows: invalid_rows.len(),
        allocated_rows: allocated.len(),
        reports_written,
        load_duration,
        compute_duration,
        write_duration,
    })
}
