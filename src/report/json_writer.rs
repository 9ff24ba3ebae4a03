use std::fs;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::engine::AllocatedRecord;
use crate::report::render::{ReportError, REPORT_DT_FORMAT};

/// Wire form of the allocation report:
/// `{"allocation": {"data": [{"wellId": …, "dt": …, "oilRate": …, …}]}}`.
#[derive(Debug, Serialize)]
pub(crate) struct AllocationDocument {
    pub(crate) allocation: AllocationData,
}

#[derive(Debug, Serialize)]
pub(crate) struct AllocationData {
    pub(crate) data: Vec<AllocationEntry>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AllocationEntry {
    well_id: String,
    dt: String,
    oil_rate: f64,
    water_rate: f64,
    gas_rate: f64,
}

impl From<&AllocatedRecord> for AllocationEntry {
    fn from(record: &AllocatedRecord) -> Self {
        Self {
            well_id: record.well_id.clone(),
            dt: record.dt.format(REPORT_DT_FORMAT).to_string(),
            oil_rate: record.oil_split_rate,
            water_rate: record.water_split_rate,
            gas_rate: record.gas_split_rate,
        }
    }
}

/// Write the allocation report as a pretty-printed JSON document.
pub fn write_allocation_json(records: &[AllocatedRecord], path: &Path) -> Result<(), ReportError> {
    let document = AllocationDocument {
        allocation: AllocationData {
            data: records.iter().map(AllocationEntry::from).collect(),
        },
    };

    fs::write(path, serde_json::to_string_pretty(&document)?)?;
    info!(
        "Wrote {} allocation entries to {}",
        records.len(),
        path.display()
    );
    Ok(())
}
