use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::engine::records::{
    AllocatedRecord, FluidType, InvalidSplitRow, RateRecord, RecordError, SplitRecord,
};
use crate::store::{StoreError, TableStore};

/// Sheet names the engine expects in the store.
pub const SPLITS_TABLE: &str = "splits";
pub const RATES_TABLE: &str = "rates";
pub const INVALID_SPLITS_TABLE: &str = "invalid_splits";

/// Default absolute tolerance around 100.0 for the split-sum check.
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Table lookup failed: {0}")]
    Store(#[from] StoreError),

    #[error("Row decode failed: {0}")]
    Record(#[from] RecordError),
}

/// What `compute_allocation` does with groups whose own split sums fail the
/// tolerance check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AnomalyPolicy {
    /// Allocate all joined groups without consulting validation.
    #[default]
    Proceed,
    /// Allocate anomalous groups, logging a warning for each affected row.
    Warn,
    /// Drop anomalous groups from the allocation output.
    Skip,
}

impl FromStr for AnomalyPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "proceed" => Ok(AnomalyPolicy::Proceed),
            "warn" => Ok(AnomalyPolicy::Warn),
            "skip" => Ok(AnomalyPolicy::Skip),
            other => Err(format!(
                "Unknown anomaly policy '{other}' (expected proceed, warn or skip)"
            )),
        }
    }
}

impl fmt::Display for AnomalyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AnomalyPolicy::Proceed => "proceed",
            AnomalyPolicy::Warn => "warn",
            AnomalyPolicy::Skip => "skip",
        })
    }
}

/// Validation and allocation over a loaded [`TableStore`].
///
/// The engine owns the store plus the tolerance and anomaly policy; the two
/// operations recompute their derived tables from the source tables on every
/// call, so repeated calls yield identical output.
pub struct AllocationEngine {
    store: TableStore,
    tolerance: f64,
    anomaly_policy: AnomalyPolicy,
}

impl AllocationEngine {
    pub fn new(store: TableStore) -> Self {
        Self {
            store,
            tolerance: DEFAULT_TOLERANCE,
            anomaly_policy: AnomalyPolicy::default(),
        }
    }

    pub fn with_settings(store: TableStore, tolerance: f64, anomaly_policy: AnomalyPolicy) -> Self {
        Self {
            store,
            tolerance,
            anomaly_policy,
        }
    }

    /// Flag aggregated split sums that are off 100%.
    ///
    /// Rows of the `invalid_splits` table are grouped by (well_id, dt) and
    /// each fluid column is summed independently; a fluid is flagged when its
    /// sum lands outside the absolute tolerance around 100.0. Output is
    /// long-form and fluid-major: all oil rows first, then water, then gas,
    /// with groups in ascending (well_id, dt) order inside each block.
    #[instrument(skip(self))]
    pub fn find_invalid_splits(&self) -> Result<Vec<InvalidSplitRow>, EngineError> {
        let table = self.store.table(INVALID_SPLITS_TABLE)?;
        let records = SplitRecord::from_table(table)?;

        let sums = group_fluid_sums(&records);
        debug!(
            "Aggregated {} rows into {} (well_id, dt) groups",
            records.len(),
            sums.len()
        );

        let mut flagged = Vec::new();
        for fluid in FluidType::ALL {
            for ((well_id, dt), group) in &sums {
                let split_sum = group.sum(fluid);
                if !self.within_tolerance(split_sum) {
                    flagged.push(InvalidSplitRow {
                        well_id: well_id.clone(),
                        dt: *dt,
                        fluid_type: fluid,
                        split_sum,
                    });
                }
            }
        }

        info!(
            "Flagged {} fluid sums across {} groups",
            flagged.len(),
            sums.len()
        );
        Ok(flagged)
    }

    /// Distribute measured rates according to the split percentages.
    ///
    /// The `splits` and `rates` tables are inner-joined on (well_id, dt);
    /// unmatched rows on either side are dropped silently and the output
    /// preserves `splits` row order. Each allocated value is
    /// `rate * split / 100`. Under the default [`AnomalyPolicy::Proceed`] no
    /// validation runs here at all; `warn` and `skip` apply the same
    /// tolerance check the validation pass uses, to the `splits` table.
    #[instrument(skip(self))]
    pub fn compute_allocation(&self) -> Result<Vec<AllocatedRecord>, EngineError> {
        let splits = SplitRecord::from_table(self.store.table(SPLITS_TABLE)?)?;
        let rates = RateRecord::from_table(self.store.table(RATES_TABLE)?)?;

        // First occurrence wins when a (well_id, dt) key repeats in rates.
        let mut rates_by_key: HashMap<(&str, NaiveDateTime), &RateRecord> = HashMap::new();
        for rate in &rates {
            rates_by_key
                .entry((rate.well_id.as_str(), rate.dt))
                .or_insert(rate);
        }

        let anomalous_keys = if self.anomaly_policy == AnomalyPolicy::Proceed {
            HashSet::new()
        } else {
            self.anomalous_split_keys(&splits)
        };

        let mut allocated = Vec::new();
        let mut unmatched = 0usize;
        let mut skipped = 0usize;
        for split in &splits {
            let rate = match rates_by_key.get(&(split.well_id.as_str(), split.dt)) {
                Some(rate) => *rate,
                None => {
                    unmatched += 1;
                    continue;
                }
            };

            if anomalous_keys.contains(&(split.well_id.clone(), split.dt)) {
                match self.anomaly_policy {
                    AnomalyPolicy::Warn => warn!(
                        "Split sums for well '{}' at {} violate tolerance, allocating anyway",
                        split.well_id, split.dt
                    ),
                    AnomalyPolicy::Skip => {
                        debug!(
                            "Skipping anomalous group: well '{}' at {}",
                            split.well_id, split.dt
                        );
                        skipped += 1;
                        continue;
                    }
                    AnomalyPolicy::Proceed => {}
                }
            }

            let allocate = |fluid: FluidType| rate.rate(fluid) * split.split(fluid) / 100.0;
            allocated.push(AllocatedRecord {
                well_id: split.well_id.clone(),
                dt: split.dt,
                oil_split_rate: allocate(FluidType::Oil),
                water_split_rate: allocate(FluidType::Water),
                gas_split_rate: allocate(FluidType::Gas),
            });
        }

        info!(
            "Allocated {} rows ({} unmatched, {} skipped as anomalous)",
            allocated.len(),
            unmatched,
            skipped
        );
        Ok(allocated)
    }

    fn within_tolerance(&self, split_sum: f64) -> bool {
        (split_sum - 100.0).abs() <= self.tolerance
    }

    /// Keys in a split table whose per-fluid sums violate the tolerance for
    /// at least one fluid.
    fn anomalous_split_keys(&self, splits: &[SplitRecord]) -> HashSet<(String, NaiveDateTime)> {
        group_fluid_sums(splits)
            .into_iter()
            .filter(|(_, sums)| {
                FluidType::ALL
                    .iter()
                    .any(|fluid| !self.within_tolerance(sums.sum(*fluid)))
            })
            .map(|(key, _)| key)
            .collect()
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct FluidSums {
    oil: f64,
    water: f64,
    gas: f64,
}

impl FluidSums {
    fn add(&mut self, record: &SplitRecord) {
        self.oil += record.oil_split;
        self.water += record.water_split;
        self.gas += record.gas_split;
    }

    fn sum(&self, fluid: FluidType) -> f64 {
        match fluid {
            FluidType::Oil => self.oil,
            FluidType::Water => self.water,
            FluidType::Gas => self.gas,
        }
    }
}

/// Sum each fluid column within (well_id, dt) groups. BTreeMap keeps the
/// groups in ascending key order for the report.
fn group_fluid_sums(records: &[SplitRecord]) -> BTreeMap<(String, NaiveDateTime), FluidSums> {
    let mut sums: BTreeMap<(String, NaiveDateTime), FluidSums> = BTreeMap::new();
    for record in records {
        sums.entry((record.well_id.clone(), record.dt))
            .or_default()
            .add(record);
    }
    sums
}
