// Derived-table computation: split validation and rate allocation

pub mod allocation_engine;
pub mod records;

pub use allocation_engine::{
    AllocationEngine, AnomalyPolicy, EngineError, DEFAULT_TOLERANCE, INVALID_SPLITS_TABLE,
    RATES_TABLE, SPLITS_TABLE,
};
pub use records::{
    AllocatedRecord, FluidType, InvalidSplitRow, RateRecord, RecordError, SplitRecord,
};
