mod band;
mod density;
mod downsample;
pub mod driver;
mod error;
mod phy;
mod planner;
mod records;
mod throughput;

pub use crate::band::{Band, DensityCalibration};
pub use crate::density::{
    DensityAnalysis, DensityBin, DeviceAggregate, analyze_density, saturating_score,
};
pub use crate::downsample::{
    BLOCK_ACK_US, FRAME_OVERHEAD_US, SIFS_US, TARGET_POINT_COUNT, TRIES_PER_RETRY, WindowPoint,
    downsample,
};
pub use crate::error::AnalysisError;
pub use crate::phy::{Phy, PhyCapability, rate_ratio};
pub use crate::planner::{BIN_WIDTHS_S, TARGET_BIN_COUNT, plan_interval};
pub use crate::records::{
    BeaconSample, DecodeStats, DownlinkSample, GenericSample, MacAddr, sort_by_timestamp,
};
pub use crate::throughput::{
    SLIDING_WINDOW, ThroughputAnalysis, ThroughputPoint, analyze_throughput, fill_zero_rssis,
};
