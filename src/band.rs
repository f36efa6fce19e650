use serde::{Deserialize, Serialize};

/// Frequency band the trace was captured on. Every density scoring constant
/// is resolved through an exhaustive match on this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Band {
    #[serde(rename = "2.4GHz")]
    Ghz2_4,
    #[serde(rename = "5GHz")]
    Ghz5,
}

/// Per-band calibration for the density composite. These are tuning inputs,
/// not protocol constants.
#[derive(Debug, Clone, Copy)]
pub struct DensityCalibration {
    /// Sustained bitrate (Mbps) at which the traffic score saturates.
    pub sustained_rate_max_mbps: f64,
    /// Channel busy percentage at which the busy score saturates.
    pub busy_percent_max: f64,
    /// Minimum beacon frames per minute for an address to count as a real AP.
    pub beacon_rate_cutoff_fpm: f64,
    /// RSSI floor (dBm) the per-device normalization is measured from.
    pub rssi_floor_dbm: f64,
    /// Summed device score at which the weighted AP score saturates.
    pub ap_score_max: f64,
}

const CALIBRATION_2_4GHZ: DensityCalibration = DensityCalibration {
    sustained_rate_max_mbps: 90.0,
    busy_percent_max: 60.0,
    beacon_rate_cutoff_fpm: 60.0,
    rssi_floor_dbm: -90.0,
    ap_score_max: 40.0,
};

const CALIBRATION_5GHZ: DensityCalibration = DensityCalibration {
    sustained_rate_max_mbps: 400.0,
    busy_percent_max: 75.0,
    beacon_rate_cutoff_fpm: 30.0,
    rssi_floor_dbm: -85.0,
    ap_score_max: 60.0,
};

impl Band {
    pub fn calibration(self) -> &'static DensityCalibration {
        match self {
            Band::Ghz2_4 => &CALIBRATION_2_4GHZ,
            Band::Ghz5 => &CALIBRATION_5GHZ,
        }
    }
}
