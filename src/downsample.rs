use fxhash::FxHashMap;

use crate::phy::Phy;
use crate::records::DownlinkSample;

/// How many aggregate points a trace is compressed to, at most.
pub const TARGET_POINT_COUNT: usize = 1000;

/// A retried frame is modeled as costing this many transmission attempts.
pub const TRIES_PER_RETRY: f64 = 2.0;

// Heuristic protocol-overhead figures in microseconds. Calibration inputs,
// not per-PHY derived values.
pub const SIFS_US: f64 = 16.0;
pub const ACK_US: f64 = 37.0 + SIFS_US;
pub const FRAME_OVERHEAD_US: f64 = ACK_US + SIFS_US;
pub const BLOCK_ACK_US: f64 = 32.0 + SIFS_US;

/// One downsampled aggregate of a contiguous run of downlink frames.
#[derive(Debug, Clone)]
pub struct WindowPoint {
    pub frames: u64,
    pub retries: u64,
    /// Mean RSSI over non-zero samples; 0.0 when the whole window had none.
    pub rssi: f64,
    pub data_rate: f64,
    /// Distinct PHYs in first-encountered order.
    pub phys: Vec<Phy>,
    /// Window airtime including apportioned protocol overhead.
    pub airtime_us: f64,
    pub rate_ratio: f64,
    /// Retry- and overhead-corrected goodput in Mbps.
    pub throughput: f64,
}

/// Compresses the downlink stream into at most ~1000 points of fixed frame
/// count (the last window may be shorter).
///
/// Two corrections distinguish this from a naive mean of PHY rates: the raw
/// payload-bits-per-microsecond figure is scaled by a retry correction factor
/// (each retry modeled as `TRIES_PER_RETRY` attempts), and per-frame protocol
/// overhead is apportioned across aggregated bursts instead of charged in
/// full to every member frame.
pub fn downsample(frames: &[DownlinkSample]) -> Vec<WindowPoint> {
    let mut points = Vec::new();
    if frames.is_empty() {
        return points;
    }

    // Total airtime per aggregate burst, for overhead apportionment
    let mut aggregate_airtime: FxHashMap<u64, f64> = FxHashMap::default();
    for frame in frames {
        if let Some(id) = frame.aggregate_id {
            *aggregate_airtime.entry(id).or_insert(0.0) += frame.airtime_us;
        }
    }

    let window_size = (frames.len() / TARGET_POINT_COUNT).max(1);
    for window in frames.chunks(window_size) {
        points.push(aggregate_window(window, &aggregate_airtime));
    }
    points
}

fn aggregate_window(window: &[DownlinkSample], aggregate_airtime: &FxHashMap<u64, f64>) -> WindowPoint {
    let len = window.len() as f64;
    let retries = window.iter().filter(|f| f.retried).count() as f64;

    let valid_rssis: Vec<f64> = window.iter().map(|f| f.rssi_dbm).filter(|&r| r != 0.0).collect();
    let rssi = if valid_rssis.is_empty() {
        0.0
    } else {
        valid_rssis.iter().sum::<f64>() / valid_rssis.len() as f64
    };

    let data_rate = window.iter().map(|f| f.data_rate_mbps).sum::<f64>() / len;
    let rate_ratio = window.iter().map(|f| f.rate_ratio).sum::<f64>() / len;

    let mut phys: Vec<Phy> = Vec::new();
    for frame in window {
        if !phys.contains(&frame.phy) {
            phys.push(frame.phy);
        }
    }

    // Tries per success: a retry consumed TRIES_PER_RETRY attempts on average
    let correction_factor = len / (retries * TRIES_PER_RETRY + len - retries);

    // Aggregated frames share the block-ack overhead proportionally to their
    // slice of the burst's airtime; standalone frames pay the full overhead
    let mut total_time_us = 0.0;
    for frame in window {
        let overhead = match frame.aggregate_id {
            Some(id) => {
                let group_airtime = aggregate_airtime.get(&id).copied().unwrap_or(0.0);
                if group_airtime > 0.0 {
                    SIFS_US + BLOCK_ACK_US * frame.airtime_us / group_airtime
                } else {
                    FRAME_OVERHEAD_US
                }
            }
            None => FRAME_OVERHEAD_US,
        };
        total_time_us += frame.airtime_us + overhead;
    }

    let throughput = if total_time_us > 0.0 {
        let payload_bits: f64 = window.iter().map(|f| f.payload_bits).sum();
        // bits per microsecond is numerically Mbps
        payload_bits / total_time_us * correction_factor
    } else {
        0.0
    };

    WindowPoint {
        frames: window.len() as u64,
        retries: retries as u64,
        rssi,
        data_rate,
        phys,
        airtime_us: total_time_us,
        rate_ratio,
        throughput,
    }
}
