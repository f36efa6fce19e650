use fxhash::FxHashMap;
use fxhash::FxHashSet;
use serde::Serialize;

use crate::band::Band;
use crate::error::AnalysisError;
use crate::planner::{BIN_WIDTHS_S, TARGET_BIN_COUNT, plan_interval};
use crate::records::{BeaconSample, GenericSample, MacAddr};

/// Running per-device state within one bin. Rebuilt fresh for every bin;
/// never shared across bins.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceAggregate {
    pub address: MacAddr,
    pub frame_count: u64,
    pub rssi_sum: f64,
    pub normalized_rssi_sum: f64,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DensityBin {
    pub devices: Vec<DeviceAggregate>,
    pub device_count: u64,
    /// Frames of any kind (from the generic stream) inside this bin.
    pub frame_count: u64,
    pub beacon_frame_count: u64,
    pub avg_beacon_rssi: f64,
    pub rating: f64,
    pub ap_score: f64,
    pub busy_score: f64,
    pub traffic_score: f64,
    pub start_time: f64,
    pub end_time: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DensityAnalysis {
    /// Bin width in seconds chosen by the planner.
    pub interval: f64,
    pub bins: Vec<DensityBin>,
    /// Distinct source addresses across the whole trace.
    pub total_devices: u64,
    pub total_frames: u64,
    pub total_beacon_frames: u64,
    pub avg_beacon_rssi: f64,
    pub rating: f64,
    pub ap_score: f64,
    pub busy_score: f64,
    pub traffic_score: f64,
}

const RATING_WEIGHT_AP: f64 = 0.5;
const RATING_WEIGHT_BUSY: f64 = 0.35;
const RATING_WEIGHT_TRAFFIC: f64 = 0.15;

/// Clamped normalization shared by every saturating sub-score: exactly 0 for
/// non-positive totals, `total / max` capped at 1 otherwise.
pub fn saturating_score(total: f64, max: f64) -> f64 {
    if total <= 0.0 {
        return 0.0;
    }
    (total / max).min(1.0)
}

/// Scores RF congestion per time bin and for the whole trace.
///
/// Both input streams must be sorted ascending by timestamp. Bins partition
/// `[0, lifespan]` contiguously; the final bin absorbs the remainder and the
/// samples sitting exactly on the lifespan. Fails with `EmptyInput` when no
/// beacon was observed, since device scoring has nothing to work with.
pub fn analyze_density(
    beacons: &[BeaconSample],
    frames: &[GenericSample],
    band: Band,
) -> Result<DensityAnalysis, AnalysisError> {
    if beacons.is_empty() {
        return Err(AnalysisError::EmptyInput);
    }

    let cal = band.calibration();
    let lifespan = trace_lifespan(beacons, frames);
    let interval = plan_interval(lifespan, &BIN_WIDTHS_S, TARGET_BIN_COUNT);
    let bin_count = ((lifespan / interval).ceil() as usize).max(1);

    let mut bins: Vec<DensityBin> = Vec::with_capacity(bin_count);
    let mut all_devices: FxHashSet<MacAddr> = FxHashSet::default();
    let mut beacon_cursor = 0usize;
    let mut frame_cursor = 0usize;

    for i in 0..bin_count {
        let start_time = i as f64 * interval;
        let last = i == bin_count - 1;
        let end_time = if last { lifespan } else { start_time + interval };
        let duration = end_time - start_time;

        let bin_beacons = take_until(beacons, &mut beacon_cursor, end_time, last, |s| s.timestamp_s);
        let bin_frames = take_until(frames, &mut frame_cursor, end_time, last, |s| s.timestamp_s);

        // Channel occupancy and raw bitrate over every frame in the bin
        let total_bits: f64 = bin_frames.iter().map(|f| f.size_bits).sum();
        let total_airtime_us: f64 = bin_frames.iter().map(|f| f.airtime_us).sum();
        let (traffic_score, busy_score) = if duration > 0.0 {
            let sustained_mbps = total_bits / duration / 1e6;
            let traffic = (sustained_mbps / cal.sustained_rate_max_mbps).sqrt().min(1.0);
            let percent_airtime = total_airtime_us / 1e6 / duration * 100.0;
            let busy = saturating_score(percent_airtime, cal.busy_percent_max);
            (traffic, busy)
        } else {
            (0.0, 0.0)
        };

        // Per-device beacon statistics, keyed by source address
        let mut devices: FxHashMap<MacAddr, DeviceAggregate> = FxHashMap::default();
        let mut rssi_sum_all = 0.0;
        for sample in bin_beacons {
            all_devices.insert(sample.source);
            rssi_sum_all += sample.rssi_dbm;
            let entry = devices.entry(sample.source).or_insert_with(|| DeviceAggregate {
                address: sample.source,
                frame_count: 0,
                rssi_sum: 0.0,
                normalized_rssi_sum: 0.0,
                score: 0.0,
            });
            entry.frame_count += 1;
            entry.rssi_sum += sample.rssi_dbm;
            entry.normalized_rssi_sum += (sample.rssi_dbm - cal.rssi_floor_dbm).max(0.0).sqrt();
        }

        // Only addresses beaconing often enough count toward the AP score;
        // one-off probe artifacts stay out of it. Counting stats above are
        // unaffected by the cutoff.
        let mut total_score = 0.0;
        for device in devices.values_mut() {
            device.score = device.normalized_rssi_sum / device.frame_count as f64;
            if duration > 0.0 {
                let frames_per_minute = device.frame_count as f64 / duration * 60.0;
                if frames_per_minute >= cal.beacon_rate_cutoff_fpm {
                    total_score += device.score;
                }
            }
        }
        let ap_score = saturating_score(total_score, cal.ap_score_max);
        let rating = RATING_WEIGHT_AP * ap_score
            + RATING_WEIGHT_BUSY * busy_score
            + RATING_WEIGHT_TRAFFIC * traffic_score;

        let beacon_frame_count = bin_beacons.len() as u64;
        let avg_beacon_rssi = if beacon_frame_count > 0 {
            rssi_sum_all / beacon_frame_count as f64
        } else {
            0.0
        };

        let mut devices: Vec<DeviceAggregate> = devices.into_values().collect();
        devices.sort_by_key(|d| d.address);

        bins.push(DensityBin {
            device_count: devices.len() as u64,
            devices,
            frame_count: bin_frames.len() as u64,
            beacon_frame_count,
            avg_beacon_rssi,
            rating,
            ap_score,
            busy_score,
            traffic_score,
            start_time,
            end_time,
        });
    }

    // Trace-level roll-up: every metric is the duration-weighted average of
    // its per-bin values, which weights a short final bin correctly.
    let weighted = |metric: fn(&DensityBin) -> f64| -> f64 {
        if lifespan <= 0.0 {
            return 0.0;
        }
        bins.iter()
            .map(|b| metric(b) * (b.end_time - b.start_time) / lifespan)
            .sum()
    };

    let avg_beacon_rssi = weighted(|b| b.avg_beacon_rssi);
    let rating = weighted(|b| b.rating);
    let ap_score = weighted(|b| b.ap_score);
    let busy_score = weighted(|b| b.busy_score);
    let traffic_score = weighted(|b| b.traffic_score);

    Ok(DensityAnalysis {
        interval,
        total_devices: all_devices.len() as u64,
        total_frames: frames.len() as u64,
        total_beacon_frames: beacons.len() as u64,
        avg_beacon_rssi,
        rating,
        ap_score,
        busy_score,
        traffic_score,
        bins,
    })
}

fn trace_lifespan(beacons: &[BeaconSample], frames: &[GenericSample]) -> f64 {
    let last_beacon = beacons.last().map_or(0.0, |s| s.timestamp_s);
    let last_frame = frames.last().map_or(0.0, |s| s.timestamp_s);
    last_beacon.max(last_frame).max(0.0)
}

/// Advances the cursor past every sample before `end` and returns that slice.
/// The final bin takes everything left, so a sample exactly on the lifespan
/// still lands in a bin.
fn take_until<'a, T>(
    samples: &'a [T],
    cursor: &mut usize,
    end: f64,
    last_bin: bool,
    timestamp: impl Fn(&T) -> f64,
) -> &'a [T] {
    let start = *cursor;
    if last_bin {
        *cursor = samples.len();
    } else {
        while *cursor < samples.len() && timestamp(&samples[*cursor]) < end {
            *cursor += 1;
        }
    }
    &samples[start..*cursor]
}
