use std::collections::VecDeque;

use serde::Serialize;

use crate::downsample::{WindowPoint, downsample};
use crate::error::AnalysisError;
use crate::phy::Phy;
use crate::records::DownlinkSample;

/// Data points held in the smoothing buffer before a point is emitted.
pub const SLIDING_WINDOW: usize = 50;

/// One smoothed sample of the downlink time series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ThroughputPoint {
    pub rssi: f64,
    pub data_rate: f64,
    pub retry_rate: f64,
    pub throughput_mbps: f64,
    pub rate_ratio: f64,
    pub avg_airtime_us: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ThroughputAnalysis {
    pub avg_rssi: f64,
    pub avg_retry: f64,
    pub avg_throughput: f64,
    pub total_frames: u64,
    pub total_airtime_us: f64,
    pub avg_rate_ratio: f64,
    /// Distinct PHY names in first-encountered order, UNKNOWN excluded.
    pub phys_seen: Vec<&'static str>,
    pub points: Vec<ThroughputPoint>,
}

/// Estimates effective downlink goodput between one AP and one client.
///
/// The frame stream must be sorted ascending by timestamp. It is first
/// compressed into at most ~1000 window points, then smoothed with a
/// 50-point sliding buffer; whole-trace averages come from the unwindowed
/// point sequence. Fails with `EmptyInput` when no downlink frame matched.
pub fn analyze_throughput(frames: &[DownlinkSample]) -> Result<ThroughputAnalysis, AnalysisError> {
    if frames.is_empty() {
        return Err(AnalysisError::EmptyInput);
    }

    let data_points = downsample(frames);
    let mut points = smooth(&data_points);
    fill_zero_rssis(&mut points);

    let valid_rssis: Vec<f64> = data_points.iter().map(|p| p.rssi).filter(|&r| r != 0.0).collect();
    let avg_rssi = if valid_rssis.is_empty() {
        0.0
    } else {
        valid_rssis.iter().sum::<f64>() / valid_rssis.len() as f64
    };

    let point_count = data_points.len() as f64;
    let avg_retry = data_points.iter().map(|p| p.retries as f64).sum::<f64>() / point_count;
    let avg_rate_ratio = data_points.iter().map(|p| p.rate_ratio).sum::<f64>() / point_count;
    let total_airtime_us: f64 = data_points.iter().map(|p| p.airtime_us).sum();
    let avg_throughput = airtime_weighted_throughput(data_points.iter());

    let mut phys_seen: Vec<&'static str> = Vec::new();
    for point in &data_points {
        for &phy in &point.phys {
            if phy != Phy::Unknown && !phys_seen.contains(&phy.name()) {
                phys_seen.push(phy.name());
            }
        }
    }

    Ok(ThroughputAnalysis {
        avg_rssi,
        avg_retry,
        avg_throughput,
        total_frames: data_points.iter().map(|p| p.frames).sum(),
        total_airtime_us,
        avg_rate_ratio,
        phys_seen,
        points,
    })
}

/// Airtime-weighted mean keeps short, low-traffic windows from diluting the
/// estimate the way a plain mean would.
fn airtime_weighted_throughput<'a>(points: impl Iterator<Item = &'a WindowPoint> + Clone) -> f64 {
    let total_airtime: f64 = points.clone().map(|p| p.airtime_us).sum();
    if total_airtime <= 0.0 {
        return 0.0;
    }
    points.map(|p| p.throughput * p.airtime_us).sum::<f64>() / total_airtime
}

fn smooth(data_points: &[WindowPoint]) -> Vec<ThroughputPoint> {
    let mut buf: VecDeque<&WindowPoint> = VecDeque::with_capacity(SLIDING_WINDOW);
    let mut points = Vec::new();

    for point in data_points {
        buf.push_back(point);
        if buf.len() > SLIDING_WINDOW {
            buf.pop_front();
        }
        if buf.len() < SLIDING_WINDOW {
            continue;
        }

        let len = buf.len() as f64;
        let valid_rssis: Vec<f64> = buf.iter().map(|p| p.rssi).filter(|&r| r != 0.0).collect();
        let rssi = if valid_rssis.is_empty() {
            0.0
        } else {
            valid_rssis.iter().sum::<f64>() / valid_rssis.len() as f64
        };

        points.push(ThroughputPoint {
            rssi,
            data_rate: buf.iter().map(|p| p.data_rate).sum::<f64>() / len,
            retry_rate: buf.iter().map(|p| p.retries as f64).sum::<f64>() / SLIDING_WINDOW as f64,
            throughput_mbps: airtime_weighted_throughput(buf.iter().copied()),
            rate_ratio: buf.iter().map(|p| p.rate_ratio).sum::<f64>() / len,
            avg_airtime_us: buf.iter().map(|p| p.airtime_us).sum::<f64>() / len,
        });
    }
    points
}

/// Repairs points whose RSSI is exactly zero (no valid sample that window) by
/// copying in the nearest non-zero neighbor, searching left and right in
/// lock-step. A series with no valid sample anywhere is left untouched, which
/// also makes a second pass a no-op.
pub fn fill_zero_rssis(points: &mut [ThroughputPoint]) {
    let n = points.len();
    for i in 0..n {
        if points[i].rssi != 0.0 {
            continue;
        }

        let mut left = i as isize - 1;
        let mut right = i + 1;
        let mut replacement = None;
        while left >= 0 || right < n {
            if left >= 0 && points[left as usize].rssi != 0.0 {
                replacement = Some(points[left as usize].rssi);
                break;
            }
            if right < n && points[right].rssi != 0.0 {
                replacement = Some(points[right].rssi);
                break;
            }
            left -= 1;
            right += 1;
        }

        if let Some(rssi) = replacement {
            points[i].rssi = rssi;
        }
    }
}
