use airlens::{
    AnalysisError, DownlinkSample, FRAME_OVERHEAD_US, Phy, SIFS_US, analyze_throughput,
};

fn frame(rssi_dbm: f64, retried: bool, timestamp_s: f64) -> DownlinkSample {
    DownlinkSample {
        rssi_dbm,
        aggregate_id: None,
        data_rate_mbps: 100.0,
        payload_bits: 8000.0,
        retried,
        phy: Phy::Dot11ac,
        mcs: Some(5),
        airtime_us: 100.0,
        rate_ratio: 5.0 / 9.0,
        timestamp_s,
    }
}

fn uniform_frames(count: usize) -> Vec<DownlinkSample> {
    (0..count).map(|i| frame(-55.0, false, i as f64 * 0.001)).collect()
}

#[test]
fn test_uniform_trace_single_point() {
    // 50 frames, zero retries, 1000-byte payloads, 100 us airtime, no
    // aggregation: correction factor 1, every window identical.
    let analysis = analyze_throughput(&uniform_frames(50)).unwrap();

    let expected = (50.0 * 8000.0) / (50.0 * (100.0 + FRAME_OVERHEAD_US));
    assert_eq!(analysis.points.len(), 1);
    assert!((analysis.points[0].throughput_mbps - expected).abs() < 1e-12);
    assert!((analysis.avg_throughput - expected).abs() < 1e-12);
    assert_eq!(analysis.total_frames, 50);
    assert!((analysis.total_airtime_us - 50.0 * (100.0 + FRAME_OVERHEAD_US)).abs() < 1e-9);
    assert_eq!(analysis.avg_retry, 0.0);
    assert_eq!(analysis.points[0].retry_rate, 0.0);
    assert!((analysis.avg_rssi - -55.0).abs() < 1e-12);
    assert_eq!(analysis.phys_seen, vec!["802.11ac"]);
}

#[test]
fn test_all_zero_rssi_trace_does_not_divide_by_zero() {
    let frames: Vec<DownlinkSample> = (0..60).map(|i| frame(0.0, false, i as f64 * 0.001)).collect();
    let analysis = analyze_throughput(&frames).unwrap();

    assert_eq!(analysis.avg_rssi, 0.0);
    // no valid neighbor anywhere, so gap filling leaves the zeros alone
    assert!(analysis.points.iter().all(|p| p.rssi == 0.0));
}

#[test]
fn test_gap_fill_repairs_leading_silence() {
    // Frames 0..49 have no RSSI sample; the first emitted point covers only
    // those and comes out zero, then gets repaired from its right neighbor.
    let mut frames = uniform_frames(100);
    for f in frames.iter_mut().take(50) {
        f.rssi_dbm = 0.0;
    }
    let analysis = analyze_throughput(&frames).unwrap();

    assert_eq!(analysis.points.len(), 51);
    assert!((analysis.points[0].rssi - -55.0).abs() < 1e-12);
    assert!(analysis.points.iter().all(|p| p.rssi != 0.0));
}

#[test]
fn test_retry_rate_over_window_capacity() {
    let mut frames = uniform_frames(50);
    for f in frames.iter_mut().take(10) {
        f.retried = true;
    }
    let analysis = analyze_throughput(&frames).unwrap();

    assert_eq!(analysis.points.len(), 1);
    assert!((analysis.points[0].retry_rate - 10.0 / 50.0).abs() < 1e-12);
    // retries cost airtime: corrected throughput drops below the clean figure
    let clean = (50.0 * 8000.0) / (50.0 * (100.0 + FRAME_OVERHEAD_US));
    assert!(analysis.avg_throughput < clean);
}

#[test]
fn test_aggregated_burst_beats_standalone_overhead() {
    let standalone = analyze_throughput(&uniform_frames(50)).unwrap();

    let mut aggregated = uniform_frames(50);
    for f in aggregated.iter_mut() {
        f.aggregate_id = Some(1);
    }
    let aggregated = analyze_throughput(&aggregated).unwrap();

    // 50 frames sharing one block-ack pay far less overhead than 50 full
    // ACK exchanges
    assert!(aggregated.avg_throughput > standalone.avg_throughput);
    let shared_time = 50.0 * (100.0 + SIFS_US) + airlens::BLOCK_ACK_US;
    assert!((aggregated.total_airtime_us - shared_time).abs() < 1e-9);
}

#[test]
fn test_short_trace_yields_no_smoothed_points() {
    // 49 data points never fill the 50-point buffer, but the whole-trace
    // averages still come out of the unwindowed sequence.
    let analysis = analyze_throughput(&uniform_frames(49)).unwrap();
    assert!(analysis.points.is_empty());
    assert_eq!(analysis.total_frames, 49);
    assert!(analysis.avg_throughput > 0.0);
}

#[test]
fn test_smoothed_throughput_within_window_hull() {
    // Alternate fast and slow windows; the airtime-weighted figure must sit
    // between the extremes.
    let mut frames = uniform_frames(200);
    for (i, f) in frames.iter_mut().enumerate() {
        if i % 2 == 0 {
            f.payload_bits = 1000.0;
        }
    }
    let analysis = analyze_throughput(&frames).unwrap();

    let slow = (1000.0) / (100.0 + FRAME_OVERHEAD_US);
    let fast = (8000.0) / (100.0 + FRAME_OVERHEAD_US);
    for point in &analysis.points {
        assert!(point.throughput_mbps >= slow - 1e-12);
        assert!(point.throughput_mbps <= fast + 1e-12);
    }
    assert!(analysis.avg_throughput > slow && analysis.avg_throughput < fast);
}

#[test]
fn test_phys_seen_excludes_unknown_and_dedupes() {
    let mut frames = uniform_frames(60);
    frames[0].phy = Phy::Unknown;
    frames[1].phy = Phy::Dot11n;
    frames[2].phy = Phy::Dot11n;
    let analysis = analyze_throughput(&frames).unwrap();
    assert_eq!(analysis.phys_seen, vec!["802.11n", "802.11ac"]);
}

#[test]
fn test_empty_stream_is_fatal() {
    let err = analyze_throughput(&[]).unwrap_err();
    assert_eq!(err, AnalysisError::EmptyInput);
    assert_eq!(err.code(), "no_frames");
}
