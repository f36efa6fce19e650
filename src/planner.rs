/// Candidate bin widths in seconds, smallest first. The 0.5 s rung keeps very
/// short traces from collapsing into a handful of bins.
pub const BIN_WIDTHS_S: [f64; 8] = [0.5, 1.0, 2.0, 5.0, 10.0, 15.0, 20.0, 30.0];

/// Bin count the planner aims for, regardless of trace length.
pub const TARGET_BIN_COUNT: f64 = 10.0;

/// Picks the width whose resulting bin count (`lifespan / width`) lands
/// closest to the target. Ties resolve to the earliest candidate, so the
/// smallest width wins when two are equally close.
pub fn plan_interval(lifespan_s: f64, widths: &[f64], target_bins: f64) -> f64 {
    let mut best = widths[0];
    let mut best_distance = f64::INFINITY;
    for &width in widths {
        let distance = (lifespan_s / width - target_bins).abs();
        if distance < best_distance {
            best = width;
            best_distance = distance;
        }
    }
    best
}
