use thiserror::Error;

/// Fatal analysis failures. Per-frame anomalies (missing MCS, absent
/// aggregate id, zero RSSI) are absorbed by the per-field fallback rules and
/// never reach this type.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnalysisError {
    /// No qualifying frames in the input stream; nothing to aggregate.
    #[error("no frames extracted")]
    EmptyInput,

    /// The upstream decoder dropped too many candidate frames for the result
    /// to be statistically reliable.
    #[error("frames did not have necessary fields ({failed} of {total} failed to decode)")]
    ExcessiveDecodeFailures { failed: u64, total: u64 },
}

impl AnalysisError {
    /// Stable machine-readable code for the driver's error envelope.
    pub fn code(&self) -> &'static str {
        match self {
            AnalysisError::EmptyInput => "no_frames",
            AnalysisError::ExcessiveDecodeFailures { .. } => "decode_quality",
        }
    }
}
