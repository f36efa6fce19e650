use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::AnalysisError;
use crate::phy::Phy;

/// MAC address of a radio interface, serialized in colon-hex form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MacAddr(pub [u8; 6]);

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            b[0], b[1], b[2], b[3], b[4], b[5]
        )
    }
}

impl FromStr for MacAddr {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 6];
        let mut parts = s.split(':');
        for byte in bytes.iter_mut() {
            let part = parts.next().ok_or_else(|| format!("bad mac: {s}"))?;
            *byte = u8::from_str_radix(part, 16).map_err(|_| format!("bad mac: {s}"))?;
        }
        if parts.next().is_some() {
            return Err(format!("bad mac: {s}"));
        }
        Ok(MacAddr(bytes))
    }
}

impl Serialize for MacAddr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MacAddr {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

/// One observed beacon or probe frame. `timestamp_s` is relative to capture
/// start, as are all timestamps in this crate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BeaconSample {
    pub source: MacAddr,
    pub rssi_dbm: f64,
    pub timestamp_s: f64,
}

/// Any frame, reduced to what channel-occupancy accounting needs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GenericSample {
    pub timestamp_s: f64,
    pub airtime_us: f64,
    pub size_bits: f64,
}

/// One decoded data frame on the downlink flow under analysis.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DownlinkSample {
    pub rssi_dbm: f64,
    #[serde(default)]
    pub aggregate_id: Option<u64>,
    pub data_rate_mbps: f64,
    pub payload_bits: f64,
    pub retried: bool,
    pub phy: Phy,
    #[serde(default)]
    pub mcs: Option<u8>,
    pub airtime_us: f64,
    pub rate_ratio: f64,
    pub timestamp_s: f64,
}

/// What the upstream decoder reported about the extraction pass. More than
/// 30% dropped candidates makes the aggregate statistically unreliable, so
/// the whole run aborts instead of producing a skewed result.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DecodeStats {
    pub total: u64,
    pub failed: u64,
}

const MAX_DECODE_FAILURE_RATE: f64 = 0.3;

impl DecodeStats {
    pub fn ensure_reliable(&self) -> Result<(), AnalysisError> {
        if self.total != 0 && self.failed as f64 / self.total as f64 > MAX_DECODE_FAILURE_RATE {
            return Err(AnalysisError::ExcessiveDecodeFailures {
                failed: self.failed,
                total: self.total,
            });
        }
        Ok(())
    }
}

/// Sorts a sample stream ascending by timestamp. The aggregators assume this
/// ordering; the driver applies it once at the input boundary.
pub fn sort_by_timestamp<T>(samples: &mut [T], timestamp: impl Fn(&T) -> f64) {
    samples.sort_by(|a, b| timestamp(a).total_cmp(&timestamp(b)));
}
