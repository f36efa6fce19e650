use serde::{Deserialize, Serialize};

/// 802.11 PHY generation, numbered after the wtap `PHDR_802_11_PHY_*` codes
/// radiotap dissectors report. Out-of-range codes collapse to `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum Phy {
    Unknown,
    Fhss,
    Ir,
    Dsss,
    Dot11b,
    Dot11a,
    Dot11g,
    Dot11n,
    Dot11ac,
    Dot11ad,
    Dot11ah,
    Dot11ax,
    Dot11be,
}

/// What a PHY can tell us about rate efficiency.
pub enum PhyCapability {
    /// Pre-MCS PHY with a discrete ladder of supported bitrates (Mbps).
    Ladder(&'static [f64]),
    /// Rate-adaptive PHY with a maximum MCS index.
    MaxMcs(u8),
    /// Deprecated or rarely used PHY; never contributes to rate ratios.
    Inapplicable,
}

const RATES_11B: [f64; 4] = [1.0, 2.0, 5.5, 11.0];
const RATES_11AG: [f64; 8] = [6.0, 9.0, 12.0, 18.0, 24.0, 36.0, 48.0, 54.0];

impl Phy {
    pub fn from_code(code: u8) -> Phy {
        match code {
            1 => Phy::Fhss,
            2 => Phy::Ir,
            3 => Phy::Dsss,
            4 => Phy::Dot11b,
            5 => Phy::Dot11a,
            6 => Phy::Dot11g,
            7 => Phy::Dot11n,
            8 => Phy::Dot11ac,
            9 => Phy::Dot11ad,
            10 => Phy::Dot11ah,
            11 => Phy::Dot11ax,
            12 => Phy::Dot11be,
            _ => Phy::Unknown,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Phy::Unknown => 0,
            Phy::Fhss => 1,
            Phy::Ir => 2,
            Phy::Dsss => 3,
            Phy::Dot11b => 4,
            Phy::Dot11a => 5,
            Phy::Dot11g => 6,
            Phy::Dot11n => 7,
            Phy::Dot11ac => 8,
            Phy::Dot11ad => 9,
            Phy::Dot11ah => 10,
            Phy::Dot11ax => 11,
            Phy::Dot11be => 12,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Phy::Unknown => "UNKNOWN",
            Phy::Fhss => "FHSS",
            Phy::Ir => "IR",
            Phy::Dsss => "DSSS",
            Phy::Dot11b => "802.11b",
            Phy::Dot11a => "802.11a",
            Phy::Dot11g => "802.11g",
            Phy::Dot11n => "802.11n",
            Phy::Dot11ac => "802.11ac",
            Phy::Dot11ad => "802.11ad",
            Phy::Dot11ah => "802.11ah",
            Phy::Dot11ax => "802.11ax",
            Phy::Dot11be => "802.11be",
        }
    }

    pub fn capability(self) -> PhyCapability {
        match self {
            Phy::Dot11b => PhyCapability::Ladder(&RATES_11B),
            Phy::Dot11a | Phy::Dot11g => PhyCapability::Ladder(&RATES_11AG),
            Phy::Dot11n => PhyCapability::MaxMcs(7),
            Phy::Dot11ac => PhyCapability::MaxMcs(9),
            Phy::Dot11ax => PhyCapability::MaxMcs(11),
            Phy::Dot11be => PhyCapability::MaxMcs(13),
            // 11ad/11ah see so little use that a calibrated ladder is not
            // worth carrying; they are scored like the pre-802.11b PHYs.
            Phy::Unknown | Phy::Fhss | Phy::Ir | Phy::Dsss | Phy::Dot11ad | Phy::Dot11ah => {
                PhyCapability::Inapplicable
            }
        }
    }
}

impl From<u8> for Phy {
    fn from(code: u8) -> Self {
        Phy::from_code(code)
    }
}

impl From<Phy> for u8 {
    fn from(phy: Phy) -> Self {
        phy.code()
    }
}

/// Ratio of the observed rate to the PHY's maximum achievable rate, in [0,1].
///
/// Legacy PHYs have no MCS concept, so the 1-based rank of the nearest ladder
/// rung stands in for MCS-normalized efficiency. Rate-adaptive PHYs clamp the
/// observed MCS to the table maximum. Inapplicable PHYs, and rate-adaptive
/// frames that carried no MCS field, yield 0.0.
pub fn rate_ratio(phy: Phy, data_rate_mbps: f64, mcs: Option<u8>) -> f64 {
    match phy.capability() {
        PhyCapability::Inapplicable => 0.0,
        PhyCapability::Ladder(rates) => {
            let rank = closest_index(rates, data_rate_mbps) + 1;
            rank as f64 / rates.len() as f64
        }
        PhyCapability::MaxMcs(max_mcs) => match mcs {
            Some(observed) => observed.min(max_mcs) as f64 / max_mcs as f64,
            None => 0.0,
        },
    }
}

/// Index of the value closest to the target.
fn closest_index(arr: &[f64], target: f64) -> usize {
    let mut best = 0;
    for (i, v) in arr.iter().enumerate() {
        if (v - target).abs() < (arr[best] - target).abs() {
            best = i;
        }
    }
    best
}
