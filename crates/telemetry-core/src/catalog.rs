//! Satellite catalog and feed addressing
//!
//! Two satellites are tracked. When none is selected the dashboard falls
//! back to a default feed with its own traces.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Selectable satellite
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SatelliteId {
    #[serde(rename = "h45-k1")]
    H45K1,
    #[serde(rename = "l12-5")]
    L125,
}

impl SatelliteId {
    /// Advance order within a tick
    pub const ALL: [SatelliteId; 2] = [SatelliteId::H45K1, SatelliteId::L125];

    pub fn index(&self) -> usize {
        match self {
            SatelliteId::H45K1 => 0,
            SatelliteId::L125 => 1,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            SatelliteId::H45K1 => "h45-k1",
            SatelliteId::L125 => "l12-5",
        }
    }

    pub fn designation(&self) -> &'static str {
        match self {
            SatelliteId::H45K1 => "H45-K1",
            SatelliteId::L125 => "L12-5",
        }
    }

    /// Accepts the dropdown key or the numeric index
    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim().to_ascii_lowercase().as_str() {
            "h45-k1" | "0" => Some(SatelliteId::H45K1),
            "l12-5" | "1" => Some(SatelliteId::L125),
            _ => None,
        }
    }

    pub fn info(&self) -> SatelliteInfo {
        SatelliteInfo {
            key: self.key().to_string(),
            index: Some(self.index()),
            name: format!("Satellite\n{}", self.designation()),
            description: self.description().to_string(),
        }
    }

    fn description(&self) -> &'static str {
        match self {
            SatelliteId::H45K1 => {
                "H45-K1, also known as GPS IIR-9 and GPS SVN-45, is an American navigation satellite \
                 which forms part of the Global Positioning System. It was the ninth Block IIR GPS \
                 satellite to be launched, out of thirteen in the original configuration, and twenty \
                 one overall. It was built by Lockheed Martin, using the AS-4000 satellite bus. It was \
                 launched at 22:09:01 UTC on 31 March 2003, atop a Delta II carrier rocket, flight \
                 number D297, flying in the 7925-9.5 configuration. The launch took place from Space \
                 Launch Complex 17A at the Cape Canaveral Air Force Station, and placed H45-K1 into a \
                 transfer orbit. The satellite raised itself into medium Earth orbit using a Star-37FM \
                 apogee motor."
            }
            SatelliteId::L125 => {
                "L12-5, also known as NRO Launch 22 or NROL-22, is an American signals intelligence \
                 satellite, operated by the National Reconnaissance Office. Launched in 2006, it has \
                 been identified as the first in a new series of satellites which are replacing the \
                 earlier Trumpet spacecraft. L12-5 was launched by Boeing, using a Delta IV carrier \
                 rocket flying in the Medium+(4,2) configuration. The rocket was the first Delta IV to \
                 launch from Vandenberg Air Force Base, flying from Space Launch Complex 6, a launch pad \
                 originally constructed as part of abandoned plans for manned launches from \
                 Vandenberg, originally using Titan rockets, and later Space Shuttles. The launch also \
                 marked the first launch of an Evolved Expendable Launch Vehicle from Vandenberg, and \
                 the first launch of an NRO payload on an EELV."
            }
        }
    }
}

impl fmt::Display for SatelliteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.designation())
    }
}

/// Addressable trace/window set: one per satellite plus the default feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Feed {
    #[serde(rename = "default")]
    Default,
    #[serde(rename = "h45-k1")]
    H45K1,
    #[serde(rename = "l12-5")]
    L125,
}

impl Feed {
    pub const ALL: [Feed; 3] = [Feed::Default, Feed::H45K1, Feed::L125];

    /// Unrecognized keys map to the default feed
    pub fn from_key(key: &str) -> Self {
        Feed::from(SatelliteId::from_key(key))
    }

    pub fn key(&self) -> &'static str {
        match self {
            Feed::Default => "default",
            Feed::H45K1 => SatelliteId::H45K1.key(),
            Feed::L125 => SatelliteId::L125.key(),
        }
    }

    pub fn satellite(&self) -> Option<SatelliteId> {
        match self {
            Feed::Default => None,
            Feed::H45K1 => Some(SatelliteId::H45K1),
            Feed::L125 => Some(SatelliteId::L125),
        }
    }

    pub(crate) fn slot(&self) -> usize {
        match self {
            Feed::Default => 0,
            Feed::H45K1 => 1,
            Feed::L125 => 2,
        }
    }
}

impl From<SatelliteId> for Feed {
    fn from(sat: SatelliteId) -> Self {
        match sat {
            SatelliteId::H45K1 => Feed::H45K1,
            SatelliteId::L125 => Feed::L125,
        }
    }
}

impl From<Option<SatelliteId>> for Feed {
    fn from(sat: Option<SatelliteId>) -> Self {
        sat.map(Feed::from).unwrap_or(Feed::Default)
    }
}

impl fmt::Display for Feed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Side-panel entry for the selected satellite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SatelliteInfo {
    pub key: String,
    pub index: Option<usize>,
    pub name: String,
    pub description: String,
}

impl SatelliteInfo {
    /// Blank panel shown with no selection
    pub fn unselected() -> Self {
        Self {
            key: Feed::Default.key().to_string(),
            index: None,
            name: String::new(),
            description: String::new(),
        }
    }

    pub fn for_selection(sat: Option<SatelliteId>) -> Self {
        sat.map(|s| s.info()).unwrap_or_else(Self::unselected)
    }
}
