use std::fmt;

use chrono::NaiveDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VesselType {
    Fishing,
    Tug,
    Dredger,
    DiveVessel,
    MilitaryOps,
    SailingVessel,
    PleasureCraft,
    HighSpeedCraft,
    Passenger,
    Cargo,
    Tanker,
}

/// AIS ship type codes we classify. `None` marks codes that are known but
/// treated as unknown; any code missing from the table is unknown as well.
pub const VESSEL_TYPE_CODES: &[(i64, Option<VesselType>)] = &[
    (0, None),
    (30, Some(VesselType::Fishing)),
    (31, Some(VesselType::Tug)),
    (32, Some(VesselType::Tug)),
    (33, Some(VesselType::Dredger)),
    (34, Some(VesselType::DiveVessel)),
    (35, Some(VesselType::MilitaryOps)),
    (36, Some(VesselType::SailingVessel)),
    (37, Some(VesselType::PleasureCraft)),
    (38, None),
    (40, Some(VesselType::HighSpeedCraft)),
    (47, Some(VesselType::HighSpeedCraft)),
    (60, Some(VesselType::Passenger)),
    (70, Some(VesselType::Cargo)),
    (79, Some(VesselType::Cargo)),
    (80, Some(VesselType::Tanker)),
    (89, Some(VesselType::Tanker)),
];

impl VesselType {
    pub fn from_code(code: f64) -> Option<VesselType> {
        let code = integral_code(code)?;
        VESSEL_TYPE_CODES
            .iter()
            .find(|(c, _)| *c == code)
            .and_then(|(_, vessel_type)| *vessel_type)
    }

    pub fn label(&self) -> &'static str {
        match self {
            VesselType::Fishing => "Fishing",
            VesselType::Tug => "Tug",
            VesselType::Dredger => "Dredger",
            VesselType::DiveVessel => "Dive Vessel",
            VesselType::MilitaryOps => "Military Ops",
            VesselType::SailingVessel => "Sailing Vessel",
            VesselType::PleasureCraft => "Pleasure Craft",
            VesselType::HighSpeedCraft => "High-Speed Craft",
            VesselType::Passenger => "Passenger",
            VesselType::Cargo => "Cargo",
            VesselType::Tanker => "Tanker",
        }
    }
}

impl fmt::Display for VesselType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavigationalStatus {
    UnderWayUsingEngine,
    AtAnchor,
    RestrictedManoeuverability,
    Moored,
    Fishing,
    UnderWaySailing,
}

pub const STATUS_CODES: &[(i64, NavigationalStatus)] = &[
    (0, NavigationalStatus::UnderWayUsingEngine),
    (1, NavigationalStatus::AtAnchor),
    (3, NavigationalStatus::RestrictedManoeuverability),
    (5, NavigationalStatus::Moored),
    (7, NavigationalStatus::Fishing),
    (8, NavigationalStatus::UnderWaySailing),
];

impl NavigationalStatus {
    pub fn from_code(code: f64) -> Option<NavigationalStatus> {
        let code = integral_code(code)?;
        STATUS_CODES
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, status)| *status)
    }

    pub fn label(&self) -> &'static str {
        match self {
            NavigationalStatus::UnderWayUsingEngine => "Under way using engine",
            NavigationalStatus::AtAnchor => "At anchor",
            NavigationalStatus::RestrictedManoeuverability => "Restricted manoeuverability",
            NavigationalStatus::Moored => "Moored",
            NavigationalStatus::Fishing => "Fishing",
            NavigationalStatus::UnderWaySailing => "Under way sailing",
        }
    }
}

impl fmt::Display for NavigationalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// codes arrive as floats when the column has blanks, e.g. "70.0"
fn integral_code(code: f64) -> Option<i64> {
    if code.is_finite() && code.fract() == 0.0 {
        Some(code as i64)
    } else {
        None
    }
}

#[derive(Debug, Clone, serde::Deserialize)]
// MarineCadastre daily AIS export, only the columns we read:
//1.	MMSI			MMSI number of vessel
//2.	BaseDateTime		Timestamp, format: 2020-06-11T23:59:59
//3.	LAT			Latitude (e.g. 37.80)
//4.	LON			Longitude (e.g. -122.40)
//5.	VesselType		AIS ship type code, blank if not broadcast
//6.	Status			Navigational status code, blank if not broadcast
// example: 367004670,2020-06-11T00:00:00,37.80618,-122.40177,0.0,63.4,511.0,SAN FRANCISCO,,WDB9706,31,0,...
pub struct RawRecord {
    #[serde(rename = "MMSI")]
    pub mmsi: u64,
    #[serde(rename = "BaseDateTime")]
    pub base_date_time: String,
    #[serde(rename = "LAT")]
    pub lat: f64,
    #[serde(rename = "LON")]
    pub lon: f64,
    #[serde(rename = "VesselType")]
    pub vessel_type: Option<f64>,
    #[serde(rename = "Status")]
    pub status: Option<f64>,
}

/// A single classified AIS transmission.
#[derive(Debug, Clone, PartialEq)]
pub struct TransmissionRecord {
    pub mmsi: u64,
    pub timestamp: NaiveDateTime,
    pub lat: f64,
    pub lon: f64,
    pub vessel_type: VesselType,
    pub status: NavigationalStatus,
    /// Set by the named region extractors.
    pub region: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fishing_code_maps_to_fishing() {
        assert_eq!(VesselType::from_code(30.0), Some(VesselType::Fishing));
        assert_eq!(VesselType::Fishing.to_string(), "Fishing");
    }

    #[test]
    fn explicit_unknown_codes_do_not_map() {
        assert_eq!(VesselType::from_code(0.0), None);
        assert_eq!(VesselType::from_code(38.0), None);
    }

    #[test]
    fn codes_outside_the_table_do_not_map() {
        assert_eq!(VesselType::from_code(52.0), None);
        assert_eq!(VesselType::from_code(30.5), None);
        assert_eq!(VesselType::from_code(f64::NAN), None);
    }

    #[test]
    fn paired_codes_share_a_label() {
        assert_eq!(VesselType::from_code(31.0), VesselType::from_code(32.0));
        assert_eq!(VesselType::from_code(70.0), Some(VesselType::Cargo));
        assert_eq!(VesselType::from_code(79.0), Some(VesselType::Cargo));
        assert_eq!(VesselType::from_code(89.0), Some(VesselType::Tanker));
        assert_eq!(
            VesselType::from_code(47.0).map(|v| v.label()),
            Some("High-Speed Craft")
        );
    }

    #[test]
    fn status_codes() {
        assert_eq!(NavigationalStatus::from_code(5.0), Some(NavigationalStatus::Moored));
        assert_eq!(NavigationalStatus::Moored.to_string(), "Moored");
        assert_eq!(NavigationalStatus::from_code(99.0), None);
        assert_eq!(NavigationalStatus::from_code(2.0), None);
        assert_eq!(
            NavigationalStatus::from_code(0.0).map(|s| s.label()),
            Some("Under way using engine")
        );
    }

    #[test]
    fn every_table_entry_round_trips_through_from_code() {
        for (code, vessel_type) in VESSEL_TYPE_CODES {
            assert_eq!(VesselType::from_code(*code as f64), *vessel_type);
        }
        for (code, status) in STATUS_CODES {
            assert_eq!(NavigationalStatus::from_code(*code as f64), Some(*status));
        }
    }
}
