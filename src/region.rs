use crate::model::{TransmissionRecord, VesselType};

/// Latitude/longitude rectangle. All four bounds are exclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

impl BoundingBox {
    pub const fn new(lat_min: f64, lat_max: f64, lon_min: f64, lon_max: f64) -> Self {
        BoundingBox {
            lat_min,
            lat_max,
            lon_min,
            lon_max,
        }
    }

    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        self.lat_min < lat && lat < self.lat_max && self.lon_min < lon && lon < self.lon_max
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Region {
    pub name: &'static str,
    pub bbox: BoundingBox,
}

pub const CALIFORNIA: Region = Region {
    name: "California",
    bbox: BoundingBox::new(32.56, 42.0, -126.0, -117.0),
};

pub const BAY_AREA: Region = Region {
    name: "Bay Area",
    bbox: BoundingBox::new(37.55229, 38.10289, -123.0, -122.12904),
};

pub const LA: Region = Region {
    name: "LA",
    bbox: BoundingBox::new(33.374264, 34.0, -119.18628, -117.59925),
};

/// Rows strictly inside `bbox`, in input order.
pub fn get_data_subset(records: &[TransmissionRecord], bbox: &BoundingBox) -> Vec<TransmissionRecord> {
    records
        .iter()
        .filter(|r| bbox.contains(r.lat, r.lon))
        .cloned()
        .collect()
}

/// Subset to `region`, order by (mmsi, timestamp) and label every row with
/// the region name.
pub fn extract_region(records: &[TransmissionRecord], region: &Region) -> Vec<TransmissionRecord> {
    let mut subset = get_data_subset(records, &region.bbox);
    subset.sort_by(|a, b| (a.mmsi, a.timestamp).cmp(&(b.mmsi, b.timestamp)));
    for record in subset.iter_mut() {
        record.region = Some(region.name.to_string());
    }
    subset
}

pub fn get_bay_data(records: &[TransmissionRecord]) -> Vec<TransmissionRecord> {
    extract_region(records, &BAY_AREA)
}

pub fn get_la_data(records: &[TransmissionRecord]) -> Vec<TransmissionRecord> {
    extract_region(records, &LA)
}

/// Distinct vessel types in order of first appearance.
pub fn unique_vessel_types(records: &[TransmissionRecord]) -> Vec<VesselType> {
    let mut seen = Vec::new();
    for r in records {
        if !seen.contains(&r.vessel_type) {
            seen.push(r.vessel_type);
        }
    }
    seen
}

pub fn vessel_type_counts(records: &[TransmissionRecord]) -> Vec<(VesselType, usize)> {
    let mut counts: Vec<(VesselType, usize)> = Vec::new();
    for r in records {
        match counts.iter_mut().find(|(t, _)| *t == r.vessel_type) {
            Some((_, n)) => *n += 1,
            None => counts.push((r.vessel_type, 1)),
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NavigationalStatus;
    use chrono::NaiveDate;

    fn record(mmsi: u64, minute: u32, lat: f64, lon: f64) -> TransmissionRecord {
        TransmissionRecord {
            mmsi,
            timestamp: NaiveDate::from_ymd_opt(2020, 6, 11)
                .unwrap()
                .and_hms_opt(minute / 60, minute % 60, 0)
                .unwrap(),
            lat,
            lon,
            vessel_type: VesselType::Cargo,
            status: NavigationalStatus::UnderWayUsingEngine,
            region: None,
        }
    }

    #[test]
    fn california_box_is_open() {
        assert!(!CALIFORNIA.bbox.contains(32.56, -120.0));
        assert!(CALIFORNIA.bbox.contains(32.57, -120.0));
        assert!(!CALIFORNIA.bbox.contains(42.0, -120.0));
        assert!(!CALIFORNIA.bbox.contains(35.0, -126.0));
        assert!(!CALIFORNIA.bbox.contains(35.0, -117.0));
    }

    #[test]
    fn subset_keeps_only_interior_points() {
        let bbox = BoundingBox::new(10.0, 20.0, -5.0, 5.0);
        let records = vec![
            record(1, 0, 15.0, 0.0),
            record(1, 1, 10.0, 0.0),
            record(1, 2, 15.0, 5.0),
            record(2, 3, 19.999, -4.999),
            record(2, 4, 25.0, 0.0),
        ];
        let subset = get_data_subset(&records, &bbox);
        assert_eq!(subset.len(), 2);
        for r in &subset {
            assert!(r.lat > bbox.lat_min && r.lat < bbox.lat_max);
            assert!(r.lon > bbox.lon_min && r.lon < bbox.lon_max);
        }
        // input untouched
        assert_eq!(records.len(), 5);
    }

    #[test]
    fn subset_is_idempotent() {
        let records = vec![
            record(1, 0, 37.8, -122.4),
            record(2, 1, 33.7, -118.2),
            record(3, 2, 37.6, -122.2),
        ];
        let once = get_data_subset(&records, &BAY_AREA.bbox);
        let twice = get_data_subset(&once, &BAY_AREA.bbox);
        assert_eq!(once, twice);
    }

    #[test]
    fn extract_region_sorts_and_labels() {
        let records = vec![
            record(3, 10, 37.8, -122.4),
            record(1, 20, 37.8, -122.4),
            record(3, 5, 37.8, -122.4),
            record(1, 2, 37.8, -122.4),
            record(2, 0, 33.7, -118.2),
        ];
        let bay = get_bay_data(&records);
        assert_eq!(bay.len(), 4);
        assert!(bay
            .windows(2)
            .all(|w| (w[0].mmsi, w[0].timestamp) <= (w[1].mmsi, w[1].timestamp)));
        assert!(bay.iter().all(|r| r.region.as_deref() == Some("Bay Area")));
        assert_eq!(bay.iter().map(|r| r.mmsi).collect::<Vec<_>>(), vec![1, 1, 3, 3]);

        let la = get_la_data(&records);
        assert_eq!(la.len(), 1);
        assert_eq!(la[0].region.as_deref(), Some("LA"));
        assert!(records.iter().all(|r| r.region.is_none()));
    }

    #[test]
    fn vessel_types_in_first_appearance_order() {
        let mut a = record(1, 0, 37.8, -122.4);
        a.vessel_type = VesselType::Tug;
        let b = record(2, 0, 37.8, -122.4);
        let mut c = record(3, 0, 37.8, -122.4);
        c.vessel_type = VesselType::Tug;

        let records = vec![a, b, c];
        assert_eq!(
            unique_vessel_types(&records),
            vec![VesselType::Tug, VesselType::Cargo]
        );
        assert_eq!(
            vessel_type_counts(&records),
            vec![(VesselType::Tug, 2), (VesselType::Cargo, 1)]
        );
    }
}
