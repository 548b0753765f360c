use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use log::{debug, info};

use crate::model::{NavigationalStatus, RawRecord, TransmissionRecord, VesselType};
use crate::region::CALIFORNIA;

/// A vessel must have strictly more messages than this inside the
/// California box to be kept.
pub const MIN_MESSAGES_PER_VESSEL: usize = 100;

pub const REQUIRED_COLUMNS: [&str; 6] = ["MMSI", "BaseDateTime", "LAT", "LON", "VesselType", "Status"];

const TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to open {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("input is missing required column `{0}`")]
    MissingColumn(&'static str),
    /// `line` counts from 1 and includes the header line.
    #[error("line {line}: cannot parse timestamp `{value}`")]
    Timestamp { line: usize, value: String },
}

/// Read an AIS csv export and reduce it to classified transmissions off the
/// California coast.
pub fn load_cali_data(path: &Path) -> Result<Vec<TransmissionRecord>, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(file);

    let headers = rdr.headers()?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(LoadError::MissingColumn(column));
        }
    }

    let raw = rdr
        .deserialize()
        .collect::<Result<Vec<RawRecord>, csv::Error>>()?;
    info!("{} has {} rows", path.display(), raw.len());

    filter_transmissions(raw)
}

/// The filtering half of [`load_cali_data`], usable on rows from anywhere.
/// Output keeps the input order.
pub fn filter_transmissions(raw: Vec<RawRecord>) -> Result<Vec<TransmissionRecord>, LoadError> {
    let total = raw.len();

    let in_box: Vec<(usize, RawRecord)> = raw
        .into_iter()
        .enumerate()
        .filter(|(_, r)| r.vessel_type.is_some() && r.status.is_some())
        .filter(|(_, r)| CALIFORNIA.bbox.contains(r.lat, r.lon))
        .collect();
    info!(
        "{} of {} rows are complete and inside the {} box",
        in_box.len(),
        total,
        CALIFORNIA.name
    );

    let mut counts: HashMap<u64, usize> = HashMap::new();
    for (_, r) in &in_box {
        *counts.entry(r.mmsi).or_default() += 1;
    }
    let busy: Vec<(usize, RawRecord)> = in_box
        .into_iter()
        .filter(|(_, r)| counts[&r.mmsi] > MIN_MESSAGES_PER_VESSEL)
        .collect();
    info!(
        "{} rows from {} vessels with more than {} messages",
        busy.len(),
        counts.values().filter(|n| **n > MIN_MESSAGES_PER_VESSEL).count(),
        MIN_MESSAGES_PER_VESSEL
    );

    let mut records = Vec::with_capacity(busy.len());
    let mut unmapped = 0;
    for (row, r) in busy {
        let timestamp = parse_timestamp(&r.base_date_time).ok_or_else(|| LoadError::Timestamp {
            line: row + 2,
            value: r.base_date_time.clone(),
        })?;

        // both are Some after the completeness filter
        let vessel_type = r.vessel_type.and_then(VesselType::from_code);
        let status = r.status.and_then(NavigationalStatus::from_code);

        match (vessel_type, status) {
            (Some(vessel_type), Some(status)) => records.push(TransmissionRecord {
                mmsi: r.mmsi,
                timestamp,
                lat: r.lat,
                lon: r.lon,
                vessel_type,
                status,
                region: None,
            }),
            _ => {
                debug!(
                    "dropping row {}: vessel type {:?}, status {:?} not classified",
                    row, r.vessel_type, r.status
                );
                unmapped += 1;
            }
        }
    }
    info!(
        "{} classified transmissions ({} dropped as unknown type or status)",
        records.len(),
        unmapped
    );

    Ok(records)
}

pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}
