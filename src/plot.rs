use std::collections::HashMap;
use std::ops::Range;
use std::path::Path;

use anyhow::{bail, Result};
use chrono::{FixedOffset, NaiveDateTime, TimeZone, Timelike};
use log::{info, warn};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontStyle;

use crate::model::{TransmissionRecord, VesselType};
use crate::region::{unique_vessel_types, CALIFORNIA};

const TRACK_SIZE: (u32, u32) = (1500, 1000);
const HOURLY_SIZE: (u32, u32) = (1500, 1200);

const TRACK_ALPHA: f64 = 0.15;
const HIST_ALPHA: f64 = 0.5;
const FIRST_COLOR: RGBColor = RGBColor(226, 74, 51);
const SECOND_COLOR: RGBColor = RGBColor(52, 138, 189);

/// Minutes between labelled ticks on the hourly x axis.
pub const TICK_INTERVAL_MINUTES: u32 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Svg,
}

impl ImageFormat {
    pub fn from_path(path: &Path) -> ImageFormat {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("svg") => ImageFormat::Svg,
            _ => ImageFormat::Png,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Svg => "svg",
        }
    }
}

/// Draw every vessel's (lon, lat) trace on one canvas. Format follows the
/// file extension.
pub fn plot_ship_tracks(records: &[TransmissionRecord], path: &Path, title: &str) -> Result<()> {
    match ImageFormat::from_path(path) {
        ImageFormat::Png => draw_tracks(
            BitMapBackend::new(path, TRACK_SIZE).into_drawing_area(),
            records,
            title,
        )?,
        ImageFormat::Svg => draw_tracks(
            SVGBackend::new(path, TRACK_SIZE).into_drawing_area(),
            records,
            title,
        )?,
    }
    info!("wrote track plot {}", path.display());
    Ok(())
}

fn draw_tracks<DB>(root: DrawingArea<DB, Shift>, records: &[TransmissionRecord], title: &str) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;

    let (lon_range, lat_range) = track_extent(records);
    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 28))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(lon_range, lat_range)?;

    let degrees = |v: &f64| format!("{:.2}", v);
    chart
        .configure_mesh()
        .x_desc("LON")
        .y_desc("LAT")
        .x_label_formatter(&degrees)
        .y_label_formatter(&degrees)
        .draw()?;

    let style = BLACK.mix(TRACK_ALPHA);
    for (_, trace) in tracks_by_vessel(records) {
        chart.draw_series(LineSeries::new(trace, &style))?;
    }

    root.present()?;
    Ok(())
}

/// (lon, lat) traces per vessel, vessels in order of first appearance.
pub fn tracks_by_vessel(records: &[TransmissionRecord]) -> Vec<(u64, Vec<(f64, f64)>)> {
    let mut index: HashMap<u64, usize> = HashMap::new();
    let mut tracks: Vec<(u64, Vec<(f64, f64)>)> = Vec::new();
    for r in records {
        let i = *index.entry(r.mmsi).or_insert_with(|| {
            tracks.push((r.mmsi, Vec::new()));
            tracks.len() - 1
        });
        tracks[i].1.push((r.lon, r.lat));
    }
    tracks
}

/// Longitude and latitude ranges covering all records plus a 2% margin.
/// Falls back to the California box when there is nothing to draw.
pub fn track_extent(records: &[TransmissionRecord]) -> (Range<f64>, Range<f64>) {
    if records.is_empty() {
        let b = CALIFORNIA.bbox;
        return (b.lon_min..b.lon_max, b.lat_min..b.lat_max);
    }

    let (mut lon_min, mut lon_max) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut lat_min, mut lat_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for r in records {
        lon_min = lon_min.min(r.lon);
        lon_max = lon_max.max(r.lon);
        lat_min = lat_min.min(r.lat);
        lat_max = lat_max.max(r.lat);
    }
    (pad(lon_min, lon_max), pad(lat_min, lat_max))
}

fn pad(min: f64, max: f64) -> Range<f64> {
    let margin = ((max - min) * 0.02).max(0.01);
    (min - margin)..(max + margin)
}

/// Strictly increasing histogram edges, in minutes since midnight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HourBins {
    edges: Vec<u32>,
}

impl HourBins {
    pub fn new(edges: Vec<u32>) -> Result<Self> {
        if edges.len() < 2 {
            bail!("need at least two bin edges, got {}", edges.len());
        }
        if let Some(w) = edges.windows(2).find(|w| w[0] >= w[1]) {
            bail!("bin edges must increase, found {} followed by {}", w[0], w[1]);
        }
        Ok(HourBins { edges })
    }

    /// One bin per hour over a whole day.
    pub fn hourly() -> Self {
        HourBins {
            edges: (0..=24).map(|h| h * 60).collect(),
        }
    }

    pub fn edges(&self) -> &[u32] {
        &self.edges
    }

    pub fn first(&self) -> u32 {
        self.edges[0]
    }

    pub fn last(&self) -> u32 {
        self.edges[self.edges.len() - 1]
    }
}

/// Histogram counts. Bins are `[e_i, e_i+1)` except the last, which also
/// takes values equal to the final edge. Out of range values are skipped.
pub fn bin_counts(values: impl IntoIterator<Item = u32>, bins: &HourBins) -> Vec<usize> {
    let edges = bins.edges();
    let mut counts = vec![0; edges.len() - 1];
    let last = counts.len() - 1;
    for v in values {
        if v < bins.first() || v > bins.last() {
            continue;
        }
        let i = edges.partition_point(|e| *e <= v) - 1;
        counts[i.min(last)] += 1;
    }
    counts
}

/// Minutes since local midnight for a UTC timestamp.
pub fn minute_of_day(timestamp: NaiveDateTime, utc_offset: FixedOffset) -> u32 {
    let local = utc_offset.from_utc_datetime(&timestamp);
    local.hour() * 60 + local.minute()
}

pub fn format_minutes(minutes: u32) -> String {
    format!("{:02}:{:02}", minutes / 60 % 24, minutes % 60)
}

/// Axis settings shared by both series of [`plot_by_hour`].
#[derive(Debug, Clone)]
pub struct HourlyOptions {
    pub x_label: String,
    pub utc_offset: FixedOffset,
}

/// Histogram counts of one vessel type for both inputs of [`plot_by_hour`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Panel {
    pub vessel_type: VesselType,
    pub first: Vec<usize>,
    pub second: Vec<usize>,
}

/// One panel per vessel type of `data1`, in first-appearance order. Types
/// only present in `data2` get no panel.
pub fn panels(
    data1: &[TransmissionRecord],
    data2: &[TransmissionRecord],
    bins: &HourBins,
    utc_offset: FixedOffset,
) -> Vec<Panel> {
    unique_vessel_types(data1)
        .into_iter()
        .map(|vessel_type| Panel {
            vessel_type,
            first: type_counts(data1, vessel_type, bins, utc_offset),
            second: type_counts(data2, vessel_type, bins, utc_offset),
        })
        .collect()
}

/// One panel per vessel type seen in `data1`, each overlaying the hourly
/// histograms of `data1` and `data2`. Vessel types only present in `data2`
/// are not drawn.
pub fn plot_by_hour(
    data1: &[TransmissionRecord],
    data2: &[TransmissionRecord],
    label1: &str,
    label2: &str,
    bins: &HourBins,
    options: &HourlyOptions,
    path: &Path,
) -> Result<()> {
    let panels = panels(data1, data2, bins, options.utc_offset);

    if panels.is_empty() {
        warn!("no transmissions for {}, hourly plot will be empty", label1);
    }

    let labels = (label1, label2);
    match ImageFormat::from_path(path) {
        ImageFormat::Png => draw_hourly(
            BitMapBackend::new(path, HOURLY_SIZE).into_drawing_area(),
            &panels,
            labels,
            bins,
            options,
        )?,
        ImageFormat::Svg => draw_hourly(
            SVGBackend::new(path, HOURLY_SIZE).into_drawing_area(),
            &panels,
            labels,
            bins,
            options,
        )?,
    }
    info!("wrote hourly plot {}", path.display());
    Ok(())
}

fn type_counts(
    records: &[TransmissionRecord],
    vessel_type: VesselType,
    bins: &HourBins,
    utc_offset: FixedOffset,
) -> Vec<usize> {
    bin_counts(
        records
            .iter()
            .filter(|r| r.vessel_type == vessel_type)
            .map(|r| minute_of_day(r.timestamp, utc_offset)),
        bins,
    )
}

fn draw_hourly<DB>(
    root: DrawingArea<DB, Shift>,
    panels: &[Panel],
    labels: (&str, &str),
    bins: &HourBins,
    options: &HourlyOptions,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;
    let root = root.titled("AIS Transmissions per Hour", ("sans-serif", 32))?;

    if panels.is_empty() {
        root.present()?;
        return Ok(());
    }

    // shared y scale
    let y_max = panels
        .iter()
        .flat_map(|p| p.first.iter().chain(p.second.iter()))
        .copied()
        .max()
        .unwrap_or(0)
        .max(1) as f64
        * 1.05;

    let ticks: Vec<u32> = (bins.first()..=bins.last())
        .step_by(TICK_INTERVAL_MINUTES as usize)
        .collect();
    let edges = bins.edges();
    let last = panels.len() - 1;
    let middle = panels.len() / 2;

    let clock = |m: &u32| format_minutes(*m);
    let whole = |v: &f64| format!("{:.0}", v);

    let areas = root.split_evenly((panels.len(), 1));
    for (i, (area, panel)) in areas.iter().zip(panels).enumerate() {
        let mut chart = ChartBuilder::on(area)
            .caption(panel.vessel_type.label(), ("sans-serif", 20).into_font().style(FontStyle::Bold))
            .margin(8)
            .x_label_area_size(if i == last { 50 } else { 20 })
            .y_label_area_size(70)
            .build_cartesian_2d(
                (bins.first()..bins.last()).with_key_points(ticks.clone()),
                0.0..y_max,
            )?;

        let mut mesh = chart.configure_mesh();
        mesh.x_label_formatter(&clock).y_label_formatter(&whole);
        if i == last {
            mesh.x_desc(options.x_label.as_str());
        }
        if i == middle {
            mesh.y_desc("Transmissions/Hour");
        }
        mesh.draw()?;

        for (counts, label, color) in [
            (&panel.first, labels.0, FIRST_COLOR),
            (&panel.second, labels.1, SECOND_COLOR),
        ] {
            let style = color.mix(HIST_ALPHA).filled();
            chart
                .draw_series(counts.iter().enumerate().map(|(b, count)| {
                    Rectangle::new([(edges[b], 0.0), (edges[b + 1], *count as f64)], style)
                }))?
                .label(label)
                .legend(move |(x, y)| Rectangle::new([(x, y - 6), (x + 18, y + 6)], style));
        }

        // one legend for the whole figure
        if i == last {
            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::LowerRight)
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()?;
        }
    }

    root.present()?;
    Ok(())
}
