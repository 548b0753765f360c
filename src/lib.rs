pub mod load;
pub mod model;
pub mod plot;
pub mod region;

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use chrono::FixedOffset;
use clap::{value_parser, Arg, Command};
use log::info;

use plot::{HourBins, HourlyOptions, ImageFormat};
use region::vessel_type_counts;

#[derive(Debug)]
pub struct Config {
    pub path: PathBuf,
    pub out_dir: PathBuf,
    pub format: ImageFormat,
    pub utc_offset: FixedOffset,
}

fn command() -> Command {
    Command::new("cali_ais")
        .version("0.1")
        .about("filter AIS transmissions off California and plot them [csv]")
        .arg(
            Arg::new("path")
                .short('f')
                .long("file-path")
                .required(true)
                .value_parser(value_parser!(PathBuf))
                .help("AIS csv export to analyze"),
        )
        .arg(
            Arg::new("out_dir")
                .short('o')
                .long("out-dir")
                .default_value(".")
                .value_parser(value_parser!(PathBuf))
                .help("directory the plots are written to"),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .default_value("png")
                .value_parser(["png", "svg"])
                .help("image format of the plots"),
        )
        .arg(
            Arg::new("utc_offset")
                .long("utc-offset")
                .default_value("-7")
                .allow_negative_numbers(true)
                .value_parser(value_parser!(i32).range(-12..=14))
                .help("hours added to UTC for the local time of day axis"),
        )
}

pub fn get_arg() -> Result<Config> {
    config_from(command().get_matches())
}

fn config_from(matches: clap::ArgMatches) -> Result<Config> {
    let path = matches
        .get_one::<PathBuf>("path")
        .cloned()
        .ok_or_else(|| anyhow!("missing --file-path"))?;
    let out_dir = matches
        .get_one::<PathBuf>("out_dir")
        .cloned()
        .unwrap_or_else(|| PathBuf::from("."));
    let format = match matches.get_one::<String>("format").map(String::as_str) {
        Some("svg") => ImageFormat::Svg,
        _ => ImageFormat::Png,
    };
    let hours = matches.get_one::<i32>("utc_offset").copied().unwrap_or(0);
    let utc_offset = FixedOffset::east_opt(hours * 3600)
        .ok_or_else(|| anyhow!("utc offset {hours} is out of range"))?;

    Ok(Config {
        path,
        out_dir,
        format,
        utc_offset,
    })
}

pub fn run(config: Config) -> Result<()> {
    info!("config is {:?}", config);

    let cali = load::load_cali_data(&config.path)
        .with_context(|| format!("loading {}", config.path.display()))?;
    let bay = region::get_bay_data(&cali);
    let la = region::get_la_data(&cali);

    for (name, records) in [("California", &cali), ("Bay Area", &bay), ("LA", &la)] {
        info!("{}: {} transmissions", name, records.len());
        for (vessel_type, count) in vessel_type_counts(records) {
            info!("  {:<16} {}", vessel_type.label(), count);
        }
    }

    std::fs::create_dir_all(&config.out_dir)
        .with_context(|| format!("creating {}", config.out_dir.display()))?;
    let ext = config.format.extension();
    let out = |stem: &str| config.out_dir.join(format!("{stem}.{ext}"));

    plot::plot_ship_tracks(&cali, &out("cali_tracks"), "California ship tracks")?;
    plot::plot_ship_tracks(&bay, &out("bay_tracks"), "Bay Area ship tracks")?;
    plot::plot_ship_tracks(&la, &out("la_tracks"), "LA ship tracks")?;

    let options = HourlyOptions {
        x_label: format!("Local Time (UTC{})", config.utc_offset),
        utc_offset: config.utc_offset,
    };
    plot::plot_by_hour(
        &bay,
        &la,
        region::BAY_AREA.name,
        region::LA.name,
        &HourBins::hourly(),
        &options,
        &out("transmissions_by_hour"),
    )?;

    Ok(())
}
