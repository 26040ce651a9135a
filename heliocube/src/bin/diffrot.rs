//! Print solar differential rotation periods and a rotated central-meridian track

use std::path::PathBuf;

use anyhow::Context;
use chrono::{DateTime, TimeDelta, Utc};
use clap::Parser;
use common::log_setup::setup_logging;
use heliocube::meta::parse_timestamp;
use heliocube::{Config, DifferentialRotation, Helioprojective, RotationFrame, RotationLaw};

#[derive(Parser, Debug)]
#[command(author, version, about = "Solar differential rotation tables")]
struct Args {
    /// Days to rotate the central-meridian points forward (negative rotates backward)
    #[arg(long, default_value_t = 4.0, allow_negative_numbers = true)]
    days: f64,

    /// Rotation law (howard, snodgrass, allen)
    #[arg(long, default_value_t = RotationLaw::Howard)]
    law: RotationLaw,

    /// Start epoch (ISO-8601, UTC)
    #[arg(long, default_value = "2011-06-07T06:33:02")]
    start: String,

    /// TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Latitude step of the period table in degrees
    #[arg(long, default_value_t = 10)]
    step: usize,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::default(),
    };
    setup_logging(&config.log_config())?;

    anyhow::ensure!(args.step > 0, "--step must be positive");
    let start = parse_timestamp(&args.start)
        .with_context(|| format!("invalid start epoch '{}'", args.start))?;

    tracing::info!(law = %args.law, days = args.days, %start, "Computing differential rotation");

    print_period_table(args.law, args.step);
    print_track(args.law, start, args.days, &config);

    Ok(())
}

fn print_period_table(law: RotationLaw, step: usize) {
    let model = DifferentialRotation::new(law, RotationFrame::Sidereal);

    println!("Sidereal rotation period ({law} law)");
    println!("{:>8} {:>10} {:>12}", "lat", "sin(lat)", "period [d]");
    for latitude in (0..90).step_by(step) {
        let latitude = latitude as f64;
        println!(
            "{:>8.1} {:>10.3} {:>12.2}",
            latitude,
            latitude.to_radians().sin(),
            model.rotation_period(latitude)
        );
    }
    println!();
}

fn print_track(law: RotationLaw, start: DateTime<Utc>, days: f64, config: &Config) {
    let model = DifferentialRotation::new(law, RotationFrame::Synodic);
    let duration = TimeDelta::milliseconds((days * 86_400_000.0).round() as i64);
    let end = start + duration;
    let display = &config.display;

    println!(
        "Central meridian rotated from {} to {}",
        display.format_time(&start),
        display.format_time(&end)
    );
    println!("{:>10} {:>10}   {:>10} {:>10}", "x", "y", "x'", "y'");

    for y in (-700..=700).step_by(100) {
        let hpc = Helioprojective::new(0.0, f64::from(y));
        match model.project_coordinate(hpc, start, end) {
            Ok(moved) => println!(
                "{:>10.1} {:>10.1}   {:>10.1} {:>10.1}",
                hpc.x, hpc.y, moved.x, moved.y
            ),
            Err(err) => {
                tracing::warn!(%hpc, "Skipping point: {err}");
                println!("{:>10.1} {:>10.1}   {:>21}", hpc.x, hpc.y, "not visible");
            }
        }
    }
}
