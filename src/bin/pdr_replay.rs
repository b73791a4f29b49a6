use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::Parser;
use flate2::read::GzDecoder;
use pdr_tracker::{DeviceContext, PdrConfig, PdrTracker, Position, SensorSample, Snapshot};
use serde::Deserialize;
use serde_json::json;

#[derive(Parser, Debug)]
#[command(name = "pdr_replay")]
#[command(about = "Replay a recorded sensor log through the PDR tracker", long_about = None)]
struct Args {
    /// Path to a sensor log (*.json or *.json.gz)
    #[arg(long)]
    log: PathBuf,

    /// Optional JSON config overriding the defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Starting position
    #[arg(long, default_value = "0.0", allow_hyphen_values = true)]
    start_x: f64,

    #[arg(long, default_value = "0.0", allow_hyphen_values = true)]
    start_y: f64,

    #[arg(long, default_value = "0.0", allow_hyphen_values = true)]
    start_z: f64,

    /// Device carry context (holding, pocket)
    #[arg(long, default_value = "holding")]
    context: String,

    /// Heading bias in degrees
    #[arg(long, default_value = "0.0", allow_hyphen_values = true)]
    heading_bias: f64,

    /// Fixed RNG seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Write the summary here instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Deserialize)]
struct LogFile {
    readings: Vec<SensorSample>,
}

fn load_log(path: &Path) -> anyhow::Result<LogFile> {
    let file = File::open(path)?;
    if path.extension().map(|e| e == "gz").unwrap_or(false) {
        let gz = GzDecoder::new(file);
        let reader = BufReader::new(gz);
        Ok(serde_json::from_reader(reader)?)
    } else {
        let reader = BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => PdrConfig::load(path)?,
        None => PdrConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    let context: DeviceContext = args.context.parse()?;

    let log = load_log(&args.log)?;
    log::info!(
        "replaying {} readings from {}",
        log.readings.len(),
        args.log.display()
    );

    let start = Position::new(args.start_x, args.start_y, args.start_z);
    let mut tracker = PdrTracker::new(config)?;
    tracker.set_device_context(context);
    tracker.set_heading_bias(args.heading_bias)?;
    tracker.set_start_position(start)?;
    tracker.confirm_start();

    let mut steps = Vec::new();
    let mut snapshots: Vec<Snapshot> = Vec::new();
    let mut resample_count = 0u64;

    for reading in &log.readings {
        if let Some(update) = tracker.process_sample(reading) {
            if update.resampled {
                resample_count += 1;
            }
            snapshots.push(tracker.capture_snapshot());
            steps.push(update);
        }
    }

    let end = tracker.position();
    let path_length: f64 = steps.iter().map(|s| s.displacement).sum();
    log::info!(
        "{} steps, final ({:.2}, {:.2}), {} resamples",
        steps.len(),
        end.x,
        end.y,
        resample_count
    );

    let summary = json!({
        "log": args.log.display().to_string(),
        "readings": log.readings.len(),
        "steps": steps.len(),
        "start": start,
        "final_position": end,
        "final_heading": tracker.heading(),
        "net_displacement": start.planar_distance(&end),
        "path_length": path_length,
        "resamples": resample_count,
        "particle_spread": tracker.state().particles.spread(),
        "effective_sample_size": tracker.state().particles.last_effective_sample_size(),
        "trajectory": steps,
        "snapshots": snapshots,
    });

    match &args.output {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path)?);
            serde_json::to_writer_pretty(&mut writer, &summary)?;
            writer.flush()?;
            println!("Wrote {}", path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&summary)?),
    }

    Ok(())
}
