//! Command-line perception loop: read frames from a file or directory, run
//! the board pipeline on each, publish world snapshots to a communication
//! worker, and optionally write annotated frames and a JSON run summary.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::thread;

use clap::Parser;
use log::LevelFilter;
use serde::Serialize;

use chesseye::classify::ClassifyParams;
use chesseye::pipeline::{run_vision_loop, PipelineParams};
use chesseye::state::{run_comm_worker, CommParams, LogSink, Protocol};
use chesseye::{BoardParams, ShutdownFlag, SnapshotChannel, Tunables};

const FRAME_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "bmp", "tiff"];

#[derive(Parser, Debug)]
#[command(
    name = "chesseye",
    version,
    about = "Chessboard perception loop: locate, rectify and classify the board, publish world snapshots"
)]
struct Cli {
    /// Image file or directory of frames, processed in name order
    input: PathBuf,

    /// Write annotated frames, edge masks and a run summary here
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Edge threshold control (0-255)
    #[arg(long, default_value_t = 228)]
    threshold: u8,

    /// Minimum counted cell area control (0-3000)
    #[arg(long, default_value_t = 300)]
    min_square_area: u32,

    /// Solid border width around the normalized board, in pixels
    #[arg(long, default_value_t = 10)]
    border: u32,

    /// Communication protocol: "network" or "bus"
    #[arg(long, default_value = "bus")]
    protocol: String,

    /// Master device address (network protocol)
    #[arg(long)]
    master_addr: Option<String>,

    /// Own address as seen by the master (network protocol)
    #[arg(long)]
    self_addr: Option<String>,

    /// Master-to-device command port
    #[arg(long, default_value_t = 5005)]
    master_to_slave_port: u16,

    /// Device-to-master report port
    #[arg(long, default_value_t = 5006)]
    slave_to_master_port: u16,

    /// Exchange buffer size in bytes
    #[arg(long, default_value_t = CommParams::DEFAULT_BUFFER_SIZE)]
    buffer_size: usize,

    /// Stop after this many frames
    #[arg(long)]
    max_frames: Option<usize>,

    /// Increase log verbosity (-v: debug, -vv: trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Serialize)]
struct CycleSummary {
    frame: u64,
    caption: &'static str,
    squares: usize,
    circles: usize,
}

fn collect_frame_paths(input: &Path) -> std::io::Result<Vec<PathBuf>> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }
    let mut paths: Vec<PathBuf> = fs::read_dir(input)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .map(|e| FRAME_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
                .unwrap_or(false)
        })
        .collect();
    paths.sort();
    Ok(paths)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    if chesseye::core::init_with_level(level).is_err() {
        eprintln!("logger already installed");
    }

    let network = match (&cli.master_addr, &cli.self_addr) {
        (Some(master), Some(own)) => Some(CommParams {
            master_addr: master.clone(),
            self_addr: own.clone(),
            master_to_slave_port: cli.master_to_slave_port,
            slave_to_master_port: cli.slave_to_master_port,
            buffer_size: cli.buffer_size,
        }),
        _ => None,
    };
    // a bad selection must be reported without launching a worker for it
    let protocol = match Protocol::from_selector(&cli.protocol, network) {
        Ok(p) => p,
        Err(err) => {
            log::error!("{err}; no communication worker launched");
            return ExitCode::from(2);
        }
    };

    let paths = match collect_frame_paths(&cli.input) {
        Ok(p) if !p.is_empty() => p,
        Ok(_) => {
            log::error!("no frames found under {}", cli.input.display());
            return ExitCode::FAILURE;
        }
        Err(err) => {
            log::error!("cannot read {}: {err}", cli.input.display());
            return ExitCode::FAILURE;
        }
    };

    if let Some(dir) = &cli.out_dir {
        if let Err(err) = fs::create_dir_all(dir) {
            log::error!("cannot create {}: {err}", dir.display());
            return ExitCode::FAILURE;
        }
    }

    let params = PipelineParams {
        board: BoardParams {
            border_px: cli.border,
            ..BoardParams::default()
        },
        classify: ClassifyParams {
            threshold: cli.threshold,
            min_square_area: f64::from(cli.min_square_area.min(3000)),
            ..ClassifyParams::default()
        },
    };
    let tunables = Tunables::new(&params.classify);

    let channel = Arc::new(SnapshotChannel::new());
    let shutdown = ShutdownFlag::new();
    {
        let shutdown = shutdown.clone();
        if let Err(err) = ctrlc::set_handler(move || shutdown.request()) {
            log::warn!("ctrl-c handler unavailable: {err}");
        }
    }

    let worker = {
        let channel = Arc::clone(&channel);
        let shutdown = shutdown.clone();
        thread::spawn(move || run_comm_worker(channel, shutdown, protocol, LogSink::new()))
    };

    let limit = cli.max_frames.unwrap_or(usize::MAX);
    let frames = paths
        .iter()
        .filter_map(|p| match chesseye::detect::load_frame(p) {
            Ok(frame) => Some(frame),
            Err(err) => {
                log::warn!("skipping {}: {err}", p.display());
                None
            }
        })
        .take(limit);

    let mut summaries = Vec::new();
    let stats = run_vision_loop(
        frames,
        &channel,
        &shutdown,
        &params,
        &tunables,
        &[],
        |n, outcome| match outcome {
            Ok(cycle) => {
                let c = &cycle.classification;
                log::info!(
                    "frame {n}: {} ({} squares, {} circles)",
                    c.presence.caption(),
                    c.square_count,
                    c.circle_count
                );
                summaries.push(CycleSummary {
                    frame: n,
                    caption: c.presence.caption(),
                    squares: c.square_count,
                    circles: c.circle_count,
                });
                if let Some(dir) = &cli.out_dir {
                    let annotated = dir.join(format!("frame_{n:05}_annotated.png"));
                    if let Err(err) = chesseye::detect::save_frame(&c.annotated, &annotated) {
                        log::warn!("cannot write {}: {err}", annotated.display());
                    }
                    let edges = dir.join(format!("frame_{n:05}_edges.png"));
                    if let Err(err) = chesseye::detect::save_gray(&c.edges, &edges) {
                        log::warn!("cannot write {}: {err}", edges.display());
                    }
                }
            }
            Err(err) => log::info!("frame {n}: {err}"),
        },
    );

    if let Some(dir) = &cli.out_dir {
        let path = dir.join("summary.json");
        match serde_json::to_string_pretty(&summaries) {
            Ok(json) => {
                if let Err(err) = fs::write(&path, json) {
                    log::warn!("cannot write {}: {err}", path.display());
                }
            }
            Err(err) => log::warn!("cannot serialize run summary: {err}"),
        }
    }

    shutdown.request();
    if worker.join().is_err() {
        log::error!("communication worker panicked");
        return ExitCode::FAILURE;
    }

    log::info!(
        "done: {} frames, {} published, {} skipped",
        stats.frames,
        stats.published,
        stats.skipped
    );
    ExitCode::SUCCESS
}
