//! High-level facade crate for the `chesseye-*` workspace.
//!
//! This crate provides:
//! - stable, convenient re-exports of the underlying perception crates
//! - the end-to-end frame pipeline (locate -> rectify -> classify) and the
//!   vision loop that publishes world snapshots for the communication worker
//! - (feature-gated) `image` crate integration for loading and saving frames.
//!
//! ## Quickstart
//!
//! ```no_run
//! use chesseye::pipeline::{process_frame, PipelineParams};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let frame = chesseye::detect::load_frame("frame.png")?;
//! let cycle = process_frame(&frame, &PipelineParams::default())?;
//! println!("{}", cycle.classification.presence.caption());
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `chesseye::core`: contour tracing, polygon tools, homographies, images.
//! - `chesseye::board`: board outline extraction and top-down rectification.
//! - `chesseye::classify`: presence classification and piece circle detection.
//! - `chesseye::state`: snapshot channel, communication worker, shutdown.
//! - `chesseye::pipeline`: per-frame processing and the publishing loop.
//! - `chesseye::detect` (feature `image`): frame I/O via the `image` crate.

pub use chesseye_board as board;
pub use chesseye_classify as classify;
pub use chesseye_core as core;
pub use chesseye_state as state;

pub use chesseye_board::{BoardParams, OrderedCorners};
pub use chesseye_classify::{Classification, ClassifyParams, Presence, Tunables};
pub use chesseye_state::{Protocol, ShutdownFlag, SnapshotChannel, WorldSnapshot};

pub mod pipeline;

#[cfg(feature = "image")]
pub mod detect;
