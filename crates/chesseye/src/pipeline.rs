//! End-to-end frame processing and the world-state publishing loop.

use chesseye_board::{
    adaptive_threshold_mean, locate_board, normalize_board, BoardParams, OrderedCorners,
};
use chesseye_classify::{classify, Classification, ClassifyParams, Tunables};
use chesseye_core::{find_contours, RgbImage};
use chesseye_state::{ShutdownFlag, SnapshotChannel, WorldSnapshot, BOARD_SIZE};

/// Window radius for the full-frame adaptive threshold (a 15x15 window).
const ADAPTIVE_RADIUS: usize = 7;
/// Offset subtracted from the local mean before comparison.
const ADAPTIVE_OFFSET: i32 = 0;

/// Per-cycle failures. Every one of these means "this frame produced no
/// classification"; the loop logs them and moves on to the next frame.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleError {
    #[error("empty camera frame")]
    EmptyFrame,
    #[error("no board outline found in frame")]
    BoardNotFound,
    #[error("board corners admit no perspective rectification")]
    DegenerateGeometry,
}

/// Combined configuration for one processing cycle.
#[derive(Clone, Copy, Debug, Default)]
pub struct PipelineParams {
    pub board: BoardParams,
    pub classify: ClassifyParams,
}

/// Everything one successful cycle produces.
#[derive(Clone, Debug)]
pub struct CycleOutput {
    /// Board outline corners in frame coordinates.
    pub corners: OrderedCorners,
    /// Rectified top-down board view, border included.
    pub board: RgbImage,
    pub classification: Classification,
}

/// Run one full perception cycle on a camera frame: binarize, trace contours,
/// pick the board outline, rectify it and classify the result.
pub fn process_frame(
    frame: &RgbImage,
    params: &PipelineParams,
) -> Result<CycleOutput, CycleError> {
    if frame.is_empty() {
        return Err(CycleError::EmptyFrame);
    }

    let gray = frame.to_gray();
    let mask = adaptive_threshold_mean(&gray.as_view(), ADAPTIVE_RADIUS, ADAPTIVE_OFFSET);
    let contours = find_contours(&mask.as_view());

    let corners = locate_board(&contours, frame.width, frame.height, &params.board)
        .ok_or(CycleError::BoardNotFound)?;
    let board = normalize_board(&corners, &frame.as_view(), &params.board)
        .ok_or(CycleError::DegenerateGeometry)?;

    let classification = classify(&board, &params.classify);
    log::debug!(
        "cycle: {} ({} squares, {} circles)",
        classification.presence.caption(),
        classification.square_count,
        classification.circle_count
    );

    Ok(CycleOutput {
        corners,
        board,
        classification,
    })
}

/// Fold a cycle result into a complete world snapshot.
///
/// Detected circles are binned into the 8x8 piece grid by their centers; each
/// occupied cell records occupancy plus the circle radius relative to one cell
/// width. Counted board cells fill the scalar board grid the same way. The
/// arm target passes through untouched.
pub fn snapshot_from_cycle(cycle: &CycleOutput, arm_target: &[f64]) -> WorldSnapshot {
    let view = &cycle.classification.annotated;
    let w = view.width.max(1) as f32;
    let h = view.height.max(1) as f32;
    let cell_w = w / BOARD_SIZE as f32;

    let bin = |x: f32, extent: f32| -> usize {
        let i = (x / extent * BOARD_SIZE as f32) as usize;
        i.min(BOARD_SIZE - 1)
    };

    let mut pieces = Box::new([[[0.0f32; 3]; BOARD_SIZE]; BOARD_SIZE]);
    let mut inventory = Vec::with_capacity(cycle.classification.circles.len());
    for (i, circle) in cycle.classification.circles.iter().enumerate() {
        let col = bin(circle.cx as f32, w);
        let row = bin(circle.cy as f32, h);
        pieces[row][col] = [1.0, circle.radius as f32 / cell_w, 0.0];
        inventory.push(i as u32 + 1);
    }

    let mut board = Box::new([[0.0f32; BOARD_SIZE]; BOARD_SIZE]);
    for square in &cycle.classification.squares {
        let col = bin(square.center.x, w);
        let row = bin(square.center.y, h);
        board[row][col] += 1.0;
    }

    WorldSnapshot {
        image: cycle.classification.annotated.clone(),
        pieces,
        board,
        piece_inventory: inventory,
        arm_target: arm_target.to_vec(),
    }
}

/// Counters for one vision loop run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoopStats {
    /// Frames pulled from the source.
    pub frames: u64,
    /// Snapshots handed to the channel (one per frame).
    pub published: u64,
    /// Frames that produced no classification.
    pub skipped: u64,
}

/// Drive the perception loop over a frame source.
///
/// Each cycle reads the live tunables, processes one frame, and publishes the
/// freshest known world state into the channel. Failed cycles keep the
/// previous state alive rather than going silent; the consumer always sees
/// something complete. Runs until the source is exhausted or shutdown is
/// requested, and invokes `on_cycle` after every frame.
pub fn run_vision_loop<I, F>(
    frames: I,
    channel: &SnapshotChannel,
    shutdown: &ShutdownFlag,
    params: &PipelineParams,
    tunables: &Tunables,
    arm_target: &[f64],
    mut on_cycle: F,
) -> LoopStats
where
    I: IntoIterator<Item = RgbImage>,
    F: FnMut(u64, &Result<CycleOutput, CycleError>),
{
    let mut stats = LoopStats::default();
    let mut current = WorldSnapshot {
        arm_target: arm_target.to_vec(),
        ..WorldSnapshot::new()
    };

    for frame in frames {
        if shutdown.is_requested() {
            log::info!("vision loop: shutdown requested");
            break;
        }
        stats.frames += 1;

        let cycle_params = PipelineParams {
            classify: tunables.apply(&params.classify),
            ..*params
        };
        let outcome = process_frame(&frame, &cycle_params);
        match &outcome {
            Ok(cycle) => current = snapshot_from_cycle(cycle, arm_target),
            Err(err) => {
                stats.skipped += 1;
                log::debug!("frame {} skipped: {err}", stats.frames);
            }
        }

        channel.publish(&current);
        stats.published += 1;
        on_cycle(stats.frames, &outcome);
    }

    log::info!(
        "vision loop done: {} frames, {} published, {} skipped",
        stats.frames,
        stats.published,
        stats.skipped
    );
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use chesseye_classify::{DetectedCircle, DetectedSquare, Presence};
    use chesseye_core::{GrayImage, Point2i};
    use nalgebra::Point2;

    fn classification_with(
        circles: Vec<DetectedCircle>,
        squares: Vec<DetectedSquare>,
        annotated: RgbImage,
    ) -> Classification {
        Classification {
            presence: Presence::Full,
            square_count: squares.len(),
            circle_count: circles.len(),
            squares,
            circles,
            annotated,
            edges: GrayImage::new(0, 0),
        }
    }

    fn cycle_with(classification: Classification) -> CycleOutput {
        let quad = [
            Point2i::new(0, 0),
            Point2i::new(10, 0),
            Point2i::new(10, 10),
            Point2i::new(0, 10),
        ];
        CycleOutput {
            corners: chesseye_board::order_corners(&quad),
            board: classification.annotated.clone(),
            classification,
        }
    }

    #[test]
    fn empty_frame_is_rejected() {
        let err = process_frame(&RgbImage::new(0, 0), &PipelineParams::default()).unwrap_err();
        assert_eq!(err, CycleError::EmptyFrame);
    }

    #[test]
    fn featureless_frame_has_no_board() {
        let frame = RgbImage::filled(120, 120, [200, 200, 200]);
        let err = process_frame(&frame, &PipelineParams::default()).unwrap_err();
        assert_eq!(err, CycleError::BoardNotFound);
    }

    #[test]
    fn circles_land_in_their_grid_cells() {
        // 160x160 annotated view, 20px grid cells
        let annotated = RgbImage::new(160, 160);
        let circles = vec![
            DetectedCircle {
                cx: 10,
                cy: 10,
                radius: 10,
            },
            DetectedCircle {
                cx: 150,
                cy: 90,
                radius: 14,
            },
        ];
        let cycle = cycle_with(classification_with(circles, Vec::new(), annotated));
        let snap = snapshot_from_cycle(&cycle, &[1.0, 2.0]);

        assert_eq!(snap.pieces[0][0][0], 1.0);
        assert_eq!(snap.pieces[4][7][0], 1.0);
        assert_eq!(snap.piece_inventory, vec![1, 2]);
        assert_eq!(snap.arm_target, vec![1.0, 2.0]);
        // untouched cells stay zero
        assert_eq!(snap.pieces[3][3], [0.0, 0.0, 0.0]);
    }

    #[test]
    fn square_centers_fill_the_board_grid() {
        let annotated = RgbImage::new(160, 160);
        let squares = vec![DetectedSquare {
            outline: Vec::new(),
            center: Point2::new(30.0, 30.0),
            area: 400.0,
        }];
        let cycle = cycle_with(classification_with(Vec::new(), squares, annotated));
        let snap = snapshot_from_cycle(&cycle, &[]);
        assert_eq!(snap.board[1][1], 1.0);
        assert_eq!(snap.board[0][0], 0.0);
    }

    #[test]
    fn loop_publishes_every_frame_and_counts_skips() {
        let channel = SnapshotChannel::new();
        let shutdown = ShutdownFlag::new();
        let params = PipelineParams::default();
        let tunables = Tunables::new(&params.classify);

        // two undecodable frames: both cycles fail, both still publish
        let frames = vec![RgbImage::new(0, 0), RgbImage::new(0, 0)];
        let mut seen = 0u64;
        let stats = run_vision_loop(
            frames,
            &channel,
            &shutdown,
            &params,
            &tunables,
            &[0.5],
            |_, outcome| {
                assert!(outcome.is_err());
                seen += 1;
            },
        );

        assert_eq!(seen, 2);
        assert_eq!(
            stats,
            LoopStats {
                frames: 2,
                published: 2,
                skipped: 2,
            }
        );
        // the channel holds one complete snapshot with the arm passthrough
        let snap = channel.consume().expect("published");
        assert_eq!(snap.arm_target, vec![0.5]);
    }

    #[test]
    fn loop_stops_on_shutdown() {
        let channel = SnapshotChannel::new();
        let shutdown = ShutdownFlag::new();
        shutdown.request();
        let params = PipelineParams::default();
        let tunables = Tunables::new(&params.classify);

        let frames = vec![RgbImage::new(0, 0); 10];
        let stats = run_vision_loop(
            frames,
            &channel,
            &shutdown,
            &params,
            &tunables,
            &[],
            |_, _| {},
        );
        assert_eq!(stats.frames, 0);
        assert!(channel.is_empty());
    }

    #[test]
    fn tunables_override_configured_threshold() {
        // loop reads the live controls, not the startup configuration
        let params = PipelineParams::default();
        let tunables = Tunables::new(&params.classify);
        tunables.set_threshold(100);
        let cycle_params = PipelineParams {
            classify: tunables.apply(&params.classify),
            ..params
        };
        assert_eq!(cycle_params.classify.threshold, 100);
        assert_eq!(cycle_params.board.border_px, params.board.border_px);
    }
}
