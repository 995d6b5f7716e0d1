use crate::snapshot::{PieceCell, WorldSnapshot, BOARD_SIZE};
use chesseye_core::RgbImage;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// One tagged component of a published snapshot.
///
/// Five entries together form one consistent snapshot; the wire labels are
/// part of the exchange contract with the master device.
#[derive(Clone, Debug)]
pub enum SnapshotEntry {
    Image(RgbImage),
    Pieces(Box<[[PieceCell; BOARD_SIZE]; BOARD_SIZE]>),
    Board(Box<[[f32; BOARD_SIZE]; BOARD_SIZE]>),
    PieceInventory(Vec<u32>),
    ArmTarget(Vec<f64>),
}

impl SnapshotEntry {
    pub fn tag(&self) -> &'static str {
        match self {
            SnapshotEntry::Image(_) => "image",
            SnapshotEntry::Pieces(_) => "pieces",
            SnapshotEntry::Board(_) => "board",
            SnapshotEntry::PieceInventory(_) => "piece",
            SnapshotEntry::ArmTarget(_) => "arm",
        }
    }
}

/// Single-slot mailbox between the vision loop and the communication worker.
///
/// The producer replaces, never queues: each publish drains whatever is still
/// in the channel and refills it with the five entries of the new snapshot,
/// all under one lock hold. A reader therefore observes either a complete
/// snapshot or nothing, and an idle consumer costs a bounded five entries, not
/// an unbounded backlog.
#[derive(Debug, Default)]
pub struct SnapshotChannel {
    entries: Mutex<VecDeque<SnapshotEntry>>,
}

impl SnapshotChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Producer side: replace the channel contents with `snapshot`.
    pub fn publish(&self, snapshot: &WorldSnapshot) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.clear();
        entries.push_back(SnapshotEntry::Image(snapshot.image.clone()));
        entries.push_back(SnapshotEntry::Pieces(snapshot.pieces.clone()));
        entries.push_back(SnapshotEntry::Board(snapshot.board.clone()));
        entries.push_back(SnapshotEntry::PieceInventory(
            snapshot.piece_inventory.clone(),
        ));
        entries.push_back(SnapshotEntry::ArmTarget(snapshot.arm_target.clone()));
    }

    /// Consumer side: drain the channel and reassemble one snapshot.
    ///
    /// Returns `None` when nothing has been published since the last consume.
    pub fn consume(&self) -> Option<WorldSnapshot> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        if entries.is_empty() {
            return None;
        }

        let mut snapshot = WorldSnapshot::new();
        for entry in entries.drain(..) {
            match entry {
                SnapshotEntry::Image(v) => snapshot.image = v,
                SnapshotEntry::Pieces(v) => snapshot.pieces = v,
                SnapshotEntry::Board(v) => snapshot.board = v,
                SnapshotEntry::PieceInventory(v) => snapshot.piece_inventory = v,
                SnapshotEntry::ArmTarget(v) => snapshot.arm_target = v,
            }
        }
        Some(snapshot)
    }

    /// Entry count; a populated channel always holds exactly five.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Tags currently present, in channel order. Diagnostic helper.
    pub fn tags(&self) -> Vec<&'static str> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(SnapshotEntry::tag)
            .collect()
    }
}

/// Cooperative shutdown token checked once per cycle by both workers.
#[derive(Clone, Debug, Default)]
pub struct ShutdownFlag {
    requested: Arc<AtomicBool>,
}

impl ShutdownFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }
}
