use chesseye_core::RgbImage;

/// Cells per board side.
pub const BOARD_SIZE: usize = 8;

/// Per-cell color/occupancy triple.
pub type PieceCell = [f32; 3];

/// One complete world state, fully replaced on every publish.
///
/// The vision loop is the only writer; consumers receive value copies and can
/// never observe a partially updated snapshot.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WorldSnapshot {
    /// Latest annotated camera frame.
    pub image: RgbImage,
    /// 8x8 per-cell color/occupancy grid.
    pub pieces: Box<[[PieceCell; BOARD_SIZE]; BOARD_SIZE]>,
    /// 8x8 scalar board grid.
    pub board: Box<[[f32; BOARD_SIZE]; BOARD_SIZE]>,
    /// Identifiers of located pieces.
    pub piece_inventory: Vec<u32>,
    /// Opaque arm joint/position targets, passed through untouched.
    pub arm_target: Vec<f64>,
}

impl WorldSnapshot {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_snapshot_is_zeroed() {
        let snap = WorldSnapshot::new();
        assert!(snap.image.is_empty());
        assert!(snap.piece_inventory.is_empty());
        assert!(snap.arm_target.is_empty());
        assert_eq!(snap.pieces[3][4], [0.0, 0.0, 0.0]);
        assert_eq!(snap.board[7][7], 0.0);
    }
}
