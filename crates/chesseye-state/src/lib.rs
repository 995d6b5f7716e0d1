//! World-state publishing: the vision loop owns an authoritative snapshot of
//! {camera image, piece grid, board grid, piece inventory, arm target} and
//! hands fully-replaced copies to the communication worker through a
//! lock-guarded mailbox channel.

mod channel;
mod comm;
mod snapshot;

pub use channel::{ShutdownFlag, SnapshotChannel, SnapshotEntry};
pub use comm::{run_comm_worker, CommParams, LogSink, Protocol, ProtocolError, SinkError, SnapshotSink};
pub use snapshot::{PieceCell, WorldSnapshot, BOARD_SIZE};
