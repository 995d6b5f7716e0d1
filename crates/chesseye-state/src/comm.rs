use crate::channel::{ShutdownFlag, SnapshotChannel};
use crate::snapshot::WorldSnapshot;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Network transport parameters, collected once at startup and frozen.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommParams {
    pub master_addr: String,
    pub self_addr: String,
    pub master_to_slave_port: u16,
    pub slave_to_master_port: u16,
    pub buffer_size: usize,
}

impl CommParams {
    /// Default exchange buffer size.
    pub const DEFAULT_BUFFER_SIZE: usize = 1024;
}

/// Which transport the communication worker should drive.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Protocol {
    /// TCP/IP master link with explicit addressing.
    Network(CommParams),
    /// On-board bus link; needs no further parameters here.
    Bus,
}

#[derive(thiserror::Error, Debug)]
pub enum ProtocolError {
    #[error("unrecognized communication protocol {selector:?} (expected \"network\" or \"bus\")")]
    UnknownSelector { selector: String },
    #[error("protocol \"network\" requires master/self addresses and both ports")]
    MissingNetworkParams,
}

impl Protocol {
    /// Resolve an operator's protocol selection. An unknown selector is a
    /// reported misconfiguration; the caller must not launch a worker for it.
    pub fn from_selector(
        selector: &str,
        network: Option<CommParams>,
    ) -> Result<Self, ProtocolError> {
        match selector.to_ascii_lowercase().as_str() {
            "network" | "tcp" | "tcpip" => network
                .map(Protocol::Network)
                .ok_or(ProtocolError::MissingNetworkParams),
            "bus" | "i2c" | "serial" => Ok(Protocol::Bus),
            other => Err(ProtocolError::UnknownSelector {
                selector: other.to_string(),
            }),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum SinkError {
    #[error("transport rejected snapshot: {0}")]
    Transport(String),
}

/// Opaque transport consuming world snapshots. The wire protocol behind it is
/// out of scope; the worker only guarantees that every forwarded snapshot is
/// complete and the most recent one available.
pub trait SnapshotSink: Send {
    fn forward(&mut self, snapshot: &WorldSnapshot) -> Result<(), SinkError>;
}

/// Diagnostic sink that logs snapshot summaries instead of moving bytes.
#[derive(Debug, Default)]
pub struct LogSink {
    forwarded: u64,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn forwarded(&self) -> u64 {
        self.forwarded
    }
}

impl SnapshotSink for LogSink {
    fn forward(&mut self, snapshot: &WorldSnapshot) -> Result<(), SinkError> {
        self.forwarded += 1;
        log::info!(
            "snapshot #{}: {}x{} frame, {} pieces, arm target {:?}",
            self.forwarded,
            snapshot.image.width,
            snapshot.image.height,
            snapshot.piece_inventory.len(),
            snapshot.arm_target
        );
        Ok(())
    }
}

const IDLE_POLL: Duration = Duration::from_millis(5);

/// Communication worker entry point.
///
/// Drains the exchange channel at its own pace and forwards every consumed
/// snapshot into the sink until shutdown is requested. Sink errors are logged
/// and the worker keeps running; a transient transport failure must not take
/// the process down.
pub fn run_comm_worker<S: SnapshotSink>(
    channel: Arc<SnapshotChannel>,
    shutdown: ShutdownFlag,
    protocol: Protocol,
    mut sink: S,
) {
    match &protocol {
        Protocol::Network(params) => log::info!(
            "communication worker up: network {} <-> {} (ports {}/{}, buffer {})",
            params.self_addr,
            params.master_addr,
            params.master_to_slave_port,
            params.slave_to_master_port,
            params.buffer_size
        ),
        Protocol::Bus => log::info!("communication worker up: bus"),
    }

    while !shutdown.is_requested() {
        match channel.consume() {
            Some(snapshot) => {
                if let Err(err) = sink.forward(&snapshot) {
                    log::warn!("snapshot forward failed: {err}");
                }
            }
            None => thread::sleep(IDLE_POLL),
        }
    }

    log::info!("communication worker shut down");
}
