#![cfg_attr(not(test), no_std)]

//! TCP <-> UART bridge engine.
//!
//! Serial input is drained continuously into a lossy [`RingBuffer`] by the
//! capture daemon; each accepted TCP connection gets a forwarder pair
//! (network -> serial direct, ring -> network buffered) supervised by
//! [`SessionSupervisor`].

pub mod capture;
pub mod config;
pub mod forward;
pub mod ring;
pub mod scratch;
pub mod session;
pub mod stats;
pub mod supervisor;
pub mod transport;

#[cfg(test)]
mod test_support;

pub use capture::{capture_step, run_capture, CaptureStep};
pub use config::{BRIDGE_TCP_PORT, RING_CAPACITY, SCRATCH_LEN, UART_BAUD};
pub use ring::{RingBuffer, WriteOutcome};
pub use scratch::{ScratchError, ScratchPool, ScratchSlot};
pub use session::{BridgeSession, Direction, ExitReason, ForwarderExit};
pub use stats::{BridgeStats, StatsSnapshot};
pub use supervisor::{SessionReport, SessionSupervisor, SupervisorState};
pub use transport::{Acceptor, Connection};

/// Ring buffer sized for the firmware build.
pub type BridgeRing = RingBuffer<RING_CAPACITY>;
