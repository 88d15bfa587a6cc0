use core::sync::atomic::{AtomicBool, Ordering};

use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, channel::Channel, signal::Signal};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Network -> serial.
    Downlink,
    /// Ring buffer -> network.
    Uplink,
}

impl Direction {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Downlink => "downlink",
            Self::Uplink => "uplink",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExitReason {
    PeerClosed,
    ReceiveFailed,
    SendFailed,
    SerialWriteFailed,
    Cancelled,
    ScratchUnavailable,
}

impl ExitReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PeerClosed => "peer_closed",
            Self::ReceiveFailed => "receive_failed",
            Self::SendFailed => "send_failed",
            Self::SerialWriteFailed => "serial_write_failed",
            Self::Cancelled => "cancelled",
            Self::ScratchUnavailable => "scratch_unavailable",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ForwarderExit {
    pub direction: Direction,
    pub reason: ExitReason,
    pub bytes: u32,
}

/// Shared state of one accepted connection and its two forwarders.
///
/// The running flag only ever goes from true to false. Each forwarder
/// reports its exit on the rendezvous exactly once, through an
/// [`ExitSignal`], and the supervisor waits for the first report only.
///
/// Cancellation contract: [`BridgeSession::cancel`] is the session's
/// "close the shared handle" operation. Every await in a forwarder (network
/// I/O, serial writes, the idle sleep) selects against its cancellation
/// signal and returns promptly once it fires.
pub struct BridgeSession {
    running: AtomicBool,
    exits: Channel<CriticalSectionRawMutex, ForwarderExit, 2>,
    downlink_cancel: Signal<CriticalSectionRawMutex, ()>,
    uplink_cancel: Signal<CriticalSectionRawMutex, ()>,
}

impl BridgeSession {
    pub const fn new() -> Self {
        Self {
            running: AtomicBool::new(true),
            exits: Channel::new(),
            downlink_cancel: Signal::new(),
            uplink_cancel: Signal::new(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
    }

    /// Stops the session and wakes both forwarders wherever they are parked.
    pub fn cancel(&self) {
        self.stop();
        self.downlink_cancel.signal(());
        self.uplink_cancel.signal(());
    }

    pub async fn cancelled(&self, direction: Direction) {
        match direction {
            Direction::Downlink => self.downlink_cancel.wait().await,
            Direction::Uplink => self.uplink_cancel.wait().await,
        }
    }

    pub fn exit_signal(&self, direction: Direction) -> ExitSignal<'_> {
        ExitSignal {
            session: self,
            direction,
            bytes: 0,
            sent: false,
        }
    }

    pub async fn first_exit(&self) -> ForwarderExit {
        self.exits.receive().await
    }

    pub fn try_next_exit(&self) -> Option<ForwarderExit> {
        self.exits.try_receive().ok()
    }
}

impl Default for BridgeSession {
    fn default() -> Self {
        Self::new()
    }
}

/// A forwarder's single rendezvous report.
///
/// Dropping the signal without calling [`ExitSignal::finish`] still reports
/// the exit, as [`ExitReason::Cancelled`].
pub struct ExitSignal<'a> {
    session: &'a BridgeSession,
    direction: Direction,
    bytes: u32,
    sent: bool,
}

impl ExitSignal<'_> {
    pub fn add_bytes(&mut self, bytes: usize) {
        self.bytes = self
            .bytes
            .saturating_add(bytes.min(u32::MAX as usize) as u32);
    }

    pub fn finish(mut self, reason: ExitReason) -> ForwarderExit {
        self.send(reason)
    }

    fn send(&mut self, reason: ExitReason) -> ForwarderExit {
        let exit = ForwarderExit {
            direction: self.direction,
            reason,
            bytes: self.bytes,
        };
        if !self.sent {
            self.sent = true;
            self.session.stop();
            // Capacity two, one report per direction: never full.
            let _ = self.session.exits.try_send(exit);
        }
        exit
    }
}

impl Drop for ExitSignal<'_> {
    fn drop(&mut self) {
        if !self.sent {
            self.send(ExitReason::Cancelled);
        }
    }
}
