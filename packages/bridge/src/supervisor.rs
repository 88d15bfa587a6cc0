use embassy_futures::join::join;
use embassy_time::{Instant, Timer};
use embedded_io_async::Write;

use super::{
    config::ACCEPT_RETRY,
    forward::{downlink, uplink},
    ring::RingBuffer,
    scratch::ScratchPool,
    session::{BridgeSession, ForwarderExit},
    stats::BridgeStats,
    transport::{Acceptor, Connection},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SupervisorState {
    Listening,
    SessionActive,
    Teardown,
}

impl SupervisorState {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Listening => "listening",
            Self::SessionActive => "session_active",
            Self::Teardown => "teardown",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionReport {
    pub seq: u32,
    /// Forwarder whose exit started teardown.
    pub first: ForwarderExit,
    /// The other forwarder, joined before the connection was closed.
    pub second: Option<ForwarderExit>,
    pub duration_ms: u32,
}

/// Accepts one client at a time and runs its forwarder pair to completion.
///
/// Owns the serial transmitter so only the live session's downlink can write
/// to the UART.
pub struct SessionSupervisor<'a, S, const N: usize> {
    ring: &'a RingBuffer<N>,
    stats: &'a BridgeStats,
    scratch: &'a ScratchPool,
    serial_tx: S,
    state: SupervisorState,
}

impl<'a, S: Write, const N: usize> SessionSupervisor<'a, S, N> {
    pub fn new(
        ring: &'a RingBuffer<N>,
        stats: &'a BridgeStats,
        scratch: &'a ScratchPool,
        serial_tx: S,
    ) -> Self {
        Self {
            ring,
            stats,
            scratch,
            serial_tx,
            state: SupervisorState::Listening,
        }
    }

    pub fn state(&self) -> SupervisorState {
        self.state
    }

    pub async fn run<A: Acceptor>(&mut self, acceptor: &mut A) -> ! {
        loop {
            match self.serve_one(acceptor).await {
                Ok(report) => log_report(&report),
                Err(err) => {
                    self.stats.record_accept_error();
                    log::error!("bridge: accept err={:?}", err);
                    Timer::after(ACCEPT_RETRY).await;
                }
            }
        }
    }

    /// Accepts one connection and runs it through session and teardown.
    pub async fn serve_one<A: Acceptor>(
        &mut self,
        acceptor: &mut A,
    ) -> Result<SessionReport, A::Error> {
        let Self {
            ring,
            stats,
            scratch,
            serial_tx,
            state,
        } = self;
        let (ring, stats, scratch) = (*ring, *stats, *scratch);

        log::info!("bridge: waiting for client");
        let mut connection = acceptor.accept().await?;
        let seq = stats.record_session();
        let started_at = Instant::now();
        transition(state, SupervisorState::SessionActive, "accept");

        let session = BridgeSession::new();
        let first = {
            let (net_rx, net_tx) = connection.split();
            let forwarders = join(
                downlink(&session, net_rx, serial_tx, &scratch.downlink, stats),
                uplink(&session, ring, net_tx, &scratch.uplink, stats),
            );
            let teardown = async {
                let first = session.first_exit().await;
                transition(state, SupervisorState::Teardown, first.direction.as_str());
                session.cancel();
                first
            };
            let (_, first) = join(forwarders, teardown).await;
            first
        };
        let second = session.try_next_exit();
        if second.is_none() {
            log::error!("bridge: session seq={} second forwarder did not report", seq);
        }

        connection.close().await;
        drop(connection);
        transition(state, SupervisorState::Listening, "closed");

        Ok(SessionReport {
            seq,
            first,
            second,
            duration_ms: started_at.elapsed().as_millis().min(u32::MAX as u64) as u32,
        })
    }
}

fn transition(state: &mut SupervisorState, to: SupervisorState, trigger: &str) {
    log::info!(
        "bridge: state {}->{} trigger={}",
        state.as_str(),
        to.as_str(),
        trigger
    );
    *state = to;
}

fn log_report(report: &SessionReport) {
    let (second_dir, second_reason, second_bytes) = match report.second {
        Some(exit) => (exit.direction.as_str(), exit.reason.as_str(), exit.bytes),
        None => ("none", "none", 0),
    };
    log::info!(
        "bridge: session ended seq={} first={}/{} bytes={} second={}/{} bytes={} duration_ms={}",
        report.seq,
        report.first.direction.as_str(),
        report.first.reason.as_str(),
        report.first.bytes,
        second_dir,
        second_reason,
        second_bytes,
        report.duration_ms
    );
}
