use embassy_futures::select::{select, Either};
use embassy_time::Timer;
use embedded_io_async::{Read, Write};

use super::{
    config::UPLINK_IDLE,
    ring::RingBuffer,
    scratch::ScratchSlot,
    session::{BridgeSession, Direction, ExitReason, ForwarderExit},
    stats::BridgeStats,
};

/// Network -> serial. Received bytes go straight to the serial transmitter,
/// never through the ring buffer.
pub async fn downlink<R: Read, S: Write>(
    session: &BridgeSession,
    mut net_rx: R,
    serial_tx: &mut S,
    scratch: &ScratchSlot,
    stats: &BridgeStats,
) -> ForwarderExit {
    let mut exit = session.exit_signal(Direction::Downlink);
    let mut buf = match scratch.try_acquire() {
        Ok(buf) => buf,
        Err(_) => {
            stats.record_scratch_unavailable();
            log::error!("bridge: downlink scratch unavailable");
            return exit.finish(ExitReason::ScratchUnavailable);
        }
    };
    log::info!("bridge: downlink started");

    let mut reason = ExitReason::Cancelled;
    while session.is_running() {
        let received = select(
            net_rx.read(&mut buf[..]),
            session.cancelled(Direction::Downlink),
        )
        .await;
        let n = match received {
            Either::First(Ok(0)) => {
                log::info!("bridge: downlink peer closed");
                reason = ExitReason::PeerClosed;
                break;
            }
            Either::First(Ok(n)) => n,
            Either::First(Err(err)) => {
                if session.is_running() {
                    log::warn!("bridge: downlink recv err={:?}", err);
                }
                reason = ExitReason::ReceiveFailed;
                break;
            }
            Either::Second(()) => break,
        };

        match select(
            serial_tx.write_all(&buf[..n]),
            session.cancelled(Direction::Downlink),
        )
        .await
        {
            Either::First(Ok(())) => {
                exit.add_bytes(n);
                stats.record_downlink(n);
            }
            Either::First(Err(err)) => {
                log::warn!("bridge: downlink serial write err={:?}", err);
                reason = ExitReason::SerialWriteFailed;
                break;
            }
            Either::Second(()) => break,
        }
    }

    drop(buf);
    exit.finish(reason)
}

/// Ring buffer -> network. Polls the ring and sleeps briefly when it is empty.
pub async fn uplink<W: Write, const N: usize>(
    session: &BridgeSession,
    ring: &RingBuffer<N>,
    mut net_tx: W,
    scratch: &ScratchSlot,
    stats: &BridgeStats,
) -> ForwarderExit {
    let mut exit = session.exit_signal(Direction::Uplink);
    let mut buf = match scratch.try_acquire() {
        Ok(buf) => buf,
        Err(_) => {
            stats.record_scratch_unavailable();
            log::error!("bridge: uplink scratch unavailable");
            return exit.finish(ExitReason::ScratchUnavailable);
        }
    };
    log::info!("bridge: uplink started backlog={}", ring.len());

    let mut reason = ExitReason::Cancelled;
    while session.is_running() {
        let n = ring.read(&mut buf[..]);
        if n == 0 {
            match select(Timer::after(UPLINK_IDLE), session.cancelled(Direction::Uplink)).await {
                Either::First(()) => continue,
                Either::Second(()) => break,
            }
        }

        match select(
            net_tx.write_all(&buf[..n]),
            session.cancelled(Direction::Uplink),
        )
        .await
        {
            Either::First(Ok(())) => {
                exit.add_bytes(n);
                stats.record_uplink(n);
            }
            Either::First(Err(err)) => {
                log::warn!("bridge: uplink send err={:?}", err);
                reason = ExitReason::SendFailed;
                break;
            }
            Either::Second(()) => break,
        }
    }

    drop(buf);
    exit.finish(reason)
}
