use embassy_time::{with_timeout, Timer};
use embedded_io_async::Read;

use super::{
    config::{CAPTURE_IDLE, CAPTURE_READ_TIMEOUT, SCRATCH_LEN},
    ring::RingBuffer,
    stats::BridgeStats,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptureStep {
    Captured { bytes: usize, evicted: usize },
    Idle,
    ReadError,
}

/// Drains the serial receiver into `ring` for the lifetime of the process.
///
/// Session start and stop never reach this loop; a client that connects
/// late still finds up to `N` bytes of recent history.
pub async fn run_capture<R: Read, const N: usize>(
    rx: &mut R,
    ring: &RingBuffer<N>,
    stats: &BridgeStats,
) -> ! {
    let mut scratch = [0u8; SCRATCH_LEN];
    log::info!("bridge: capture daemon started cache={}", ring.capacity());

    loop {
        capture_step(rx, ring, stats, &mut scratch).await;
    }
}

/// One bounded read from the serial receiver.
pub async fn capture_step<R: Read, const N: usize>(
    rx: &mut R,
    ring: &RingBuffer<N>,
    stats: &BridgeStats,
    scratch: &mut [u8],
) -> CaptureStep {
    match with_timeout(CAPTURE_READ_TIMEOUT, rx.read(scratch)).await {
        Ok(Ok(n)) if n > 0 => {
            let outcome = ring.write(&scratch[..n]);
            stats.record_capture(n, outcome.evicted);
            CaptureStep::Captured {
                bytes: n,
                evicted: outcome.evicted,
            }
        }
        Ok(Ok(_)) | Err(_) => {
            Timer::after(CAPTURE_IDLE).await;
            CaptureStep::Idle
        }
        Ok(Err(err)) => {
            stats.record_serial_read_error();
            log::warn!("bridge: serial read err={:?}", err);
            Timer::after(CAPTURE_IDLE).await;
            CaptureStep::ReadError
        }
    }
}
