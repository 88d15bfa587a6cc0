use embassy_time::Duration;

pub const BRIDGE_TCP_PORT: u16 = 8888;
pub const UART_BAUD: u32 = 115_200;

/// Offline serial history kept for late clients.
pub const RING_CAPACITY: usize = 8 * 1024;
/// Single read/write transfer size used by every bridge task.
pub const SCRATCH_LEN: usize = 512;

// Short enough that the capture task never monopolizes the executor.
pub const CAPTURE_READ_TIMEOUT_MS: u64 = 20;
pub const CAPTURE_IDLE_MS: u64 = 10;
pub const UPLINK_IDLE_MS: u64 = 50;
pub const ACCEPT_RETRY_MS: u64 = 1_000;

pub(crate) const CAPTURE_READ_TIMEOUT: Duration = Duration::from_millis(CAPTURE_READ_TIMEOUT_MS);
pub(crate) const CAPTURE_IDLE: Duration = Duration::from_millis(CAPTURE_IDLE_MS);
pub(crate) const UPLINK_IDLE: Duration = Duration::from_millis(UPLINK_IDLE_MS);
pub(crate) const ACCEPT_RETRY: Duration = Duration::from_millis(ACCEPT_RETRY_MS);
