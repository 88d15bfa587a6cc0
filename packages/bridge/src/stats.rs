use core::sync::atomic::{AtomicU32, Ordering};

/// Lock-free bridge counters, shared by reference between tasks.
pub struct BridgeStats {
    captured_bytes: AtomicU32,
    evicted_bytes: AtomicU32,
    serial_read_errors: AtomicU32,
    downlink_bytes: AtomicU32,
    uplink_bytes: AtomicU32,
    sessions: AtomicU32,
    accept_errors: AtomicU32,
    scratch_unavailable: AtomicU32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub captured_bytes: u32,
    pub evicted_bytes: u32,
    pub serial_read_errors: u32,
    pub downlink_bytes: u32,
    pub uplink_bytes: u32,
    pub sessions: u32,
    pub accept_errors: u32,
    pub scratch_unavailable: u32,
}

impl BridgeStats {
    pub const fn new() -> Self {
        Self {
            captured_bytes: AtomicU32::new(0),
            evicted_bytes: AtomicU32::new(0),
            serial_read_errors: AtomicU32::new(0),
            downlink_bytes: AtomicU32::new(0),
            uplink_bytes: AtomicU32::new(0),
            sessions: AtomicU32::new(0),
            accept_errors: AtomicU32::new(0),
            scratch_unavailable: AtomicU32::new(0),
        }
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            captured_bytes: self.captured_bytes.load(Ordering::Relaxed),
            evicted_bytes: self.evicted_bytes.load(Ordering::Relaxed),
            serial_read_errors: self.serial_read_errors.load(Ordering::Relaxed),
            downlink_bytes: self.downlink_bytes.load(Ordering::Relaxed),
            uplink_bytes: self.uplink_bytes.load(Ordering::Relaxed),
            sessions: self.sessions.load(Ordering::Relaxed),
            accept_errors: self.accept_errors.load(Ordering::Relaxed),
            scratch_unavailable: self.scratch_unavailable.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn record_capture(&self, captured: usize, evicted: usize) {
        add_saturating(&self.captured_bytes, captured);
        if evicted > 0 {
            add_saturating(&self.evicted_bytes, evicted);
        }
    }

    pub(crate) fn record_serial_read_error(&self) {
        self.serial_read_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_downlink(&self, bytes: usize) {
        add_saturating(&self.downlink_bytes, bytes);
    }

    pub(crate) fn record_uplink(&self, bytes: usize) {
        add_saturating(&self.uplink_bytes, bytes);
    }

    pub(crate) fn record_session(&self) -> u32 {
        self.sessions.fetch_add(1, Ordering::Relaxed).wrapping_add(1)
    }

    pub(crate) fn record_accept_error(&self) {
        self.accept_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_scratch_unavailable(&self) {
        self.scratch_unavailable.fetch_add(1, Ordering::Relaxed);
    }
}

impl Default for BridgeStats {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsSnapshot {
    pub fn log(&self) {
        log::info!(
            "bridge: stats captured={} evicted={} serial_errs={} downlink={} uplink={} sessions={} accept_errs={} scratch_unavailable={}",
            self.captured_bytes,
            self.evicted_bytes,
            self.serial_read_errors,
            self.downlink_bytes,
            self.uplink_bytes,
            self.sessions,
            self.accept_errors,
            self.scratch_unavailable
        );
    }
}

fn add_saturating(counter: &AtomicU32, value: usize) {
    let value = value.min(u32::MAX as usize) as u32;
    let _ = counter.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
        Some(current.saturating_add(value))
    });
}
