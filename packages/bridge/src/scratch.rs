use embassy_sync::{
    blocking_mutex::raw::CriticalSectionRawMutex,
    mutex::{Mutex, MutexGuard},
};

use super::config::SCRATCH_LEN;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScratchError {
    Unavailable,
}

/// Transfer buffer that a forwarder borrows for the duration of one session.
///
/// Acquisition never waits: a slot still held elsewhere is reported as
/// [`ScratchError::Unavailable`] and the caller gives up. The guard returns
/// the slot on drop, on every exit path.
pub struct ScratchSlot {
    data: Mutex<CriticalSectionRawMutex, [u8; SCRATCH_LEN]>,
}

pub type ScratchGuard<'a> = MutexGuard<'a, CriticalSectionRawMutex, [u8; SCRATCH_LEN]>;

impl ScratchSlot {
    pub const fn new() -> Self {
        Self {
            data: Mutex::new([0; SCRATCH_LEN]),
        }
    }

    pub fn try_acquire(&self) -> Result<ScratchGuard<'_>, ScratchError> {
        self.data.try_lock().map_err(|_| ScratchError::Unavailable)
    }
}

impl Default for ScratchSlot {
    fn default() -> Self {
        Self::new()
    }
}

/// One scratch slot per forwarder direction.
pub struct ScratchPool {
    pub downlink: ScratchSlot,
    pub uplink: ScratchSlot,
}

impl ScratchPool {
    pub const fn new() -> Self {
        Self {
            downlink: ScratchSlot::new(),
            uplink: ScratchSlot::new(),
        }
    }
}

impl Default for ScratchPool {
    fn default() -> Self {
        Self::new()
    }
}
