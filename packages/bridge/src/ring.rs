use core::cell::RefCell;

use embassy_sync::blocking_mutex::{raw::CriticalSectionRawMutex, Mutex};

/// Result of a single [`RingBuffer::write`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WriteOutcome {
    /// Input length. A write always accepts everything it is given.
    pub stored: usize,
    /// Bytes that are no longer retrievable because of this write, counting
    /// both older buffered bytes pushed out and the head of an oversized
    /// input that never fit.
    pub evicted: usize,
}

struct RingState<const N: usize> {
    buf: [u8; N],
    head: usize,
    tail: usize,
    count: usize,
}

/// Fixed-capacity byte FIFO that overwrites the oldest bytes when full.
///
/// Writes and reads are serialized by one critical-section lock that is held
/// only for the copy, so both sides may run from different tasks. Neither
/// operation blocks or fails.
pub struct RingBuffer<const N: usize> {
    state: Mutex<CriticalSectionRawMutex, RefCell<RingState<N>>>,
}

impl<const N: usize> RingBuffer<N> {
    const NON_ZERO: () = assert!(N > 0, "ring buffer capacity must be non-zero");

    pub const fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::NON_ZERO;
        Self {
            state: Mutex::new(RefCell::new(RingState {
                buf: [0; N],
                head: 0,
                tail: 0,
                count: 0,
            })),
        }
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn len(&self) -> usize {
        self.state.lock(|state| state.borrow().count)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn write(&self, data: &[u8]) -> WriteOutcome {
        if data.is_empty() {
            return WriteOutcome::default();
        }

        let mut outcome = WriteOutcome {
            stored: data.len(),
            evicted: 0,
        };
        // Only the newest N bytes of an oversized write can survive it.
        let data = if data.len() > N {
            outcome.evicted = data.len() - N;
            &data[data.len() - N..]
        } else {
            data
        };

        self.state.lock(|state| {
            let mut state = state.borrow_mut();
            let state = &mut *state;
            let len = data.len();
            let first = len.min(N - state.head);
            state.buf[state.head..state.head + first].copy_from_slice(&data[..first]);
            state.buf[..len - first].copy_from_slice(&data[first..]);
            state.head = (state.head + len) % N;

            let total = state.count + len;
            if total > N {
                let overflow = total - N;
                state.tail = (state.tail + overflow) % N;
                state.count = N;
                outcome.evicted += overflow;
            } else {
                state.count = total;
            }
        });

        outcome
    }

    /// Moves up to `out.len()` of the oldest bytes into `out`.
    pub fn read(&self, out: &mut [u8]) -> usize {
        if out.is_empty() {
            return 0;
        }

        self.state.lock(|state| {
            let mut state = state.borrow_mut();
            let state = &mut *state;
            let n = out.len().min(state.count);
            let first = n.min(N - state.tail);
            out[..first].copy_from_slice(&state.buf[state.tail..state.tail + first]);
            out[first..n].copy_from_slice(&state.buf[..n - first]);
            state.tail = (state.tail + n) % N;
            state.count -= n;
            n
        })
    }
}

impl<const N: usize> Default for RingBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}
