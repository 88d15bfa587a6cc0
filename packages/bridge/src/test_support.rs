use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
    rc::Rc,
    vec::Vec,
};

use embedded_io_async::{ErrorKind, ErrorType, Read, Write};

use crate::transport::{Acceptor, Connection};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct MockError;

impl core::fmt::Display for MockError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("mock transport error")
    }
}

impl core::error::Error for MockError {}

impl embedded_io_async::Error for MockError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// What a [`ScriptedReader`] does once its chunks are used up.
#[derive(Clone, Copy, Debug)]
pub(crate) enum AfterScript {
    Eof,
    Pend,
    Fail,
}

pub(crate) struct ScriptedReader {
    chunks: VecDeque<Vec<u8>>,
    after: AfterScript,
}

impl ScriptedReader {
    pub(crate) fn new(chunks: &[&[u8]], after: AfterScript) -> Self {
        Self {
            chunks: chunks.iter().map(|chunk| chunk.to_vec()).collect(),
            after,
        }
    }
}

impl ErrorType for ScriptedReader {
    type Error = MockError;
}

impl Read for ScriptedReader {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, MockError> {
        if let Some(chunk) = self.chunks.front_mut() {
            let n = chunk.len().min(buf.len());
            buf[..n].copy_from_slice(&chunk[..n]);
            chunk.drain(..n);
            if chunk.is_empty() {
                self.chunks.pop_front();
            }
            return Ok(n);
        }
        match self.after {
            AfterScript::Eof => Ok(0),
            AfterScript::Pend => core::future::pending().await,
            AfterScript::Fail => Err(MockError),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum WriterMode {
    Record,
    Fail,
    Stall,
}

pub(crate) struct RecordingWriter {
    data: Rc<RefCell<Vec<u8>>>,
    mode: WriterMode,
}

impl RecordingWriter {
    pub(crate) fn new() -> Self {
        Self {
            data: Rc::new(RefCell::new(Vec::new())),
            mode: WriterMode::Record,
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            mode: WriterMode::Fail,
            ..Self::new()
        }
    }

    /// Never completes a write, like a transmitter that stopped draining.
    pub(crate) fn stalled() -> Self {
        Self {
            mode: WriterMode::Stall,
            ..Self::new()
        }
    }

    pub(crate) fn handle(&self) -> Rc<RefCell<Vec<u8>>> {
        Rc::clone(&self.data)
    }

    pub(crate) fn bytes(&self) -> Vec<u8> {
        self.data.borrow().clone()
    }
}

impl ErrorType for RecordingWriter {
    type Error = MockError;
}

impl Write for RecordingWriter {
    async fn write(&mut self, buf: &[u8]) -> Result<usize, MockError> {
        match self.mode {
            WriterMode::Record => {
                self.data.borrow_mut().extend_from_slice(buf);
                Ok(buf.len())
            }
            WriterMode::Fail => Err(MockError),
            WriterMode::Stall => core::future::pending().await,
        }
    }

    async fn flush(&mut self) -> Result<(), MockError> {
        Ok(())
    }
}

pub(crate) struct ConnScript {
    pub(crate) rx: ScriptedReader,
    pub(crate) tx: RecordingWriter,
}

#[derive(Default)]
pub(crate) struct ConnProbe {
    pub(crate) accepted: Cell<u32>,
    pub(crate) live: Cell<u32>,
    pub(crate) max_live: Cell<u32>,
    pub(crate) closed: Cell<u32>,
    /// Connections dropped without `close` having been awaited first.
    pub(crate) dropped_unclosed: Cell<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MockAcceptError {
    Exhausted,
}

/// Hands out scripted connections in order, then fails every accept.
pub(crate) struct MockAcceptor {
    scripts: VecDeque<ConnScript>,
    pub(crate) probe: Rc<ConnProbe>,
}

impl MockAcceptor {
    pub(crate) fn new(scripts: Vec<ConnScript>) -> Self {
        Self {
            scripts: scripts.into(),
            probe: Rc::new(ConnProbe::default()),
        }
    }
}

impl Acceptor for MockAcceptor {
    type Error = MockAcceptError;
    type Connection<'a>
        = MockConnection<'a>
    where
        Self: 'a;

    async fn accept(&mut self) -> Result<MockConnection<'_>, MockAcceptError> {
        let script = self
            .scripts
            .pop_front()
            .ok_or(MockAcceptError::Exhausted)?;
        let probe = &*self.probe;
        probe.accepted.set(probe.accepted.get() + 1);
        probe.live.set(probe.live.get() + 1);
        probe.max_live.set(probe.max_live.get().max(probe.live.get()));
        Ok(MockConnection {
            script,
            probe,
            closed: false,
        })
    }
}

pub(crate) struct MockConnection<'a> {
    script: ConnScript,
    probe: &'a ConnProbe,
    closed: bool,
}

impl Connection for MockConnection<'_> {
    type Reader<'b>
        = &'b mut ScriptedReader
    where
        Self: 'b;
    type Writer<'b>
        = &'b mut RecordingWriter
    where
        Self: 'b;

    fn split(&mut self) -> (&mut ScriptedReader, &mut RecordingWriter) {
        (&mut self.script.rx, &mut self.script.tx)
    }

    async fn close(&mut self) {
        self.closed = true;
        self.probe.closed.set(self.probe.closed.get() + 1);
    }
}

impl Drop for MockConnection<'_> {
    fn drop(&mut self) {
        self.probe.live.set(self.probe.live.get() - 1);
        if !self.closed {
            self.probe
                .dropped_unclosed
                .set(self.probe.dropped_unclosed.get() + 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use embedded_io_async::Error as _;

    use super::*;

    #[test]
    fn mock_error_is_a_displayable_io_error() {
        let err = MockError;
        assert_eq!(err.kind(), ErrorKind::Other);
        assert_eq!(err.to_string(), "mock transport error");
        let as_core: &dyn core::error::Error = &err;
        assert!(as_core.source().is_none());
    }
}
