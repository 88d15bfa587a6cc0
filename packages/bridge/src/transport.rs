//! Network capability boundary.
//!
//! The serial side needs nothing beyond `embedded_io_async::{Read, Write}`;
//! the network side additionally needs accept, split and close.

use core::fmt::Debug;

use embedded_io_async::{Read, Write};

/// Listening endpoint that hands out one connection at a time.
///
/// A connection borrows its acceptor mutably, so a second accept cannot be
/// issued while a session is alive.
#[allow(async_fn_in_trait)]
pub trait Acceptor {
    type Error: Debug;
    type Connection<'a>: Connection
    where
        Self: 'a;

    async fn accept(&mut self) -> Result<Self::Connection<'_>, Self::Error>;
}

/// An accepted stream socket.
#[allow(async_fn_in_trait)]
pub trait Connection {
    type Reader<'a>: Read
    where
        Self: 'a;
    type Writer<'a>: Write
    where
        Self: 'a;

    /// Independent receive and send halves for the two forwarders.
    fn split(&mut self) -> (Self::Reader<'_>, Self::Writer<'_>);

    /// Shuts the connection down and releases its resources. Called once,
    /// after both halves have been dropped.
    async fn close(&mut self);
}
