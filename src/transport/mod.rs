//! Point-to-point transport contract consumed by the collective core.
//!
//! The core never opens connections itself: it drives channels that an
//! external collaborator has already established. A [`Channel`] is framed and
//! message-oriented; a size-zero frame is the end-of-stream marker. The only
//! implementation shipped in-tree is the in-process [`LoopbackChannel`].

pub mod loopback;

pub use loopback::{LoopbackChannel, loopback_pair, loopback_pair_with};

use crate::error::Result;
use futures::future::BoxFuture;

/// A framed, message-oriented channel to one peer.
///
/// Frame discipline: `probe` consumes the header of the next frame and
/// reports its payload length; the following `recv` consumes that payload.
/// `send` delivers its buffer as exactly one frame. Implementations are
/// stateless with respect to the collective layer: the probed-size cache and
/// the half-close flags live in [`crate::handle::Handle`].
pub trait Channel: Send + Sync {
    /// Consume the next frame header and return its payload length.
    ///
    /// `Ok(0)` signals end-of-stream. In non-blocking mode, returns
    /// `Err(PlenumError::WouldBlock)` when no header is available yet.
    fn probe<'a>(&'a self, blocking: bool) -> BoxFuture<'a, Result<usize>>;

    /// Read the probed payload into `buf`, returning the bytes read.
    fn recv<'a>(&'a self, buf: &'a mut [u8]) -> BoxFuture<'a, Result<usize>>;

    /// Deliver `buf` as exactly one frame, returning the bytes sent.
    fn send<'a>(&'a self, buf: &'a [u8]) -> BoxFuture<'a, Result<usize>>;

    /// Non-blocking hint: is a frame ready to read?
    fn peek(&self) -> bool;

    /// Half-close the write and/or read direction.
    ///
    /// Closing the write side delivers the end-of-stream marker to the peer.
    fn close<'a>(&'a self, close_wr: bool, close_rd: bool) -> BoxFuture<'a, ()>;
}
