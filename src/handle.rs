use crate::error::{PlenumError, Result};
use crate::transport::Channel;
use std::sync::Arc;

/// One peer endpoint as seen by a collective strategy.
///
/// Wraps the externally-established transport channel with the two pieces of
/// state the framing discipline needs: the probed-size cache and the
/// half-close flags. At most one frame is ever "probed but not received" per
/// handle; `receive_frame` clears the cache and the next receive requires a
/// new probe.
pub struct Handle {
    channel: Arc<dyn Channel>,
    probed: Option<usize>,
    closed_rd: bool,
    closed_wr: bool,
}

impl Handle {
    pub fn new(channel: Arc<dyn Channel>) -> Self {
        Self {
            channel,
            probed: None,
            closed_rd: false,
            closed_wr: false,
        }
    }

    /// Size of the probed-but-unreceived frame, if any. `Some(0)` records an
    /// end-of-stream already observed on this handle.
    pub fn probed_size(&self) -> Option<usize> {
        self.probed
    }

    pub fn is_read_closed(&self) -> bool {
        self.closed_rd
    }

    pub fn is_write_closed(&self) -> bool {
        self.closed_wr
    }

    /// Probe the next frame header, returning its payload size.
    ///
    /// Re-probing an already-probed handle returns the cached size without
    /// touching the transport. `Ok(0)` is end-of-stream, whether it arrived
    /// as a zero-size frame or as a connection reset (resets are folded into
    /// a graceful EOS). In non-blocking mode a missing header surfaces as
    /// `WouldBlock` with no state change.
    pub async fn probe_frame(&mut self, blocking: bool) -> Result<usize> {
        if let Some(size) = self.probed {
            return Ok(size);
        }
        if self.closed_rd {
            return Ok(0);
        }
        match self.channel.probe(blocking).await {
            Ok(0) => {
                // EOS frame: terminal for the read half.
                self.probed = Some(0);
                self.close(false, true).await;
                Ok(0)
            }
            Ok(size) => {
                self.probed = Some(size);
                Ok(size)
            }
            Err(e) if e.is_connection_reset() => {
                tracing::debug!("probe reset folded into end-of-stream");
                self.close(true, true).await;
                Ok(0)
            }
            Err(e) => Err(e),
        }
    }

    /// Receive the probed frame into `buf`, returning the bytes read.
    ///
    /// Probes first (blocking) if no frame is pending. `Ok(0)` is
    /// end-of-stream. If the pending frame exceeds `buf`, fails with
    /// `FrameTooLarge` and leaves the frame unconsumed so the caller can
    /// retry with more capacity.
    pub async fn receive_frame(&mut self, buf: &mut [u8]) -> Result<usize> {
        let size = match self.probed {
            Some(size) => size,
            None => self.probe_frame(true).await?,
        };
        if size == 0 {
            return Ok(0);
        }
        if size > buf.len() {
            return Err(PlenumError::FrameTooLarge {
                frame: size,
                capacity: buf.len(),
            });
        }
        self.probed = None;
        self.channel.recv(&mut buf[..size]).await
    }

    /// Deliver `buf` as one frame to the peer.
    pub async fn send_frame(&self, buf: &[u8]) -> Result<usize> {
        if self.closed_wr {
            return Err(PlenumError::BadDescriptor);
        }
        self.channel.send(buf).await
    }

    /// Data ready on this handle without consuming anything.
    pub fn peek(&self) -> bool {
        self.probed.unwrap_or(0) > 0 || (!self.closed_rd && self.channel.peek())
    }

    /// Half-close either direction. Only the first transition per direction
    /// reaches the transport, so repeated closes are harmless.
    pub async fn close(&mut self, close_wr: bool, close_rd: bool) {
        let wr = close_wr && !self.closed_wr;
        let rd = close_rd && !self.closed_rd;
        if !wr && !rd {
            return;
        }
        self.closed_wr |= wr;
        self.closed_rd |= rd;
        self.channel.close(wr, rd).await;
    }
}
