use crate::config::PlenumConfig;
use crate::error::{PlenumError, Result};
use crate::transport::Channel;
use futures::future::BoxFuture;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;

/// In-process implementation of [`Channel`]: two endpoints joined by a pair
/// of bounded frame queues.
///
/// Framing is trivial: every queued `Vec<u8>` is one frame, and the
/// zero-length frame is the end-of-stream marker emitted by a
/// write-half-close. `probe` pops a frame and stashes its payload so the
/// following `recv` consumes exactly that frame.
pub struct LoopbackChannel {
    tx: Mutex<Option<mpsc::Sender<Vec<u8>>>>,
    rx: Mutex<Option<mpsc::Receiver<Vec<u8>>>>,
    /// Payload of the probed-but-unreceived frame.
    stash: Mutex<Option<Vec<u8>>>,
    max_frame_bytes: usize,
}

/// Create a connected pair of loopback endpoints with default tuning.
pub fn loopback_pair() -> (Arc<LoopbackChannel>, Arc<LoopbackChannel>) {
    loopback_pair_with(&PlenumConfig::default())
}

/// Create a connected pair of loopback endpoints with explicit tuning.
pub fn loopback_pair_with(config: &PlenumConfig) -> (Arc<LoopbackChannel>, Arc<LoopbackChannel>) {
    let (a_tx, b_rx) = mpsc::channel(config.loopback_capacity);
    let (b_tx, a_rx) = mpsc::channel(config.loopback_capacity);
    (
        Arc::new(LoopbackChannel::new(a_tx, a_rx, config.max_frame_bytes)),
        Arc::new(LoopbackChannel::new(b_tx, b_rx, config.max_frame_bytes)),
    )
}

impl LoopbackChannel {
    fn new(tx: mpsc::Sender<Vec<u8>>, rx: mpsc::Receiver<Vec<u8>>, max_frame_bytes: usize) -> Self {
        Self {
            tx: Mutex::new(Some(tx)),
            rx: Mutex::new(Some(rx)),
            stash: Mutex::new(None),
            max_frame_bytes,
        }
    }

    async fn pop_frame(&self, blocking: bool) -> Result<Vec<u8>> {
        let mut rx = self.rx.lock().await;
        let Some(rx) = rx.as_mut() else {
            return Err(PlenumError::BadDescriptor);
        };
        if blocking {
            rx.recv().await.ok_or(PlenumError::ConnectionReset)
        } else {
            match rx.try_recv() {
                Ok(frame) => Ok(frame),
                Err(TryRecvError::Empty) => Err(PlenumError::WouldBlock),
                Err(TryRecvError::Disconnected) => Err(PlenumError::ConnectionReset),
            }
        }
    }
}

impl Channel for LoopbackChannel {
    fn probe<'a>(&'a self, blocking: bool) -> BoxFuture<'a, Result<usize>> {
        Box::pin(async move {
            let mut stash = self.stash.lock().await;
            if let Some(frame) = stash.as_ref() {
                return Ok(frame.len());
            }
            let frame = self.pop_frame(blocking).await?;
            let len = frame.len();
            *stash = Some(frame);
            Ok(len)
        })
    }

    fn recv<'a>(&'a self, buf: &'a mut [u8]) -> BoxFuture<'a, Result<usize>> {
        Box::pin(async move {
            let stashed = self.stash.lock().await.take();
            let frame = match stashed {
                Some(frame) => frame,
                None => self.pop_frame(true).await?,
            };
            let n = frame.len().min(buf.len());
            buf[..n].copy_from_slice(&frame[..n]);
            Ok(n)
        })
    }

    fn send<'a>(&'a self, buf: &'a [u8]) -> BoxFuture<'a, Result<usize>> {
        Box::pin(async move {
            if buf.len() > self.max_frame_bytes {
                tracing::warn!(len = buf.len(), "loopback: frame exceeds configured maximum");
                return Err(PlenumError::FrameTooLarge {
                    frame: buf.len(),
                    capacity: self.max_frame_bytes,
                });
            }
            // Clone the sender so the lock is not held across the send await.
            let tx = self.tx.lock().await.as_ref().cloned();
            let Some(tx) = tx else {
                return Err(PlenumError::BadDescriptor);
            };
            tx.send(buf.to_vec())
                .await
                .map_err(|_| PlenumError::ConnectionReset)?;
            Ok(buf.len())
        })
    }

    fn peek(&self) -> bool {
        if let Ok(stash) = self.stash.try_lock() {
            if stash.is_some() {
                return true;
            }
        }
        match self.rx.try_lock() {
            Ok(rx) => rx.as_ref().is_some_and(|rx| !rx.is_empty()),
            Err(_) => false,
        }
    }

    fn close<'a>(&'a self, close_wr: bool, close_rd: bool) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            if close_wr {
                let tx = self.tx.lock().await.take();
                if let Some(tx) = tx {
                    // End-of-stream marker; the peer may already be gone.
                    let _ = tx.send(Vec::new()).await;
                    tracing::debug!("loopback: write half closed");
                }
            }
            if close_rd {
                let rx = self.rx.lock().await.take();
                if rx.is_some() {
                    tracing::debug!("loopback: read half closed");
                }
                self.stash.lock().await.take();
            }
        })
    }
}
