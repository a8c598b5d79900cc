use crate::types::CollectiveKind;

pub type Result<T> = std::result::Result<T, PlenumError>;

#[derive(Debug, thiserror::Error)]
pub enum PlenumError {
    #[error("{operation} is not supported by the {kind} collective")]
    UnsupportedOperation {
        kind: CollectiveKind,
        operation: &'static str,
    },

    #[error("{which} buffer is required for this operation")]
    MissingBuffer { which: &'static str },

    #[error("buffer of {size} bytes does not divide into {datasize}-byte elements")]
    IndivisibleBuffer { size: usize, datasize: usize },

    #[error("{which} buffer too small: need {needed} bytes, got {got}")]
    UndersizedBuffer {
        which: &'static str,
        needed: usize,
        got: usize,
    },

    #[error("frame of {frame} bytes exceeds capacity of {capacity}")]
    FrameTooLarge { frame: usize, capacity: usize },

    #[error("operation would block")]
    WouldBlock,

    #[error("connection reset by peer")]
    ConnectionReset,

    #[error("channel is not valid or already closed")]
    BadDescriptor,

    #[error("receive without a prior successful probe")]
    ProbeRequired,
}

impl PlenumError {
    /// True for transport resets, which the framing layer folds into a
    /// graceful end-of-stream.
    pub fn is_connection_reset(&self) -> bool {
        matches!(self, PlenumError::ConnectionReset)
    }

    /// True when a non-blocking probe found no pending header.
    pub fn is_would_block(&self) -> bool {
        matches!(self, PlenumError::WouldBlock)
    }
}
