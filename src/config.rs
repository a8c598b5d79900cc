//! Runtime-configurable tuning parameters for plenum.
//!
//! All values have sensible defaults. Override via environment variables
//! (prefixed `PLENUM_`) or by constructing a custom `PlenumConfig`.

/// Tuning parameters for the in-process transport.
#[derive(Debug, Clone)]
pub struct PlenumConfig {
    /// Frames buffered per loopback channel direction before senders wait.
    pub loopback_capacity: usize,

    /// Largest frame a loopback channel accepts in one send.
    pub max_frame_bytes: usize,
}

impl Default for PlenumConfig {
    fn default() -> Self {
        Self {
            loopback_capacity: 64,
            max_frame_bytes: 4 * 1024 * 1024 * 1024, // 4 GiB
        }
    }
}

impl PlenumConfig {
    /// Load config from environment variables, falling back to defaults.
    ///
    /// Recognized variables:
    /// - `PLENUM_LOOPBACK_CAPACITY`
    /// - `PLENUM_MAX_FRAME_BYTES`
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("PLENUM_LOOPBACK_CAPACITY") {
            if let Ok(n) = v.parse::<usize>() {
                if n > 0 {
                    cfg.loopback_capacity = n;
                }
            }
        }
        if let Ok(v) = std::env::var("PLENUM_MAX_FRAME_BYTES") {
            if let Ok(n) = v.parse::<usize>() {
                cfg.max_frame_bytes = n;
            }
        }

        cfg
    }
}
