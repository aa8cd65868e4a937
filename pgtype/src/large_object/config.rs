//! Large object configuration.
use std::env::var;

/// The largest chunk a single fast-path call transfers, `1 GiB - 1`.
///
/// The server rejects a message body larger than this.
pub const MAX_CHUNK_SIZE: usize = (1 << 30) - 1;

/// Large object configuration builder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    pub(crate) chunk_size: usize,
}

impl Config {
    /// Retrieve configuration from environment variable.
    ///
    /// It reads:
    /// - `PGLO_CHUNK_SIZE`
    ///
    /// Unset or unparsable value fallback to default.
    pub fn from_env() -> Config {
        let me = Self::default();
        match var("PGLO_CHUNK_SIZE").ok().and_then(|e|e.parse().ok()) {
            Some(size) => me.chunk_size(size),
            None => me,
        }
    }

    /// Get the chunk size.
    pub fn get_chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Set the maximum bytes transferred per read or write call.
    ///
    /// Value is clamped to `1..=MAX_CHUNK_SIZE`.
    pub fn chunk_size(mut self, value: usize) -> Self {
        self.chunk_size = value.clamp(1, MAX_CHUNK_SIZE);
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self { chunk_size: MAX_CHUNK_SIZE }
    }
}
