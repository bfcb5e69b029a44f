//! Error types for hdcpup-core

pub type Result<T> = std::result::Result<T, Error>;

/// Core engine errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Key glob has the wrong size — corrupt or wrong provisioning format
    #[error("key glob is {actual} bytes, expected {expected}")]
    GlobLength { expected: usize, actual: usize },

    /// Header tag mismatch after decryption. Fatal: the glob is corrupt
    /// or encrypted under a different key, and no retry can help.
    #[error("key glob header tag 0x{tag:016X} is not the protocol version tag")]
    BadGlobHeader { tag: u64 },

    /// Invalid session state transition
    #[error("invalid session state: {0}")]
    InvalidSessionState(String),
}
