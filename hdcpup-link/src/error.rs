//! Link-driver errors

use std::io;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by a link-driver control channel. All of these are
/// retryable at the caller's cadence; none deny authentication by
/// themselves.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Driver handle already held
    #[error("link driver handle already open")]
    AlreadyOpen,

    /// Operation requires an open handle
    #[error("link driver handle not open")]
    NotOpen,

    /// The driver did not answer within its own timeout
    #[error("link driver request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// Driver rejected or failed the request
    #[error("link driver fault: {0}")]
    Driver(String),

    /// I/O error on the control channel
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
