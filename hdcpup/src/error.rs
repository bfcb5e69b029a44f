//! High-level error types

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("core engine error: {0}")]
    Core(#[from] hdcpup_core::Error),

    #[error("link driver error: {0}")]
    Link(#[from] hdcpup_link::Error),
}

impl Error {
    /// Whether a later `check_status` may succeed. Glob-format errors
    /// are fatal for the blob; link-driver faults are transient.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Link(_))
    }
}
