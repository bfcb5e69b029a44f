//! Error types for hdcpup-types

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Raw value does not fit the 40-bit KSV width
    #[error("KSV value 0x{0:X} does not fit in 40 bits")]
    KsvOutOfRange(u64),

    /// Downstream KSV list exceeds the protocol limit of 127 devices
    #[error("KSV list holds {0} entries (protocol limit is 127)")]
    KsvListTooLong(usize),
}
