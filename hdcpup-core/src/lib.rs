//! # hdcpup-core
//!
//! Core engine for HDCP upstream link authentication.
//!
//! This crate provides the protocol primitives:
//! - Keyed one-way function built from four combined LFSRs
//! - Key glob decryption and scoped ownership of device keys
//! - Session key derivation (Ku, K1..K4, Kp and the repeater secret M0)
//! - Downstream KSV-list digest validation
//! - Session state tracking

pub mod constants;
pub mod derive;
pub mod error;
pub mod facsimile;
pub mod keystore;
pub mod oneway;
pub mod rc4;
pub mod repeater;
pub mod session;

pub use error::{Error, Result};
pub use keystore::KeyStore;
pub use oneway::{one_way, Mode, OutputWidth};
pub use session::{Session, SessionState};

/// Width mask for device keys and every derived key value.
pub const KEY_MASK: u64 = (1 << 56) - 1;

/// Width mask for KSVs and one-way auxiliary data.
pub const DATA_MASK: u64 = (1 << 40) - 1;

/// Number of secret device keys in a key set.
pub const DEVICE_KEY_COUNT: usize = 40;
