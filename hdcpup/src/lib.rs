//! # hdcpup
//!
//! Upstream link authentication for HDCP-protected display outputs.
//!
//! An [`AuthSession`] proves to the display driver that licensed device
//! keys are present, verifies the driver's reported link state against
//! the derived session key, and — when the attached sink is a repeater —
//! validates the aggregated downstream device list.
//!
//! ## Features
//!
//! - Scoped key-glob ownership with guaranteed wipe on close
//! - Full status-path (Kp) and repeater-path (M0, V) derivation
//! - Pluggable link drivers and nonce sources
//! - Conformance vectors and a loopback driver for testing
//!
//! ## Quick Start
//!
//! ```no_run
//! use hdcpup::{AuthSession, CheckOutcome, NonceSource};
//! use hdcpup_core::facsimile;
//! use hdcpup_link::LoopbackLink;
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! fn main() -> hdcpup::Result<()> {
//!     let driver = LoopbackLink::new(
//!         facsimile::FACSIMILE_KEYS,
//!         facsimile::FACSIMILE_C,
//!         facsimile::FACSIMILE_D,
//!         facsimile::FACSIMILE_DKSV,
//!         facsimile::FACSIMILE_BKSV,
//!     );
//!     let nonces = NonceSource::new(StdRng::from_os_rng());
//!
//!     let mut session = AuthSession::open(driver, &facsimile::facsimile_glob(), nonces)?;
//!     loop {
//!         match session.check_status()? {
//!             CheckOutcome::Pending => std::thread::sleep(std::time::Duration::from_millis(100)),
//!             outcome => {
//!                 println!("link: {:?}", outcome);
//!                 break;
//!             }
//!         }
//!     }
//!     session.close();
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod nonce;
pub mod session;

// Re-exports
pub use error::{Error, Result};
pub use nonce::NonceSource;
pub use session::{AuthSession, CheckOutcome, FailureReason};

// Re-export types
pub use hdcpup_core::{KeyStore, SessionState};
pub use hdcpup_link::LinkDriver;
pub use hdcpup_types::{BStatus, Ksv, StatusFlags};
