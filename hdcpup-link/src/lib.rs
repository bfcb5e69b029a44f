//! Link-driver boundary for the upstream authentication engine
//!
//! The kernel/firmware driver that owns the physical link state machine
//! is an external collaborator; this crate fixes the shape of its
//! request/response control channel. Production drivers are OS-specific
//! and live outside this workspace; [`LoopbackLink`] is the in-process
//! stand-in used by the examples and integration tests.

pub mod error;
pub mod loopback;

pub use error::{Error, Result};
pub use loopback::{LoopbackLink, RepeaterTopology};

use hdcpup_types::{LinkReply, RepeaterRecord, StatusRecord, StatusRequest};

/// Control channel to one display output's link driver.
///
/// Implementations block until the driver answers or its own timeout
/// fires; the engine layers no additional timeout and never overlaps two
/// requests on one handle.
pub trait LinkDriver: Send {
    /// Acquire the driver handle for this output.
    fn open(&mut self) -> Result<()>;

    /// Whether the handle is currently held.
    fn is_open(&self) -> bool;

    /// Request a fresh status record.
    fn read_status(&mut self, request: &StatusRequest) -> Result<LinkReply<StatusRecord>>;

    /// Request a fresh repeater record.
    fn read_repeater(&mut self, request: &StatusRequest) -> Result<LinkReply<RepeaterRecord>>;

    /// Ask the driver to renegotiate the downstream link. Fire-and-forget:
    /// the engine reports failure regardless of the outcome.
    fn renegotiate(&mut self) -> Result<()>;

    /// Release the driver handle.
    fn close(&mut self);

    /// Human-readable identity of the output, for logs.
    fn describe(&self) -> String;
}
