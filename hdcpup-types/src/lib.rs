//! Type definitions for hdcpup

pub mod error;
pub mod ksv;
pub mod records;
pub mod status;

pub use error::{Error, Result};
pub use ksv::Ksv;
pub use records::{LinkReply, RepeaterRecord, StatusRecord, StatusRequest};
pub use status::{BStatus, StatusFlags};
