//! Link-driver request/response records
//!
//! One record type per driver read, produced fresh on every call and
//! immutable once read. Peer-asserted verification material (`Kp'`,
//! `Mprime`) is kept out of `Debug` output so session logs never carry
//! values that mirror derived keys.

use std::fmt;

use crate::ksv::Ksv;
use crate::status::{BStatus, StatusFlags};

/// Parameters the engine sends with every link-driver read: a fresh
/// session nonce and the local KSV from the decrypted key glob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusRequest {
    pub cn: u64,
    pub cksv: Ksv,
}

/// Result-code triage for a driver read: the driver either answers with a
/// record, or reports that the link handshake is still in flight.
/// Hard failures surface as the driver call's error instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkReply<T> {
    Ready(T),
    Pending,
}

impl<T> LinkReply<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, LinkReply::Pending)
    }
}

/// Status record produced by the link driver on every `read_status`.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct StatusRecord {
    /// Local-device session random, refreshed by the driver whenever the
    /// physical link re-authenticates
    pub an: u64,

    /// Local KSV echoed back by the driver
    pub aksv: Ksv,

    /// KSV of the attached sink
    pub bksv: Ksv,

    /// Local device KSV used for device-key selection
    pub dksv: Ksv,

    /// Driver-reported status word (16 meaningful bits)
    pub status: StatusFlags,

    /// 40-bit session nonce, present only when the local receiver is
    /// itself a repeater
    pub cs: Option<u64>,

    /// Peer-asserted verification value (56-bit)
    pub kp_prime: u64,
}

impl fmt::Debug for StatusRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusRecord")
            .field("an", &format_args!("0x{:016x}", self.an))
            .field("aksv", &self.aksv)
            .field("bksv", &self.bksv)
            .field("dksv", &self.dksv)
            .field("status", &format_args!("0x{:04x}", self.status.bits()))
            .field("cs", &self.cs.map(|cs| format!("0x{:010x}", cs)))
            .field("kp_prime", &"<redacted>")
            .finish()
    }
}

/// Repeater record produced by the link driver on `read_repeater`:
/// the aggregated downstream device list plus the digest material the
/// validator checks it against.
#[derive(Clone, PartialEq, Eq)]
pub struct RepeaterRecord {
    /// Local device KSV used for device-key selection
    pub dksv: Ksv,

    /// Peer-asserted digest seed (M0 xor Ke)
    pub mprime: u64,

    /// Downstream device KSVs, 0..=127 entries
    pub ksv_list: Vec<Ksv>,

    /// Repeater topology word
    pub bstatus: BStatus,

    /// Peer digest over the KSV list, five big-endian 32-bit words
    pub v_prime: [u32; 5],
}

impl fmt::Debug for RepeaterRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepeaterRecord")
            .field("dksv", &self.dksv)
            .field("mprime", &"<redacted>")
            .field("devices", &self.ksv_list.len())
            .field("bstatus", &format_args!("0x{:04x}", self.bstatus.raw()))
            .finish()
    }
}
