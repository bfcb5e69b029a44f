//! Session key derivation
//!
//! Both derivation paths start from `Ku`, the root key selected out of
//! the device-key array by the peer-supplied Dksv, and run fixed chains
//! of one-way applications over the exchanged session values. The bit
//! slicing in here (which 40 or 24 bits of which operand, at which
//! offset) is the load-bearing correctness surface of the whole engine:
//! an off-by-one still yields a well-formed key, just the wrong one, so
//! the conformance vectors in the tests are the only real guard.

use tracing::trace;

use hdcpup_types::{Ksv, StatusFlags};

use crate::keystore::KeyStore;
use crate::oneway::{one_way, Mode, OutputWidth};
use crate::{DATA_MASK, DEVICE_KEY_COUNT, KEY_MASK};

/// Low 40 bits of the peer nonce.
fn low40(value: u64) -> u64 {
    value & DATA_MASK
}

/// High 40 bits of the 64-bit An.
fn high40(value: u64) -> u64 {
    value >> 24
}

/// Top 24 bits of the peer nonce.
fn top24(value: u64) -> u64 {
    value >> 40
}

/// Session values feeding the status-path derivation.
#[derive(Debug, Clone, Copy)]
pub struct StatusInputs {
    pub dksv: Ksv,
    pub bksv: Ksv,
    pub an: u64,
    pub cn: u64,
    /// Present only when the local receiver is itself a repeater; adds
    /// the final K4 -> Kp stage.
    pub cs: Option<u64>,
    pub status: StatusFlags,
}

/// Root session key.
///
/// Sums the device keys selected by `dksv` (wrapping at 56 bits after
/// every addition), offsets by D and scales by C mod 2^56.
pub fn compute_ku(store: &KeyStore, dksv: Ksv) -> u64 {
    let mut sum = 0u64;
    for index in 0..DEVICE_KEY_COUNT {
        if dksv.selects(index as u32) {
            sum = (sum + store.key(index)) & KEY_MASK;
        }
    }
    sum.wrapping_add(store.d()).wrapping_mul(store.c()) & KEY_MASK
}

/// Verification key for the status path.
///
/// Chain: `K1 = oneWayA(Ku, low40(Cn))`, `K2 = oneWayA(K1, Bksv)`,
/// `K3 = oneWayA(K2, high40(An))`, `K4 = oneWayA(K3, status-header)`
/// where the 40-bit status header packs the 16-bit status word over the
/// top 24 bits of Cn; with a session nonce Cs present, one further stage
/// produces Kp, otherwise Kp = K4.
///
/// Always returns a value; correctness is established only by the caller
/// comparing against the peer-asserted Kp'.
pub fn compute_kp(store: &KeyStore, inputs: &StatusInputs) -> u64 {
    let ku = compute_ku(store, inputs.dksv);
    let k1 = one_way(Mode::A, OutputWidth::W56, ku, low40(inputs.cn));
    let k2 = one_way(Mode::A, OutputWidth::W56, k1, inputs.bksv.value());
    let k3 = one_way(Mode::A, OutputWidth::W56, k2, high40(inputs.an));

    let header = ((inputs.status.bits() as u64) << 24) | top24(inputs.cn);
    let k4 = one_way(Mode::A, OutputWidth::W56, k3, header);

    let kp = match inputs.cs {
        Some(cs) => one_way(Mode::A, OutputWidth::W56, k4, low40(cs)),
        None => k4,
    };

    trace!(with_cs = inputs.cs.is_some(), "status-path derivation complete");
    kp
}

/// Derived repeater secret M0.
///
/// Chain: `K5 = oneWayB(Ku, low40(Cn))`, `Ke = oneWayB64(K5, top24(Cn))`,
/// `M0 = Mprime xor Ke`.
pub fn compute_m0(store: &KeyStore, dksv: Ksv, mprime: u64, cn: u64) -> u64 {
    let ku = compute_ku(store, dksv);
    let k5 = one_way(Mode::B, OutputWidth::W56, ku, low40(cn));
    let ke = one_way(Mode::B, OutputWidth::W64, k5, top24(cn));

    trace!("repeater-path derivation complete");
    mprime ^ ke
}
