//! Repeater KSV-list validation
//!
//! A repeater aggregates the KSVs of every downstream device and asserts
//! a SHA-1 digest V' over the list. The validator rebuilds the digest
//! message locally (KSV list, then Bstatus, then the derived M0, all
//! little-endian) and compares all 160 bits. Any mismatch is an
//! authentication failure, never a recoverable error.

use byteorder::{BigEndian, ByteOrder};
use bytes::BufMut;
use sha1::{Digest, Sha1};

use hdcpup_types::{BStatus, Ksv, RepeaterRecord};

use crate::derive;
use crate::keystore::KeyStore;

/// Protocol limit on downstream devices in one KSV list.
pub const MAX_KSV_LIST: usize = 127;

/// Assemble the digest message: each KSV little-endian 5 bytes, then
/// Bstatus little-endian 2 bytes, then M0 little-endian 8 bytes.
fn assemble_message(ksv_list: &[Ksv], bstatus: BStatus, m0: u64) -> Vec<u8> {
    let mut message = Vec::with_capacity(ksv_list.len() * Ksv::SIZE + 10);
    for ksv in ksv_list {
        message.put_slice(&ksv.to_le_bytes());
    }
    message.put_u16_le(bstatus.raw());
    message.put_u64_le(m0);
    message
}

/// SHA-1 digest of the assembled message as five big-endian words.
pub fn ksv_list_digest(ksv_list: &[Ksv], bstatus: BStatus, m0: u64) -> [u32; 5] {
    let digest = Sha1::digest(assemble_message(ksv_list, bstatus, m0));
    let mut words = [0u32; 5];
    for (word, chunk) in words.iter_mut().zip(digest.chunks_exact(4)) {
        *word = BigEndian::read_u32(chunk);
    }
    words
}

/// Check a KSV list against the peer digest. Fails closed: an over-long
/// list or any digest difference denies authentication.
pub fn verify_ksv_list(ksv_list: &[Ksv], bstatus: BStatus, m0: u64, v_prime: &[u32; 5]) -> bool {
    if ksv_list.len() > MAX_KSV_LIST {
        return false;
    }
    ksv_list_digest(ksv_list, bstatus, m0) == *v_prime
}

/// Full validation of a repeater record: derive M0 from the key store
/// and the session nonce, then check the digest.
pub fn validate(store: &KeyStore, cn: u64, record: &RepeaterRecord) -> bool {
    let m0 = derive::compute_m0(store, record.dksv, record.mprime, cn);
    verify_ksv_list(&record.ksv_list, record.bstatus, m0, &record.v_prime)
}
