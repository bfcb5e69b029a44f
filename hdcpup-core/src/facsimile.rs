//! Facsimile conformance vectors
//!
//! A non-production key set in the spirit of the protocol's published
//! facsimile vectors: the conformance tests and the loopback examples
//! derive real session keys from it. Never provision these values on
//! shipping hardware.

use bytes::BufMut;

use hdcpup_types::Ksv;

use crate::constants::{GLOB_CIPHER_KEY, GLOB_HEADER_TAG, GLOB_KEY_LEN, GLOB_LEN};
use crate::keystore::KeyStore;
use crate::rc4::Rc4;

/// Local device KSV selecting the facsimile keys (20 set bits).
pub const FACSIMILE_DKSV: Ksv = Ksv::from_truncated(0xfc5d32906c);

/// Sink KSV used by the conformance chain (20 set bits).
pub const FACSIMILE_BKSV: Ksv = Ksv::from_truncated(0xe72697f401);

/// Local KSV carried by the facsimile glob (20 set bits).
pub const FACSIMILE_CKSV: Ksv = Ksv::from_truncated(0xa5a5c3c366);

/// Session random An of the conformance chain: the 40-bit test value
/// shifted into the high bits of the 64-bit field.
pub const FACSIMILE_AN: u64 = 0x34271c130c000000;

/// Peer nonce Cn of the conformance chain.
pub const FACSIMILE_CN: u64 = 0x2c72677f652c2f27;

/// Session nonce Cs of the conformance chain.
pub const FACSIMILE_CS: u64 = 0x0000000001;

/// Status word of the conformance chain.
pub const FACSIMILE_STATUS: u16 = 0x1105;

/// Derivation constant C of the facsimile glob.
pub const FACSIMILE_C: u64 = 0x93af6b5fcd0377cb;

/// Derivation constant D of the facsimile glob.
pub const FACSIMILE_D: u64 = 0x6e3bd5218a44e9d0;

/// The 40 facsimile device keys.
pub const FACSIMILE_KEYS: [u64; 40] = [
    0xba41412513dd7d, 0xd39488a87e7216,
    0xf6aaa09cdc8dd0, 0x0a1457f6e7801e,
    0x81436d053ba3d4, 0xd20455102a4a6a,
    0x53b90adc13d55e, 0x4bf0175bc86562,
    0x03d71952027563, 0xc6d3214d618fc8,
    0x32e52f48c2743e, 0xad45869579373d,
    0x75235997b82068, 0x3a98ecdf4bec67,
    0xe54d065c902d55, 0x07e4c9da3b4e09,
    0x327d0f6b41620e, 0xce6e1db07189fc,
    0xe892534107c71f, 0xac409c22e36ddc,
    0xdd716dab078062, 0x4fb03c5385d28a,
    0x28d758957a5ecd, 0x16a748bd1b8c58,
    0xba0a2ad008902e, 0x5fa59d449aa2eb,
    0x39721f523cb883, 0x94a7f12ea377fd,
    0x77e28bfa8723f5, 0x00f6d7619f29d9,
    0x6173ae97d9d701, 0xc3423ffe8c6b8c,
    0x0a8091a5071a84, 0x88659e858a9bd8,
    0xebc5899268454b, 0xc9a31e451e7cc6,
    0x3ab1291b60d07b, 0x27090dc4d0e60a,
    0x42c1b28c916e98, 0x59706148013392,
];

/// A [`KeyStore`] holding the facsimile set directly.
pub fn facsimile_store() -> KeyStore {
    KeyStore::from_parts(FACSIMILE_C, FACSIMILE_D, FACSIMILE_CKSV, FACSIMILE_KEYS)
}

/// Build the facsimile glob as a vendor would ship it: the packed
/// plaintext layout encrypted under the compiled-in RC4 glob key.
pub fn facsimile_glob() -> Vec<u8> {
    let mut glob = Vec::with_capacity(GLOB_LEN);
    glob.put_u64_le(GLOB_HEADER_TAG);
    glob.put_u64_le(FACSIMILE_C);
    glob.put_u64_le(FACSIMILE_D);
    glob.put_u64_le(FACSIMILE_CKSV.value());
    for key in FACSIMILE_KEYS {
        glob.put_slice(&key.to_le_bytes()[..GLOB_KEY_LEN]);
    }

    Rc4::new(&GLOB_CIPHER_KEY).apply(&mut glob);
    glob
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_glob_has_protocol_size() {
        assert_eq!(facsimile_glob().len(), GLOB_LEN);
    }

    #[test]
    fn test_glob_is_actually_encrypted() {
        let glob = facsimile_glob();
        assert_ne!(&glob[..8], &GLOB_HEADER_TAG.to_le_bytes());
    }

    #[test]
    fn test_ksvs_are_licensed_shape() {
        assert_eq!(FACSIMILE_DKSV.popcount(), 20);
        assert_eq!(FACSIMILE_BKSV.popcount(), 20);
        assert_eq!(FACSIMILE_CKSV.popcount(), 20);
    }
}
