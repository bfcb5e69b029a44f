//! Decrypted device-key ownership
//!
//! The vendor supplies one opaque glob per device: an RC4-encrypted blob
//! holding the protocol version tag, the two derivation constants, the
//! local KSV and the 40 secret device keys. The decrypted material lives
//! inside a [`KeyStore`] for the lifetime of an open session and is wiped
//! on every exit path, including the failed-validation paths of
//! [`KeyStore::decrypt`].

use std::fmt;

use bytes::Buf;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use hdcpup_types::Ksv;

use crate::constants::{GLOB_CIPHER_KEY, GLOB_HEADER_TAG, GLOB_KEY_LEN, GLOB_LEN};
use crate::error::{Error, Result};
use crate::rc4::Rc4;
use crate::{DEVICE_KEY_COUNT, KEY_MASK};

/// Decrypted key material for one device.
///
/// Secret fields are zeroized on drop; [`KeyStore::release`] makes the
/// wipe explicit at session close.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct KeyStore {
    c: u64,
    d: u64,
    #[zeroize(skip)]
    ksv: Ksv,
    keys: [u64; DEVICE_KEY_COUNT],
}

impl KeyStore {
    /// Decrypt and validate a vendor key glob.
    ///
    /// # Errors
    ///
    /// - [`Error::GlobLength`] if the blob is not exactly [`GLOB_LEN`]
    ///   bytes
    /// - [`Error::BadGlobHeader`] if the decrypted header is not the
    ///   protocol version tag (corrupt blob or wrong format — fatal)
    pub fn decrypt(glob: &[u8]) -> Result<Self> {
        if glob.len() != GLOB_LEN {
            return Err(Error::GlobLength {
                expected: GLOB_LEN,
                actual: glob.len(),
            });
        }

        // Zeroizing wipes the plaintext on every return path below.
        let mut plain = Zeroizing::new(glob.to_vec());
        Rc4::new(&GLOB_CIPHER_KEY).apply(&mut plain);

        let mut buf = &plain[..];
        let tag = buf.get_u64_le();
        if tag != GLOB_HEADER_TAG {
            return Err(Error::BadGlobHeader { tag });
        }

        let c = buf.get_u64_le();
        let d = buf.get_u64_le();
        let ksv = Ksv::from_truncated(buf.get_u64_le());

        let mut keys = [0u64; DEVICE_KEY_COUNT];
        for slot in keys.iter_mut() {
            let mut packed = [0u8; 8];
            buf.copy_to_slice(&mut packed[..GLOB_KEY_LEN]);
            *slot = u64::from_le_bytes(packed) & KEY_MASK;
        }

        Ok(Self { c, d, ksv, keys })
    }

    /// Assemble a store from already-decrypted parts. This is the
    /// driver/sink side of the key exchange (hardware register file in a
    /// real driver) and the conformance fixtures; session code always
    /// goes through [`KeyStore::decrypt`].
    pub fn from_parts(c: u64, d: u64, ksv: Ksv, keys: [u64; DEVICE_KEY_COUNT]) -> Self {
        let mut masked = keys;
        for key in masked.iter_mut() {
            *key &= KEY_MASK;
        }
        Self {
            c,
            d,
            ksv: Ksv::from_truncated(ksv.value()),
            keys: masked,
        }
    }

    /// Derivation constant C.
    pub fn c(&self) -> u64 {
        self.c
    }

    /// Derivation constant D.
    pub fn d(&self) -> u64 {
        self.d
    }

    /// Local KSV carried by the glob.
    pub fn ksv(&self) -> Ksv {
        self.ksv
    }

    /// Device key at `index` (0..40).
    pub fn key(&self, index: usize) -> u64 {
        self.keys[index]
    }

    /// Consume the store, wiping every secret byte.
    pub fn release(mut self) {
        self.zeroize();
    }
}

impl fmt::Debug for KeyStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyStore")
            .field("ksv", &self.ksv)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facsimile;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_decrypt_round_trip() {
        let glob = facsimile::facsimile_glob();
        let store = KeyStore::decrypt(&glob).unwrap();

        assert_eq!(store.c(), facsimile::FACSIMILE_C);
        assert_eq!(store.d(), facsimile::FACSIMILE_D);
        assert_eq!(store.ksv(), facsimile::FACSIMILE_CKSV);
        for (index, expected) in facsimile::FACSIMILE_KEYS.iter().enumerate() {
            assert_eq!(store.key(index), *expected);
        }
    }

    #[test]
    fn test_wrong_length_rejected() {
        let glob = facsimile::facsimile_glob();
        let result = KeyStore::decrypt(&glob[..glob.len() - 1]);
        assert!(matches!(result, Err(Error::GlobLength { .. })));
    }

    #[test]
    fn test_corrupt_header_rejected() {
        let mut glob = facsimile::facsimile_glob();
        glob[0] ^= 0xff;
        let result = KeyStore::decrypt(&glob);
        assert!(matches!(result, Err(Error::BadGlobHeader { .. })));
    }

    #[test]
    fn test_corrupt_body_still_parses() {
        // Only the header is validated; key bytes are trusted as-is.
        let mut glob = facsimile::facsimile_glob();
        glob[GLOB_LEN - 1] ^= 0xff;
        let store = KeyStore::decrypt(&glob).unwrap();
        assert_ne!(store.key(DEVICE_KEY_COUNT - 1), facsimile::FACSIMILE_KEYS[39]);
    }

    #[test]
    fn test_wipe_on_zeroize() {
        let glob = facsimile::facsimile_glob();
        let mut store = KeyStore::decrypt(&glob).unwrap();

        store.zeroize();

        assert_eq!(store.c(), 0);
        assert_eq!(store.d(), 0);
        for index in 0..DEVICE_KEY_COUNT {
            assert_eq!(store.key(index), 0);
        }
    }

    #[test]
    fn test_from_parts_masks_keys() {
        let store = KeyStore::from_parts(1, 2, Ksv::from_truncated(3), [u64::MAX; 40]);
        assert_eq!(store.key(0), KEY_MASK);
    }

    #[test]
    fn test_debug_hides_secrets() {
        let glob = facsimile::facsimile_glob();
        let store = KeyStore::decrypt(&glob).unwrap();
        let rendered = format!("{:?}", store);
        assert!(rendered.contains("ksv"));
        assert!(!rendered.contains(&format!("{:x}", facsimile::FACSIMILE_KEYS[0])));
    }
}
