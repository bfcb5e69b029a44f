//! Session nonce capability
//!
//! Every `check_status` sends a fresh 64-bit Cn. The generator is a
//! capability handed to the session at open rather than hidden global
//! state, so callers decide its strength. The protocol only credits 40
//! bits of Cn with entropy, and historical implementations fed it from a
//! wall-clock-seeded stream cipher; whether that is adequate for the
//! replay protection the protocol assumes is an open question, so inject
//! OS-backed randomness (`StdRng::from_os_rng()`) unless a test needs
//! determinism.

use std::fmt;

use rand::RngCore;

/// Source of per-exchange session nonces.
pub struct NonceSource {
    rng: Box<dyn RngCore + Send>,
}

impl NonceSource {
    /// Wrap a generator. `StdRng::from_os_rng()` for production,
    /// `StdRng::seed_from_u64` for reproducible tests.
    pub fn new(rng: impl RngCore + Send + 'static) -> Self {
        Self { rng: Box::new(rng) }
    }

    /// Draw the Cn for one link exchange.
    pub fn next_cn(&mut self) -> u64 {
        self.rng.next_u64()
    }
}

impl fmt::Debug for NonceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NonceSource").finish_non_exhaustive()
    }
}
