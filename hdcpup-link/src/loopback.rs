//! Loopback link driver
//!
//! An in-process stand-in for a real display driver: it answers status
//! and repeater reads the way a sink-side implementation would,
//! computing Kp' and V' from a caller-supplied device-key set (the
//! register file a real driver keeps in hardware). The builder switches
//! cover the interesting driver behaviors: a configurable number of
//! pending polls, a repeater topology, and deliberate Kp'/V' corruption
//! for failure-path tests.

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tracing::{debug, trace};

use hdcpup_core::derive::{self, StatusInputs};
use hdcpup_core::keystore::KeyStore;
use hdcpup_core::repeater;
use hdcpup_core::DEVICE_KEY_COUNT;
use hdcpup_types::{
    BStatus, Ksv, LinkReply, RepeaterRecord, StatusFlags, StatusRecord, StatusRequest,
};

use crate::error::{Error, Result};
use crate::LinkDriver;

/// Downstream device list the loopback sink reports when it plays a
/// repeater.
#[derive(Debug, Clone)]
pub struct RepeaterTopology {
    pub ksv_list: Vec<Ksv>,
    pub bstatus: BStatus,
}

/// Simulated sink behind a loopback control channel.
pub struct LoopbackLink {
    keys: KeyStore,
    dksv: Ksv,
    bksv: Ksv,
    status: StatusFlags,
    repeater: Option<RepeaterTopology>,
    pending_polls: u32,
    tamper_kp: bool,
    tamper_digest: bool,
    rng: StdRng,
    open: bool,
    an: Option<u64>,
    renegotiations: u32,
    repeater_reads: u32,
}

impl LoopbackLink {
    /// Create a sink holding the given device-key set.
    pub fn new(
        keys: [u64; DEVICE_KEY_COUNT],
        c: u64,
        d: u64,
        dksv: Ksv,
        bksv: Ksv,
    ) -> Self {
        Self {
            keys: KeyStore::from_parts(c, d, dksv, keys),
            dksv,
            bksv,
            status: StatusFlags::LINK_VALID | StatusFlags::ENCRYPTING,
            repeater: None,
            pending_polls: 0,
            tamper_kp: false,
            tamper_digest: false,
            rng: StdRng::seed_from_u64(0),
            open: false,
            an: None,
            renegotiations: 0,
            repeater_reads: 0,
        }
    }

    /// Seed the driver-side randomness (An, M0 draws).
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Report `Pending` for the first `polls` status reads.
    pub fn with_pending_polls(mut self, polls: u32) -> Self {
        self.pending_polls = polls;
        self
    }

    /// Attach a downstream device list and raise the repeater flag.
    pub fn with_repeater(mut self, topology: RepeaterTopology) -> Self {
        self.status |= StatusFlags::REPEATER;
        self.repeater = Some(topology);
        self
    }

    /// Replace the reported status word outright.
    pub fn with_status(mut self, status: StatusFlags) -> Self {
        self.status = status;
        self
    }

    /// Corrupt the asserted Kp' (a sink that failed the handshake).
    pub fn with_tampered_kp(mut self) -> Self {
        self.tamper_kp = true;
        self
    }

    /// Corrupt the asserted V' (a forged downstream list).
    pub fn with_tampered_digest(mut self) -> Self {
        self.tamper_digest = true;
        self
    }

    /// Renegotiations requested so far.
    pub fn renegotiations(&self) -> u32 {
        self.renegotiations
    }

    /// Repeater reads served so far.
    pub fn repeater_reads(&self) -> u32 {
        self.repeater_reads
    }

    fn current_an(&mut self) -> u64 {
        match self.an {
            Some(an) => an,
            None => {
                // A real driver re-draws An when the physical link
                // (re-)authenticates, not on every status read.
                let an = self.rng.next_u64();
                self.an = Some(an);
                an
            }
        }
    }
}

impl LinkDriver for LoopbackLink {
    fn open(&mut self) -> Result<()> {
        if self.open {
            return Err(Error::AlreadyOpen);
        }
        debug!("Opening loopback link {}", self.describe());
        self.open = true;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn read_status(&mut self, request: &StatusRequest) -> Result<LinkReply<StatusRecord>> {
        if !self.open {
            return Err(Error::NotOpen);
        }

        if self.pending_polls > 0 {
            self.pending_polls -= 1;
            trace!("Loopback link still pending");
            return Ok(LinkReply::Pending);
        }

        let an = self.current_an();
        let mut kp = derive::compute_kp(
            &self.keys,
            &StatusInputs {
                dksv: self.dksv,
                bksv: self.bksv,
                an,
                cn: request.cn,
                cs: None,
                status: self.status,
            },
        );
        if self.tamper_kp {
            kp ^= 1;
        }

        Ok(LinkReply::Ready(StatusRecord {
            an,
            aksv: request.cksv,
            bksv: self.bksv,
            dksv: self.dksv,
            status: self.status,
            cs: None,
            kp_prime: kp,
        }))
    }

    fn read_repeater(&mut self, request: &StatusRequest) -> Result<LinkReply<RepeaterRecord>> {
        if !self.open {
            return Err(Error::NotOpen);
        }
        let topology = self
            .repeater
            .as_ref()
            .ok_or_else(|| Error::Driver("sink is not a repeater".into()))?
            .clone();
        self.repeater_reads += 1;

        // Sink side of the M0 exchange: pick the secret, publish
        // Mprime = M0 xor Ke (xor with a zero seed recovers Ke).
        let m0 = self.rng.next_u64();
        let ke = derive::compute_m0(&self.keys, self.dksv, 0, request.cn);
        let mprime = m0 ^ ke;

        let mut v_prime = repeater::ksv_list_digest(&topology.ksv_list, topology.bstatus, m0);
        if self.tamper_digest {
            v_prime[0] ^= 1;
        }

        Ok(LinkReply::Ready(RepeaterRecord {
            dksv: self.dksv,
            mprime,
            ksv_list: topology.ksv_list,
            bstatus: topology.bstatus,
            v_prime,
        }))
    }

    fn renegotiate(&mut self) -> Result<()> {
        if !self.open {
            return Err(Error::NotOpen);
        }
        debug!("Loopback link renegotiating downstream");
        self.renegotiations += 1;
        self.an = None;
        Ok(())
    }

    fn close(&mut self) {
        debug!("Closing loopback link {}", self.describe());
        self.open = false;
        self.an = None;
    }

    fn describe(&self) -> String {
        format!("loopback/{}", self.dksv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hdcpup_core::facsimile::{
        FACSIMILE_BKSV, FACSIMILE_C, FACSIMILE_D, FACSIMILE_DKSV, FACSIMILE_KEYS,
    };
    use pretty_assertions::assert_eq;

    fn link() -> LoopbackLink {
        LoopbackLink::new(
            FACSIMILE_KEYS,
            FACSIMILE_C,
            FACSIMILE_D,
            FACSIMILE_DKSV,
            FACSIMILE_BKSV,
        )
        .with_seed(42)
    }

    fn request() -> StatusRequest {
        StatusRequest {
            cn: 0x2c72677f652c2f27,
            cksv: Ksv::from_truncated(0xa5a5c3c366),
        }
    }

    #[test]
    fn test_requires_open() {
        let mut link = link();
        assert!(matches!(link.read_status(&request()), Err(Error::NotOpen)));
        assert!(matches!(link.renegotiate(), Err(Error::NotOpen)));

        link.open().unwrap();
        assert!(link.is_open());
        assert!(matches!(link.open(), Err(Error::AlreadyOpen)));
    }

    #[test]
    fn test_pending_polls_then_ready() {
        let mut link = link().with_pending_polls(2);
        link.open().unwrap();

        assert!(link.read_status(&request()).unwrap().is_pending());
        assert!(link.read_status(&request()).unwrap().is_pending());
        assert!(!link.read_status(&request()).unwrap().is_pending());
    }

    #[test]
    fn test_an_stable_until_renegotiate() {
        let mut link = link();
        link.open().unwrap();

        let first = match link.read_status(&request()).unwrap() {
            LinkReply::Ready(record) => record.an,
            LinkReply::Pending => unreachable!(),
        };
        let second = match link.read_status(&request()).unwrap() {
            LinkReply::Ready(record) => record.an,
            LinkReply::Pending => unreachable!(),
        };
        assert_eq!(first, second);

        link.renegotiate().unwrap();
        let third = match link.read_status(&request()).unwrap() {
            LinkReply::Ready(record) => record.an,
            LinkReply::Pending => unreachable!(),
        };
        assert_ne!(first, third);
    }

    #[test]
    fn test_kp_matches_engine_derivation() {
        let mut link = link();
        link.open().unwrap();

        let request = request();
        let record = match link.read_status(&request).unwrap() {
            LinkReply::Ready(record) => record,
            LinkReply::Pending => unreachable!(),
        };

        let store = KeyStore::from_parts(
            FACSIMILE_C,
            FACSIMILE_D,
            FACSIMILE_DKSV,
            FACSIMILE_KEYS,
        );
        let kp = derive::compute_kp(
            &store,
            &StatusInputs {
                dksv: record.dksv,
                bksv: record.bksv,
                an: record.an,
                cn: request.cn,
                cs: record.cs,
                status: record.status,
            },
        );
        assert_eq!(kp, record.kp_prime);
    }

    #[test]
    fn test_repeater_record_validates() {
        let topology = RepeaterTopology {
            ksv_list: vec![
                Ksv::from_truncated(0x35796a172e),
                Ksv::from_truncated(0x478e71e20f),
            ],
            bstatus: BStatus::new(0x0102),
        };
        let mut link = link().with_repeater(topology);
        link.open().unwrap();

        let request = request();
        let record = match link.read_repeater(&request).unwrap() {
            LinkReply::Ready(record) => record,
            LinkReply::Pending => unreachable!(),
        };

        let store = KeyStore::from_parts(
            FACSIMILE_C,
            FACSIMILE_D,
            FACSIMILE_DKSV,
            FACSIMILE_KEYS,
        );
        assert!(repeater::validate(&store, request.cn, &record));
        assert_eq!(link.repeater_reads(), 1);
    }

    #[test]
    fn test_non_repeater_rejects_repeater_read() {
        let mut link = link();
        link.open().unwrap();
        assert!(matches!(
            link.read_repeater(&request()),
            Err(Error::Driver(_))
        ));
    }
}
