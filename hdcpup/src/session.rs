//! Authentication session orchestration

use tracing::{debug, info, trace, warn};

use hdcpup_core::derive::{self, StatusInputs};
use hdcpup_core::{repeater, KeyStore, Session, SessionState};
use hdcpup_link::LinkDriver;
use hdcpup_types::{Ksv, LinkReply, StatusFlags, StatusRequest};

use crate::error::Result;
use crate::nonce::NonceSource;

/// Outcome of one `check_status` poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    /// Kp matched Kp' (and, for a repeater, the KSV list validated)
    Authenticated,

    /// The driver's handshake is still in flight; poll again later
    Pending,

    /// Authentication denied for this check. The session stays open and
    /// a later poll re-derives everything from a fresh nonce.
    Failed(FailureReason),
}

/// Why a check was denied. Every reason fails closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// Status word did not carry the link-valid flag
    LinkInvalid,

    /// Derived Kp did not match the peer-asserted Kp'
    KpMismatch,

    /// Downstream KSV-list digest did not match V'
    DigestMismatch,
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            Self::LinkInvalid => "link not valid",
            Self::KpMismatch => "verification key mismatch",
            Self::DigestMismatch => "downstream KSV-list digest mismatch",
        };
        f.write_str(reason)
    }
}

/// Upstream authentication session
///
/// One session per physical display output. All calls are synchronous
/// and must be serialized by the owner; independent sessions may run on
/// separate threads.
///
/// # Examples
///
/// ```no_run
/// use hdcpup::{AuthSession, CheckOutcome, NonceSource};
/// use hdcpup_core::facsimile;
/// use hdcpup_link::LoopbackLink;
/// use rand::rngs::StdRng;
/// use rand::SeedableRng;
///
/// fn main() -> hdcpup::Result<()> {
///     let driver = LoopbackLink::new(
///         facsimile::FACSIMILE_KEYS,
///         facsimile::FACSIMILE_C,
///         facsimile::FACSIMILE_D,
///         facsimile::FACSIMILE_DKSV,
///         facsimile::FACSIMILE_BKSV,
///     );
///     let nonces = NonceSource::new(StdRng::from_os_rng());
///     let mut session = AuthSession::open(driver, &facsimile::facsimile_glob(), nonces)?;
///
///     match session.check_status()? {
///         CheckOutcome::Authenticated => println!("output verified"),
///         CheckOutcome::Pending => println!("still handshaking"),
///         CheckOutcome::Failed(reason) => println!("denied: {reason}"),
///     }
///
///     session.close();
///     Ok(())
/// }
/// ```
pub struct AuthSession<D: LinkDriver> {
    driver: D,
    keys: KeyStore,
    session: Session,
    nonces: NonceSource,
}

impl<D: LinkDriver> AuthSession<D> {
    /// Open an authentication session: decrypt the vendor key glob and
    /// acquire the driver handle.
    ///
    /// # Errors
    ///
    /// Returns an error (and leaves nothing open) if:
    /// - The glob fails to decrypt or validate — fatal for this blob
    /// - The driver handle cannot be acquired — retryable later
    pub fn open(mut driver: D, glob: &[u8], nonces: NonceSource) -> Result<Self> {
        info!("Opening upstream session on {}...", driver.describe());

        // Key material is wiped on every failure path below.
        let keys = KeyStore::decrypt(glob)?;
        driver.open()?;

        let session = Session::new();
        session.open()?;

        info!("Session open (cksv {})", keys.ksv());
        Ok(Self {
            driver,
            keys,
            session,
            nonces,
        })
    }

    /// Current state of the session state machine.
    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    /// Local KSV from the decrypted glob.
    pub fn cksv(&self) -> Ksv {
        self.keys.ksv()
    }

    /// The link driver, for introspection.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Mutable driver access, for drivers exposing maintenance controls.
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    /// Poll the link once: request a fresh status record under a fresh
    /// nonce, re-derive Kp and compare it to the driver's Kp'. For a
    /// repeater, additionally validate the downstream KSV list whenever
    /// An has moved since the last validated list.
    ///
    /// `Pending` is not a failure — poll again at your own cadence. A
    /// `Failed` outcome is terminal for this check only; later polls
    /// start over from a fresh nonce (e.g. after a re-plug).
    ///
    /// # Errors
    ///
    /// Only driver faults surface as errors; every cryptographic
    /// mismatch is reported as `CheckOutcome::Failed`.
    pub fn check_status(&mut self) -> Result<CheckOutcome> {
        let request = StatusRequest {
            cn: self.nonces.next_cn(),
            cksv: self.keys.ksv(),
        };
        trace!("Requesting status record from {}", self.driver.describe());

        let record = match self.driver.read_status(&request)? {
            LinkReply::Ready(record) => record,
            LinkReply::Pending => {
                debug!("Link handshake pending");
                self.session.transition(SessionState::Pending)?;
                return Ok(CheckOutcome::Pending);
            }
        };
        trace!("Status record: {:?}", record);

        if !record.status.contains(StatusFlags::LINK_VALID) {
            warn!(
                "Status word 0x{:04x} has no link-valid flag",
                record.status.bits()
            );
            self.session.transition(SessionState::Failed)?;
            return Ok(CheckOutcome::Failed(FailureReason::LinkInvalid));
        }

        let kp = derive::compute_kp(
            &self.keys,
            &StatusInputs {
                dksv: record.dksv,
                bksv: record.bksv,
                an: record.an,
                cn: request.cn,
                cs: record.cs,
                status: record.status,
            },
        );
        if kp != record.kp_prime {
            warn!("Verification key mismatch on {}", self.driver.describe());
            self.session.transition(SessionState::Failed)?;
            return Ok(CheckOutcome::Failed(FailureReason::KpMismatch));
        }

        if !record.status.contains(StatusFlags::REPEATER) {
            debug!("Link authenticated");
            self.session.transition(SessionState::Authenticated)?;
            return Ok(CheckOutcome::Authenticated);
        }

        if !self.session.needs_repeater_check(record.an) {
            trace!("Downstream list already validated for this An");
            self.session.transition(SessionState::Authenticated)?;
            return Ok(CheckOutcome::Authenticated);
        }

        self.check_repeater(record.an)
    }

    fn check_repeater(&mut self, an: u64) -> Result<CheckOutcome> {
        self.session.transition(SessionState::RepeaterChecking)?;

        let request = StatusRequest {
            cn: self.nonces.next_cn(),
            cksv: self.keys.ksv(),
        };
        debug!("Requesting repeater record from {}", self.driver.describe());

        let record = match self.driver.read_repeater(&request)? {
            LinkReply::Ready(record) => record,
            LinkReply::Pending => {
                debug!("Repeater list not ready yet");
                self.session.transition(SessionState::Pending)?;
                return Ok(CheckOutcome::Pending);
            }
        };
        debug!(
            "Validating {} downstream KSVs (depth {})",
            record.ksv_list.len(),
            record.bstatus.depth()
        );

        if repeater::validate(&self.keys, request.cn, &record) {
            debug!("Downstream list valid; link authenticated");
            self.session.record_repeater_pass(an);
            self.session.transition(SessionState::Authenticated)?;
            Ok(CheckOutcome::Authenticated)
        } else {
            warn!("Downstream digest mismatch; requesting renegotiation");
            if let Err(error) = self.driver.renegotiate() {
                warn!("Renegotiate request failed: {}", error);
            }
            self.session.transition(SessionState::Failed)?;
            Ok(CheckOutcome::Failed(FailureReason::DigestMismatch))
        }
    }

    /// Close the session: wipe the decrypted key material and release
    /// the driver handle. A new session may be opened afterwards.
    pub fn close(mut self) -> D {
        info!("Closing session on {}", self.driver.describe());
        self.session.close();
        self.keys.release();
        self.driver.close();
        self.driver
    }
}
