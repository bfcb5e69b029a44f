//! Session state tracking
//!
//! A session represents one upstream link and tracks:
//! - The authentication state machine
//! - The last An that passed repeater validation (a downstream list is
//!   only re-checked after An moves)

use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{Error, Result};

/// Authentication state of one upstream link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No open session
    Closed,

    /// Open, no status check performed yet
    Idle,

    /// Last status check found the link handshake still in flight
    Pending,

    /// Last status check verified the link
    Authenticated,

    /// Walking the downstream device list of a repeater
    RepeaterChecking,

    /// Last status check was denied
    Failed,
}

/// Session tracker
///
/// Thread-safe and cheap to clone (Arc internally); one tracker per
/// physical output, with calls serialized by the owner.
#[derive(Debug, Clone, Default)]
pub struct Session {
    inner: Arc<SessionInner>,
}

#[derive(Debug)]
struct SessionInner {
    state: RwLock<SessionState>,

    /// An of the last repeater list that validated
    validated_an: RwLock<Option<u64>>,
}

impl Default for SessionInner {
    fn default() -> Self {
        Self {
            state: RwLock::new(SessionState::Closed),
            validated_an: RwLock::new(None),
        }
    }
}

impl Session {
    /// Create a new closed session
    pub fn new() -> Self {
        Self::default()
    }

    /// Get current state
    pub fn state(&self) -> SessionState {
        *self.inner.state.read()
    }

    /// Check if the session is open (any state but `Closed`)
    pub fn is_open(&self) -> bool {
        !matches!(self.state(), SessionState::Closed)
    }

    /// Check if the last status check authenticated the link
    pub fn is_authenticated(&self) -> bool {
        matches!(self.state(), SessionState::Authenticated)
    }

    /// Move `Closed -> Idle` once the glob decrypts and the driver
    /// handle is acquired
    pub fn open(&self) -> Result<()> {
        let mut state = self.inner.state.write();

        if *state != SessionState::Closed {
            return Err(Error::InvalidSessionState(format!(
                "cannot open from state: {:?}",
                *state
            )));
        }

        *state = SessionState::Idle;
        Ok(())
    }

    /// Record a status-check outcome. Valid from any open state; checks
    /// may be repeated indefinitely at the caller's cadence.
    pub fn transition(&self, next: SessionState) -> Result<()> {
        let mut state = self.inner.state.write();

        if *state == SessionState::Closed || next == SessionState::Closed {
            return Err(Error::InvalidSessionState(format!(
                "cannot move {:?} -> {:?}",
                *state, next
            )));
        }

        *state = next;
        Ok(())
    }

    /// Whether the repeater list must be validated for this An
    pub fn needs_repeater_check(&self, an: u64) -> bool {
        self.inner
            .validated_an
            .read()
            .map_or(true, |validated| validated != an)
    }

    /// Remember that the repeater list validated under this An
    pub fn record_repeater_pass(&self, an: u64) {
        *self.inner.validated_an.write() = Some(an);
    }

    /// Close the session and forget the repeater memo
    pub fn close(&self) {
        *self.inner.state.write() = SessionState::Closed;
        *self.inner.validated_an.write() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_new() {
        let session = Session::new();
        assert_eq!(session.state(), SessionState::Closed);
        assert!(!session.is_open());
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_session_open() {
        let session = Session::new();
        session.open().unwrap();

        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.is_open());
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_cannot_open_twice() {
        let session = Session::new();
        session.open().unwrap();
        assert!(session.open().is_err());
    }

    #[test]
    fn test_transitions_require_open() {
        let session = Session::new();
        assert!(session.transition(SessionState::Pending).is_err());

        session.open().unwrap();
        session.transition(SessionState::Pending).unwrap();
        session.transition(SessionState::Authenticated).unwrap();
        assert!(session.is_authenticated());

        // Re-polling after a failure is allowed.
        session.transition(SessionState::Failed).unwrap();
        session.transition(SessionState::Authenticated).unwrap();
    }

    #[test]
    fn test_close_is_not_a_transition() {
        let session = Session::new();
        session.open().unwrap();
        assert!(session.transition(SessionState::Closed).is_err());

        session.close();
        assert_eq!(session.state(), SessionState::Closed);
    }

    #[test]
    fn test_repeater_memo() {
        let session = Session::new();
        session.open().unwrap();

        assert!(session.needs_repeater_check(7));
        session.record_repeater_pass(7);
        assert!(!session.needs_repeater_check(7));
        assert!(session.needs_repeater_check(8));
    }

    #[test]
    fn test_close_clears_memo_and_allows_reopen() {
        let session = Session::new();
        session.open().unwrap();
        session.record_repeater_pass(7);

        session.close();
        session.open().unwrap();
        assert!(session.needs_repeater_check(7));
    }

    #[test]
    fn test_session_clone_shares_state() {
        let session = Session::new();
        session.open().unwrap();

        let twin = session.clone();
        session.transition(SessionState::Authenticated).unwrap();
        assert!(twin.is_authenticated());
    }
}
