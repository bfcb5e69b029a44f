//! Link status words

use std::fmt;

use bitflags::bitflags;

bitflags! {
    /// 16-bit status word reported by the link driver with every status
    /// record.
    ///
    /// Only the named bits are interpreted by the engine; the whole word
    /// participates in key derivation, so unknown bits are preserved.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct StatusFlags: u16 {
        /// The driver holds a valid, attached link
        const LINK_VALID = 1 << 0;

        /// Link encryption is currently enabled
        const ENCRYPTING = 1 << 2;

        /// The attached sink is a repeater and exposes a downstream
        /// device list
        const REPEATER = 1 << 8;

        /// The output drives both links of a dual-link connection
        const DUAL_LINK = 1 << 12;
    }
}

impl StatusFlags {
    /// Build from the raw driver word, keeping undefined bits.
    pub fn from_raw(raw: u16) -> Self {
        Self::from_bits_retain(raw)
    }
}

/// Repeater topology status word (Bstatus).
///
/// Packs the downstream device count and cascade depth together with the
/// topology-overflow flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BStatus(u16);

impl BStatus {
    const DEVICE_COUNT_MASK: u16 = 0x007f;
    const MAX_DEVS_EXCEEDED: u16 = 1 << 7;
    const DEPTH_SHIFT: u16 = 8;
    const DEPTH_MASK: u16 = 0x0700;
    const MAX_CASCADE_EXCEEDED: u16 = 1 << 11;
    const HDMI_MODE: u16 = 1 << 12;

    pub fn new(raw: u16) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u16 {
        self.0
    }

    /// Number of downstream devices attached to the repeater (0..=127).
    pub fn device_count(self) -> u8 {
        (self.0 & Self::DEVICE_COUNT_MASK) as u8
    }

    /// Repeater cascade depth below this link (0..=7).
    pub fn depth(self) -> u8 {
        ((self.0 & Self::DEPTH_MASK) >> Self::DEPTH_SHIFT) as u8
    }

    /// More than 127 downstream devices were seen.
    pub fn max_devs_exceeded(self) -> bool {
        self.0 & Self::MAX_DEVS_EXCEEDED != 0
    }

    /// More than 7 repeater levels were seen.
    pub fn max_cascade_exceeded(self) -> bool {
        self.0 & Self::MAX_CASCADE_EXCEEDED != 0
    }

    /// The repeater operates in HDMI mode rather than DVI.
    pub fn hdmi_mode(self) -> bool {
        self.0 & Self::HDMI_MODE != 0
    }
}

impl fmt::Display for BStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Bstatus[devices={}, depth={}]",
            self.device_count(),
            self.depth()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_status_flags_from_raw_keeps_unknown_bits() {
        let status = StatusFlags::from_raw(0x1105);
        assert!(status.contains(StatusFlags::LINK_VALID));
        assert!(status.contains(StatusFlags::ENCRYPTING));
        assert!(status.contains(StatusFlags::REPEATER));
        assert!(status.contains(StatusFlags::DUAL_LINK));
        assert_eq!(status.bits(), 0x1105);

        let odd = StatusFlags::from_raw(0xffff);
        assert_eq!(odd.bits(), 0xffff);
    }

    #[test]
    fn test_bstatus_fields() {
        let bstatus = BStatus::new(0x0203);
        assert_eq!(bstatus.device_count(), 3);
        assert_eq!(bstatus.depth(), 2);
        assert!(!bstatus.max_devs_exceeded());
        assert!(!bstatus.max_cascade_exceeded());
        assert!(!bstatus.hdmi_mode());
    }

    #[test]
    fn test_bstatus_overflow_flags() {
        let bstatus = BStatus::new(0x0880);
        assert!(bstatus.max_devs_exceeded());
        assert!(bstatus.max_cascade_exceeded());
        assert_eq!(bstatus.device_count(), 0);

        assert!(BStatus::new(0x1000).hdmi_mode());
    }

    #[test]
    fn test_bstatus_display() {
        assert_eq!(BStatus::new(0x0203).to_string(), "Bstatus[devices=3, depth=2]");
    }
}
