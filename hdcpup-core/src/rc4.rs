//! RC4 stream cipher
//!
//! Used in exactly one place: decrypting the vendor key glob under the
//! compiled-in glob key. The keystream is XOR-symmetric, so the same
//! routine builds test globs.

/// RC4 keystream state.
pub struct Rc4 {
    s: [u8; 256],
    i: u8,
    j: u8,
}

impl Rc4 {
    /// Key-schedule a new keystream. Key length 1..=256 bytes.
    pub fn new(key: &[u8]) -> Self {
        debug_assert!(!key.is_empty() && key.len() <= 256);

        let mut s = [0u8; 256];
        for (index, slot) in s.iter_mut().enumerate() {
            *slot = index as u8;
        }

        let mut j: u8 = 0;
        for i in 0..256 {
            j = j
                .wrapping_add(s[i])
                .wrapping_add(key[i % key.len()]);
            s.swap(i, j as usize);
        }

        Self { s, i: 0, j: 0 }
    }

    fn next_byte(&mut self) -> u8 {
        self.i = self.i.wrapping_add(1);
        self.j = self.j.wrapping_add(self.s[self.i as usize]);
        self.s.swap(self.i as usize, self.j as usize);
        let index = self.s[self.i as usize].wrapping_add(self.s[self.j as usize]);
        self.s[index as usize]
    }

    /// XOR the keystream over `data` in place.
    pub fn apply(&mut self, data: &mut [u8]) {
        for byte in data.iter_mut() {
            *byte ^= self.next_byte();
        }
    }
}
