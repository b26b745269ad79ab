//! X.25 CRC (CRC-16/MCRF4XX) as used by MAVLink framing and the checksum-extra seed.

/// Running X.25 checksum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct X25 {
    crc: u16,
}

impl Default for X25 {
    fn default() -> Self {
        X25 { crc: 0xFFFF }
    }
}

impl X25 {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accumulate(&mut self, bytes: &[u8]) {
        for &b in bytes {
            let mut tmp = b ^ (self.crc as u8);
            tmp ^= tmp << 4;
            let tmp = tmp as u16;
            self.crc = (self.crc >> 8) ^ (tmp << 8) ^ (tmp << 3) ^ (tmp >> 4);
        }
    }

    pub fn accumulate_str(&mut self, s: &str) {
        self.accumulate(s.as_bytes());
    }

    pub fn value(&self) -> u16 {
        self.crc
    }

    /// Fold the 16-bit checksum into the single checksum-extra byte.
    pub fn extra_byte(&self) -> u8 {
        (self.crc & 0xFF) as u8 ^ (self.crc >> 8) as u8
    }
}
