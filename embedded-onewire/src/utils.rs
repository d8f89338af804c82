/// Calculate CRC-8 used in 1-Wire communications (`x^8 + x^5 + x^4 + 1`, reflected).
#[derive(Debug, Default)]
pub struct OneWireCrc(u8);

const POLY: u8 = 0x8c;

#[cfg(feature = "crc-table")]
static CRC_TABLE: [u8; 256] = {
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        table[i] = shift_byte(i as u8);
        i += 1;
    }
    table
};

const fn shift_byte(mut crc: u8) -> u8 {
    let mut i = 0;
    while i < 8 {
        crc = if crc & 0x1 == 0x1 {
            (crc >> 1) ^ POLY
        } else {
            crc >> 1
        };
        i += 1;
    }
    crc
}

impl OneWireCrc {
    /// Get the current CRC value
    pub fn value(&self) -> u8 {
        self.0
    }

    /// Update the CRC with the incoming byte.
    pub fn update(&mut self, byte: u8) {
        #[cfg(feature = "crc-table")]
        {
            self.0 = CRC_TABLE[(self.0 ^ byte) as usize];
        }
        #[cfg(not(feature = "crc-table"))]
        {
            self.0 = shift_byte(self.0 ^ byte);
        }
    }

    /// CRC of a whole sequence.
    pub fn compute(sequence: &[u8]) -> u8 {
        let mut crc = OneWireCrc(0);
        sequence.iter().for_each(|&b| crc.update(b));
        crc.0
    }

    /// Validate a sequence of bytes where the last byte is the 1-Wire CRC of
    /// the previous bytes.
    pub fn validate(sequence: &[u8]) -> bool {
        // Running the CRC over data followed by its own CRC always yields zero.
        !sequence.is_empty() && Self::compute(sequence) == 0x0
    }
}
