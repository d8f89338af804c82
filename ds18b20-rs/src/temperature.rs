use core::fmt;

use fixed::types::I12F4;

/// Temperature in °C as a 12.4 fixed-point number, the device's native format.
pub type Temperature = I12F4;

/// Raw temperature word captured from the first two scratchpad bytes.
///
/// Stored most-significant byte first. The value is a two's-complement count of 1/16 °C;
/// lower resolutions leave the low bits undefined, which only adds up to 15/16 °C of noise.
///
/// A sample belongs to the conversion that preceded the read; the next reset pulse starts a new
/// transaction and the device may overwrite the scratchpad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TemperatureSample {
    bytes: [u8; 2],
}

impl TemperatureSample {
    /// Build a sample from the word bytes, most significant first.
    pub const fn new(msb: u8, lsb: u8) -> Self {
        Self { bytes: [msb, lsb] }
    }

    /// Build a sample from scratchpad bytes 0 and 1 as they come off the wire (LSB first).
    pub const fn from_scratchpad(wire: [u8; 2]) -> Self {
        Self::new(wire[1], wire[0])
    }

    /// `[msb, lsb]`.
    pub const fn bytes(&self) -> [u8; 2] {
        self.bytes
    }

    /// Most significant byte of the word (sign and integer bits).
    pub const fn msb(&self) -> u8 {
        self.bytes[0]
    }

    /// Least significant byte of the word (integer and fraction bits).
    pub const fn lsb(&self) -> u8 {
        self.bytes[1]
    }

    /// The word as a signed count of 1/16 °C.
    pub const fn raw(&self) -> i16 {
        i16::from_be_bytes(self.bytes)
    }

    /// Temperature in degrees Celsius.
    pub fn celsius(&self) -> f32 {
        f32::from(self.raw()) / 16.0
    }

    /// Temperature as fixed point, exact for every word.
    pub fn to_fixed(&self) -> Temperature {
        Temperature::from_bits(self.raw())
    }
}

impl From<TemperatureSample> for Temperature {
    fn from(sample: TemperatureSample) -> Self {
        sample.to_fixed()
    }
}

impl fmt::Display for TemperatureSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} °C", self.to_fixed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_25_degrees() {
        let sample = TemperatureSample::new(0x01, 0x90);
        assert_eq!(sample.raw(), 400);
        assert_eq!(sample.celsius(), 25.0);
        assert_eq!(sample.to_fixed(), Temperature::from_num(25));
    }

    #[test]
    fn scratchpad_order_is_swapped() {
        let sample = TemperatureSample::from_scratchpad([0x90, 0x01]);
        assert_eq!(sample.bytes(), [0x01, 0x90]);
        assert_eq!(sample.msb(), 0x01);
        assert_eq!(sample.lsb(), 0x90);
    }

    #[test]
    fn negative_words_are_sign_extended() {
        // Datasheet table: 0xFF5E = -10.125 °C, 0xFC90 = -55 °C.
        assert_eq!(TemperatureSample::new(0xff, 0x5e).celsius(), -10.125);
        assert_eq!(TemperatureSample::new(0xfc, 0x90).celsius(), -55.0);
        assert_eq!(TemperatureSample::new(0xff, 0xf8).celsius(), -0.5);
    }

    #[test]
    fn float_and_fixed_agree_across_range() {
        for _ in 0..256 {
            // Device range is -55 °C to +125 °C.
            let raw: i16 = rand::random_range(-55 * 16..=125 * 16);
            let sample = TemperatureSample::new((raw >> 8) as u8, raw as u8);
            assert_eq!(sample.raw(), raw);
            assert_eq!(sample.celsius(), sample.to_fixed().to_num::<f32>());
        }
    }
}
