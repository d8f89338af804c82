/// Packs a value into binary-coded decimal, one decimal digit per nibble.
///
/// Only two-digit values (0-99) fit in a register byte; larger values lose their high digits.
pub const fn binary_to_bcd(mut value: u8) -> u8 {
    let mut bcd = 0;
    let mut shift = 0;
    while value > 0 && shift < 8 {
        bcd |= (value % 10) << shift;
        value /= 10;
        shift += 4;
    }
    bcd
}

/// Unpacks a binary-coded decimal byte.
pub const fn bcd_to_binary(bcd: u8) -> u8 {
    10 * (bcd >> 4) + (bcd & 0x0f)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_go_to_nibbles() {
        assert_eq!(binary_to_bcd(0), 0x00);
        assert_eq!(binary_to_bcd(7), 0x07);
        assert_eq!(binary_to_bcd(35), 0x35);
        assert_eq!(binary_to_bcd(59), 0x59);
        assert_eq!(binary_to_bcd(99), 0x99);
        assert_eq!(bcd_to_binary(0x50), 50);
        assert_eq!(bcd_to_binary(0x12), 12);
    }

    #[test]
    fn round_trip_over_register_range() {
        for n in 0..=99 {
            assert_eq!(bcd_to_binary(binary_to_bcd(n)), n);
        }
    }

    #[test]
    fn random_values_stay_decimal() {
        for _ in 0..100 {
            let n: u8 = rand::random_range(0..=99);
            let bcd = binary_to_bcd(n);
            assert!(bcd & 0x0f <= 9 && bcd >> 4 <= 9, "{n} -> {bcd:#04x}");
        }
    }
}
