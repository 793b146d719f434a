use super::*;

/// Encode `(device, address)` as the four binary-frame bytes: little-endian
/// `address`, with the high byte overwritten by the device's tag.
pub fn encode_binary(device: DeviceCode, address: u32) -> [u8; 4] {
    let mut bytes = (address & 0x00FF_FFFF).to_le_bytes();
    bytes[3] = device.tag();
    bytes
}

/// Encode `(device, address)` as the ASCII-frame mnemonic + 6-digit text.
///
/// The mnemonic is `*`-padded to two columns if it's a single character.
/// Digits are hex for the device codes in `[0x9C, 0xA3]`, decimal otherwise;
/// truncated to the last six characters if longer, left-padded with `0` if
/// shorter.
pub fn encode_ascii(device: DeviceCode, address: u32) -> String {
    let mnemonic = device.mnemonic();
    let digits = if device.is_hex_addressed() {
        format!("{:X}", address)
    } else {
        format!("{}", address)
    };
    let digits = if digits.len() > 6 {
        digits[digits.len() - 6..].to_string()
    } else {
        format!("{:0>6}", digits)
    };

    if mnemonic.len() == 1 {
        format!("{}*{}", mnemonic, digits)
    } else {
        format!("{}{}", mnemonic, digits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn m_12345_decimal() {
        assert_eq!(encode_ascii(DeviceCode::M, 12345), "M*012345");
        assert_eq!(encode_binary(DeviceCode::M, 12345), [0x39, 0x30, 0x00, 0x90]);
    }

    #[test]
    fn d_100_decimal() {
        assert_eq!(encode_ascii(DeviceCode::D, 100), "D*000100");
        assert_eq!(encode_binary(DeviceCode::D, 100), [0x64, 0x00, 0x00, 0xA8]);
    }

    #[test]
    fn x_hex_addressed() {
        assert_eq!(encode_ascii(DeviceCode::X, 0x1F), "X*00001F");
        assert_eq!(encode_binary(DeviceCode::X, 0x1F), [0x1F, 0x00, 0x00, 0x9C]);
    }

    #[test]
    fn two_char_mnemonic_is_not_padded() {
        assert_eq!(encode_ascii(DeviceCode::ZR, 5), "ZR000005");
    }

    #[test]
    fn overlong_digits_are_truncated_to_last_six() {
        // 1_234_567 is seven decimal digits; only the last six survive.
        assert_eq!(encode_ascii(DeviceCode::M, 1_234_567), "M*234567");
    }
}
