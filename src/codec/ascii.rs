use super::*;

/// Render bytes as uppercase hex text, two characters per byte, no swap.
pub fn to_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        out.push_str(&format!("{:02X}", b));
    }
    out
}

/// Parse uppercase (or lowercase) hex text back into bytes.
pub fn from_hex(text: &str) -> Result<Vec<u8>, Error> {
    if text.len() % 2 != 0 {
        return Err(Error::ProtocolMismatch);
    }
    (0..text.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&text[i..i + 2], 16).map_err(|_| Error::ProtocolMismatch))
        .collect()
}

/// Swap every consecutive byte pair: `[b0, b1, b2, b3, ..] -> [b1, b0, b3, b2, ..]`.
///
/// This is its own inverse, and is the primitive both sides of the wire use:
/// the encoder calls it to turn a little-endian word into `hi||lo` text
/// order, and the parser calls it again to undo that swap on a decoded
/// response (§4.3 "every word is swapped `[lo,hi]->[hi,lo]`").
pub fn swap_word_pairs(bytes: &[u8]) -> Vec<u8> {
    let mut out = bytes.to_vec();
    let mut chunks = out.chunks_exact_mut(2);
    for pair in &mut chunks {
        pair.swap(0, 1);
    }
    out
}

/// Encode a little-endian byte buffer as ASCII hex, applying the word swap
/// (`hi||lo` per 2-byte word). Used for values no wider than 2 bytes.
pub fn encode_words(bytes: &[u8]) -> String {
    to_hex(&swap_word_pairs(bytes))
}

/// Encode a little-endian 4-byte buffer as ASCII hex, applying the dword
/// swap (`byte3||byte2||byte1||byte0`). Used for 4-byte values.
pub fn encode_dword(bytes: &[u8; 4]) -> String {
    format!(
        "{:02X}{:02X}{:02X}{:02X}",
        bytes[3], bytes[2], bytes[1], bytes[0]
    )
}

/// Encode a little-endian byte buffer as ASCII hex, chunked in `unit_size`
/// bytes (`2` for the word swap, `4` for the dword swap) and concatenated.
/// An 8-byte value (i64/u64/f64) is encoded as two dword chunks this way.
pub fn encode_value_text(bytes: &[u8], unit_size: usize) -> String {
    if unit_size == 4 {
        bytes
            .chunks(4)
            .map(|chunk| {
                let mut arr = [0u8; 4];
                arr[..chunk.len()].copy_from_slice(chunk);
                encode_dword(&arr)
            })
            .collect()
    } else {
        encode_words(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_swap_is_its_own_inverse() {
        let bytes = [0x04, 0x03, 0x02, 0x01];
        let swapped = swap_word_pairs(&bytes);
        assert_eq!(swapped, vec![0x03, 0x04, 0x01, 0x02]);
        assert_eq!(swap_word_pairs(&swapped), bytes);
    }

    #[test]
    fn dword_swap_reverses_all_four_bytes() {
        assert_eq!(encode_dword(&[0x04, 0x03, 0x02, 0x01]), "01020304");
    }

    #[test]
    fn hex_round_trips() {
        let bytes = vec![0xDE, 0xAD, 0xBE, 0xEF];
        assert_eq!(from_hex(&to_hex(&bytes)).unwrap(), bytes);
    }
}
