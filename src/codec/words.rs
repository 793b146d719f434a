use super::*;
use crate::value::Value;

fn ascii_byte(c: char) -> Result<u8, Error> {
    if c.is_ascii() {
        Ok(c as u8)
    } else {
        Err(Error::InvalidPlcDataFormat(format!(
            "non-ASCII character {:?}",
            c
        )))
    }
}

fn pad_even(mut bytes: Vec<u8>) -> Vec<u8> {
    if bytes.len() % 2 != 0 {
        bytes.push(0x00);
    }
    bytes
}

/// Encode any non-bit `Value` into its raw little-endian byte form, per the
/// word-granular table in §4.1. Used directly for single-point writes, and
/// as the byte source [`classify_for_random_write`] slices into slots.
pub fn encode_value_bytes(value: &Value) -> Result<Vec<u8>, Error> {
    Ok(match value {
        Value::U8(v) => vec![*v, 0x00],
        Value::Char(c) => vec![ascii_byte(*c)?, 0x00],
        Value::I16(v) => v.to_le_bytes().to_vec(),
        Value::U16(v) => v.to_le_bytes().to_vec(),
        Value::I32(v) => v.to_le_bytes().to_vec(),
        Value::U32(v) => v.to_le_bytes().to_vec(),
        Value::F32(v) => v.to_le_bytes().to_vec(),
        Value::I64(v) => v.to_le_bytes().to_vec(),
        Value::U64(v) => v.to_le_bytes().to_vec(),
        Value::F64(v) => v.to_le_bytes().to_vec(),
        Value::Chars(cs) => {
            let bytes: Result<Vec<u8>, Error> = cs.iter().map(|c| ascii_byte(*c)).collect();
            pad_even(bytes?)
        }
        Value::Bytes(b) => pad_even(b.clone()),
        Value::Str(s) => pad_even(s.as_bytes().to_vec()),
        Value::I16s(vs) => vs.iter().flat_map(|v| v.to_le_bytes()).collect(),
        Value::U16s(vs) => vs.iter().flat_map(|v| v.to_le_bytes()).collect(),
        Value::I32s(vs) => vs.iter().flat_map(|v| v.to_le_bytes()).collect(),
        Value::U32s(vs) => vs.iter().flat_map(|v| v.to_le_bytes()).collect(),
        Value::I64s(vs) => vs.iter().flat_map(|v| v.to_le_bytes()).collect(),
        Value::U64s(vs) => vs.iter().flat_map(|v| v.to_le_bytes()).collect(),
        Value::F32s(vs) => vs.iter().flat_map(|v| v.to_le_bytes()).collect(),
        Value::F64s(vs) => vs.iter().flat_map(|v| v.to_le_bytes()).collect(),
        Value::Bool(_) | Value::Bools(_) => {
            return Err(Error::InvalidPlcDataFormat(
                "bool values are bit-packed, not word-granular".into(),
            ))
        }
    })
}

/// Whether a random-write point needs a 2-byte (word) or 4-byte (dword) slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    Word,
    Dword,
}

/// One point in a random read/write frame: its byte content, its kind, and
/// its address offset in whole words relative to the item's base address.
#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    pub kind: SlotKind,
    pub word_offset: u32,
    pub bytes: Vec<u8>,
}

impl Slot {
    fn word(word_offset: u32, bytes: Vec<u8>) -> Self {
        Slot {
            kind: SlotKind::Word,
            word_offset,
            bytes,
        }
    }

    fn dword(word_offset: u32, bytes: Vec<u8>) -> Self {
        Slot {
            kind: SlotKind::Dword,
            word_offset,
            bytes,
        }
    }
}

/// as many whole 4-byte dword slots as fit, then one 2-byte word slot if
/// 1-2 bytes remain. Used for strings, char-sequences, and byte-sequences.
fn classify_bytes(bytes: &[u8]) -> Vec<Slot> {
    let padded = pad_even(bytes.to_vec());
    let mut slots = Vec::new();
    let mut offset = 0u32;
    let mut chunks = padded.chunks_exact(4);
    for chunk in &mut chunks {
        slots.push(Slot::dword(offset, chunk.to_vec()));
        offset += 2;
    }
    let rem = chunks.remainder();
    if rem.len() == 2 {
        slots.push(Slot::word(offset, rem.to_vec()));
    }
    slots
}

fn classify_seq<T: Copy, F: Fn(T) -> Vec<u8>>(
    vals: &[T],
    words_per_item: u32,
    to_bytes: F,
    kind: SlotKind,
) -> Vec<Slot> {
    vals.iter()
        .enumerate()
        .map(|(i, v)| Slot {
            kind,
            word_offset: i as u32 * words_per_item,
            bytes: to_bytes(*v),
        })
        .collect()
}

/// i64/u64/f64 occupy two consecutive dword slots (the value split into
/// two 4-byte halves).
fn split_wide(word_offset: u32, bytes: [u8; 8]) -> Vec<Slot> {
    vec![
        Slot::dword(word_offset, bytes[0..4].to_vec()),
        Slot::dword(word_offset + 2, bytes[4..8].to_vec()),
    ]
}

/// Classify one write value into the word-slot / dword-slot points a
/// random-write frame carries, per §4.1 "Classification of write payloads".
///
/// The original source's fallback ("on a TryParse-style failure to classify
/// as dword, fall back to word encoding") applied to its dynamically-typed
/// value field; it has no counterpart here, since `Value`'s variant already
/// fixes the classification at compile time.
pub fn classify_for_random_write(value: &Value) -> Result<Vec<Slot>, Error> {
    Ok(match value {
        Value::U8(v) => vec![Slot::word(0, vec![*v, 0x00])],
        Value::Char(c) => vec![Slot::word(0, vec![ascii_byte(*c)?, 0x00])],
        Value::I16(v) => vec![Slot::word(0, v.to_le_bytes().to_vec())],
        Value::U16(v) => vec![Slot::word(0, v.to_le_bytes().to_vec())],
        Value::I32(v) => vec![Slot::dword(0, v.to_le_bytes().to_vec())],
        Value::U32(v) => vec![Slot::dword(0, v.to_le_bytes().to_vec())],
        Value::F32(v) => vec![Slot::dword(0, v.to_le_bytes().to_vec())],
        Value::I64(v) => split_wide(0, v.to_le_bytes()),
        Value::U64(v) => split_wide(0, v.to_le_bytes()),
        Value::F64(v) => split_wide(0, v.to_le_bytes()),
        Value::Chars(cs) => {
            let bytes: Result<Vec<u8>, Error> = cs.iter().map(|c| ascii_byte(*c)).collect();
            classify_bytes(&bytes?)
        }
        Value::Bytes(b) => classify_bytes(b),
        Value::Str(s) => classify_bytes(s.as_bytes()),
        Value::I16s(vs) => classify_seq(vs, 1, |v| v.to_le_bytes().to_vec(), SlotKind::Word),
        Value::U16s(vs) => classify_seq(vs, 1, |v| v.to_le_bytes().to_vec(), SlotKind::Word),
        Value::I32s(vs) => classify_seq(vs, 2, |v| v.to_le_bytes().to_vec(), SlotKind::Dword),
        Value::U32s(vs) => classify_seq(vs, 2, |v| v.to_le_bytes().to_vec(), SlotKind::Dword),
        Value::F32s(vs) => classify_seq(vs, 2, |v| v.to_le_bytes().to_vec(), SlotKind::Dword),
        Value::I64s(vs) => vs
            .iter()
            .enumerate()
            .flat_map(|(i, v)| split_wide(i as u32 * 4, v.to_le_bytes()))
            .collect(),
        Value::U64s(vs) => vs
            .iter()
            .enumerate()
            .flat_map(|(i, v)| split_wide(i as u32 * 4, v.to_le_bytes()))
            .collect(),
        Value::F64s(vs) => vs
            .iter()
            .enumerate()
            .flat_map(|(i, v)| split_wide(i as u32 * 4, v.to_le_bytes()))
            .collect(),
        Value::Bool(_) | Value::Bools(_) => {
            return Err(Error::InvalidPlcDataFormat(
                "bool values go through the random-write bit frame, not the word/dword frame"
                    .into(),
            ))
        }
    })
}

/// the ASCII chunk size (2 or 4 bytes) [`encode_value_bytes`]'s output must
/// be swapped in, per the word-granular table in §4.1.
fn ascii_unit_size(value: &Value) -> usize {
    match value {
        Value::U8(_)
        | Value::Char(_)
        | Value::I16(_)
        | Value::U16(_)
        | Value::Str(_)
        | Value::Chars(_)
        | Value::Bytes(_)
        | Value::I16s(_)
        | Value::U16s(_) => 2,
        _ => 4,
    }
}

/// Encode a non-bit `Value` as the ASCII text an outgoing frame carries:
/// the same bytes [`encode_value_bytes`] produces, swapped word-by-word or
/// dword-by-dword depending on the value's wire width.
pub fn encode_value_ascii(value: &Value) -> Result<String, Error> {
    let bytes = encode_value_bytes(value)?;
    Ok(crate::codec::encode_value_text(&bytes, ascii_unit_size(value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn u8_is_one_word_slot() {
        let slots = classify_for_random_write(&Value::U8(7)).unwrap();
        assert_eq!(slots, vec![Slot::word(0, vec![7, 0])]);
    }

    #[test]
    fn i64_is_two_dword_slots() {
        let slots = classify_for_random_write(&Value::I64(0x0102_0304_0506_0708)).unwrap();
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[0].kind, SlotKind::Dword);
        assert_eq!(slots[0].word_offset, 0);
        assert_eq!(slots[1].word_offset, 2);
    }

    #[test]
    fn string_splits_dwords_then_trailing_word() {
        let slots = classify_for_random_write(&Value::Str("ABCDE".into())).unwrap();
        // "ABCDE" -> 5 bytes -> padded to 6 -> one dword ("ABCD") + one word ("E\0")
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[0].kind, SlotKind::Dword);
        assert_eq!(slots[0].bytes, b"ABCD".to_vec());
        assert_eq!(slots[1].kind, SlotKind::Word);
        assert_eq!(slots[1].bytes, vec![b'E', 0]);
    }

    #[test]
    fn i32_sequence_advances_two_words_per_item() {
        let slots = classify_for_random_write(&Value::I32s(vec![1, 2, 3])).unwrap();
        assert_eq!(
            slots.iter().map(|s| s.word_offset).collect::<Vec<_>>(),
            vec![0, 2, 4]
        );
    }

    #[test]
    fn single_point_write_encoding_matches_scenario_2() {
        // D200 = i32(0x01020304) -> LE bytes 04 03 02 01
        let bytes = encode_value_bytes(&Value::I32(0x0102_0304)).unwrap();
        assert_eq!(bytes, vec![0x04, 0x03, 0x02, 0x01]);
    }

    #[test]
    fn ascii_value_text_applies_dword_swap_for_i32() {
        let text = encode_value_ascii(&Value::I32(0x0102_0304)).unwrap();
        assert_eq!(text, "01020304");
    }

    #[test]
    fn ascii_value_text_applies_word_swap_for_i16() {
        let text = encode_value_ascii(&Value::I16(0x0102)).unwrap();
        assert_eq!(text, "0102");
    }
}
