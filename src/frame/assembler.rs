use super::*;
use crate::codec;

/// whether a random-read point is satisfied by a single word (2 bytes) or
/// a dword (4 bytes). Random read carries no explicit word count per
/// point, so the requested `word_count` is the only signal: `1` selects a
/// word point, `2` selects a dword point. Any other count can't be placed
/// in a random-read frame at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadKind {
    Word,
    Dword,
}

pub fn classify_read_word_count(word_count: u16) -> Result<ReadKind, Error> {
    match word_count {
        1 => Ok(ReadKind::Word),
        2 => Ok(ReadKind::Dword),
        other => Err(Error::InvalidPlcDataFormat(format!(
            "random read only supports a 1-word or 2-word (dword) point, got {} words",
            other
        ))),
    }
}

fn build_frame(
    opts: &FrameOptions,
    command: u16,
    subcommand: u16,
    payload_binary: &[u8],
    payload_ascii: &str,
) -> Vec<u8> {
    match opts.format {
        ProtocolFormat::Binary => {
            let mut data = Vec::with_capacity(6 + payload_binary.len());
            data.extend_from_slice(&opts.timeout_ticks.to_le_bytes());
            data.extend_from_slice(&command.to_le_bytes());
            data.extend_from_slice(&subcommand.to_le_bytes());
            data.extend_from_slice(payload_binary);

            let mut frame = Vec::with_capacity(9 + data.len());
            frame.push(0x50);
            frame.push(0x00);
            frame.push(opts.network_no);
            frame.push(opts.pc_no);
            frame.push(0xFF);
            frame.push(0x03);
            frame.push(0x00);
            frame.extend_from_slice(&(data.len() as u16).to_le_bytes());
            frame.extend_from_slice(&data);
            frame
        }
        ProtocolFormat::Ascii => {
            let data = format!(
                "{:04X}{:04X}{:04X}{}",
                opts.timeout_ticks, command, subcommand, payload_ascii
            );
            format!(
                "5000{:02X}{:02X}03FF00{:04X}{}",
                opts.network_no,
                opts.pc_no,
                data.chars().count(),
                data
            )
            .into_bytes()
        }
    }
}

/// Read a contiguous range of `word_count` words starting at `address`.
pub fn assemble_read_single(
    opts: &FrameOptions,
    device: DeviceCode,
    address: u32,
    word_count: u16,
) -> Vec<u8> {
    let payload_binary = {
        let mut buf = codec::encode_binary(device, address).to_vec();
        buf.extend_from_slice(&word_count.to_le_bytes());
        buf
    };
    let payload_ascii = format!(
        "{}{:04X}",
        codec::encode_ascii(device, address),
        word_count
    );
    build_frame(opts, CMD_READ, SUBCMD_WORD, &payload_binary, &payload_ascii)
}

/// Write one value at `address`. Dispatches to the bit or word/dword wire
/// shape depending on whether `value` is bit-shaped.
pub fn assemble_write_single(
    opts: &FrameOptions,
    device: DeviceCode,
    address: u32,
    value: &Value,
) -> Result<Vec<u8>, Error> {
    if value.is_bit() {
        let bits: Vec<bool> = match value {
            Value::Bool(b) => vec![*b],
            Value::Bools(bs) => bs.clone(),
            _ => unreachable!(),
        };
        let payload_binary = {
            let mut buf = codec::encode_binary(device, address).to_vec();
            buf.extend_from_slice(&(bits.len() as u16).to_le_bytes());
            buf.extend_from_slice(&codec::encode_bits_binary(&bits));
            buf
        };
        let payload_ascii = format!(
            "{}{:04X}{}",
            codec::encode_ascii(device, address),
            bits.len(),
            codec::encode_bits_ascii(&bits)
        );
        Ok(build_frame(opts, CMD_WRITE, SUBCMD_BIT, &payload_binary, &payload_ascii))
    } else {
        let bytes = codec::encode_value_bytes(value)?;
        let point_count = (bytes.len() / 2) as u16;
        let payload_binary = {
            let mut buf = codec::encode_binary(device, address).to_vec();
            buf.extend_from_slice(&point_count.to_le_bytes());
            buf.extend_from_slice(&bytes);
            buf
        };
        let payload_ascii = format!(
            "{}{:04X}{}",
            codec::encode_ascii(device, address),
            point_count,
            codec::encode_value_ascii(value)?
        );
        Ok(build_frame(opts, CMD_WRITE, SUBCMD_WORD, &payload_binary, &payload_ascii))
    }
}

/// Read a set of single-word or single-dword points scattered across
/// addresses, in one frame. `items` is `(device, address, word_count)`;
/// `word_count` must be `1` or `2` per point (see [`ReadKind`]).
pub fn assemble_random_read(
    opts: &FrameOptions,
    items: &[(DeviceCode, u32, u16)],
) -> Result<Vec<u8>, Error> {
    let mut word_points = Vec::new();
    let mut dword_points = Vec::new();
    for &(device, address, word_count) in items {
        match classify_read_word_count(word_count)? {
            ReadKind::Word => word_points.push((device, address)),
            ReadKind::Dword => dword_points.push((device, address)),
        }
    }
    if word_points.len() > 255 || dword_points.len() > 255 {
        return Err(Error::MessageSizeOverflow);
    }

    let mut payload_binary = vec![word_points.len() as u8, dword_points.len() as u8];
    let mut payload_ascii = format!("{:02X}{:02X}", word_points.len(), dword_points.len());
    for &(device, address) in word_points.iter().chain(dword_points.iter()) {
        payload_binary.extend_from_slice(&codec::encode_binary(device, address));
        payload_ascii.push_str(&codec::encode_ascii(device, address));
    }

    Ok(build_frame(
        opts,
        CMD_RANDOM_READ,
        SUBCMD_WORD,
        &payload_binary,
        &payload_ascii,
    ))
}

/// Write a set of single-bit points scattered across addresses, in one
/// frame. Bit and word/dword points can never share a random-write frame
/// (§4.2), so a `Value::Bools` write is flattened by the caller into one
/// `(device, address + i, bit)` point per bit before reaching here.
pub fn assemble_random_write_bits(
    opts: &FrameOptions,
    items: &[(DeviceCode, u32, bool)],
) -> Result<Vec<u8>, Error> {
    if items.len() > 255 {
        return Err(Error::MessageSizeOverflow);
    }

    let mut payload_binary = vec![items.len() as u8];
    let mut payload_ascii = format!("{:02X}", items.len());
    for &(device, address, bit) in items {
        let addr_bytes = codec::encode_binary(device, address);
        payload_binary.extend_from_slice(&addr_bytes);
        payload_binary.push(device.tag());
        payload_binary.push(codec::encode_bit_binary(bit));

        payload_ascii.push_str(&codec::encode_ascii(device, address));
        payload_ascii.push(codec::encode_bit_ascii(bit));
    }

    Ok(build_frame(
        opts,
        CMD_RANDOM_WRITE,
        SUBCMD_BIT,
        &payload_binary,
        &payload_ascii,
    ))
}

/// Write a set of word/dword-granular values scattered across addresses,
/// in one frame. Each item is classified into one or more word/dword
/// slots per §4.1; slots are grouped word-points-first, then
/// dword-points, across all items, in the order the items were given.
pub fn assemble_random_write_words(
    opts: &FrameOptions,
    items: &[(DeviceCode, u32, Value)],
) -> Result<Vec<u8>, Error> {
    let mut word_points: Vec<(DeviceCode, u32, Vec<u8>)> = Vec::new();
    let mut dword_points: Vec<(DeviceCode, u32, Vec<u8>)> = Vec::new();

    for (device, address, value) in items {
        for slot in codec::classify_for_random_write(value)? {
            let actual_address = address.wrapping_add(slot.word_offset);
            match slot.kind {
                codec::SlotKind::Word => word_points.push((*device, actual_address, slot.bytes)),
                codec::SlotKind::Dword => dword_points.push((*device, actual_address, slot.bytes)),
            }
        }
    }

    if word_points.len() > 255 || dword_points.len() > 255 {
        return Err(Error::MessageSizeOverflow);
    }

    let mut payload_binary = vec![word_points.len() as u8, dword_points.len() as u8];
    let mut payload_ascii = format!("{:02X}{:02X}", word_points.len(), dword_points.len());
    for (device, address, bytes) in &word_points {
        payload_binary.extend_from_slice(&codec::encode_binary(*device, *address));
        payload_binary.extend_from_slice(bytes);
        payload_ascii.push_str(&codec::encode_ascii(*device, *address));
        payload_ascii.push_str(&codec::encode_value_text(bytes, 2));
    }
    for (device, address, bytes) in &dword_points {
        payload_binary.extend_from_slice(&codec::encode_binary(*device, *address));
        payload_binary.extend_from_slice(bytes);
        payload_ascii.push_str(&codec::encode_ascii(*device, *address));
        payload_ascii.push_str(&codec::encode_value_text(bytes, 4));
    }

    Ok(build_frame(
        opts,
        CMD_RANDOM_WRITE,
        SUBCMD_WORD,
        &payload_binary,
        &payload_ascii,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts() -> FrameOptions {
        FrameOptions {
            network_no: 0x00,
            pc_no: 0xFF,
            timeout_ticks: 16,
            format: ProtocolFormat::Binary,
        }
    }

    #[test]
    fn scenario_1_single_point_read() {
        let frame = assemble_read_single(&opts(), DeviceCode::D, 100, 2);
        assert_eq!(
            frame,
            vec![
                0x50, 0x00, 0x00, 0xFF, 0xFF, 0x03, 0x00, 0x0C, 0x00, 0x10, 0x00, 0x01, 0x04,
                0x00, 0x00, 0x64, 0x00, 0x00, 0xA8, 0x02, 0x00,
            ]
        );
    }

    #[test]
    fn scenario_2_single_point_write() {
        let frame = assemble_write_single(&opts(), DeviceCode::D, 200, &Value::I32(0x0102_0304))
            .unwrap();
        assert_eq!(
            frame,
            vec![
                0x50, 0x00, 0x00, 0xFF, 0xFF, 0x03, 0x00, 0x10, 0x00, 0x10, 0x00, 0x01, 0x14,
                0x00, 0x00, 0xC8, 0x00, 0x00, 0xA8, 0x02, 0x00, 0x04, 0x03, 0x02, 0x01,
            ]
        );
    }

    #[test]
    fn random_read_splits_word_and_dword_points() {
        let frame =
            assemble_random_read(&opts(), &[(DeviceCode::D, 0, 1), (DeviceCode::D, 10, 2)])
                .unwrap();
        // command/subcommand + wordCount=1 dwordCount=1 + [D,0] + [D,10]
        let data = &frame[9..];
        assert_eq!(&data[0..6], &[0x10, 0x00, 0x03, 0x04, 0x00, 0x00]);
        assert_eq!(&data[6..8], &[0x01, 0x01]);
        assert_eq!(&data[8..12], &codec::encode_binary(DeviceCode::D, 0));
        assert_eq!(&data[12..16], &codec::encode_binary(DeviceCode::D, 10));
    }

    #[test]
    fn random_write_overflow_is_rejected_before_any_bytes_are_built() {
        let items: Vec<(DeviceCode, u32, Value)> = (0..300)
            .map(|i| (DeviceCode::D, i as u32, Value::I16(0)))
            .collect();
        let err = assemble_random_write_words(&opts(), &items).unwrap_err();
        assert!(matches!(err, Error::MessageSizeOverflow));
    }

    #[test]
    fn ascii_single_point_read_header() {
        let mut o = opts();
        o.format = ProtocolFormat::Ascii;
        let frame = assemble_read_single(&o, DeviceCode::D, 100, 2);
        let text = String::from_utf8(frame).unwrap();
        assert!(text.starts_with("5000"));
        assert!(text.contains("D*000100"));
    }
}
