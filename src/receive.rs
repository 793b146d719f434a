// Copyright 2019 Petar Dambovaliev. All rights reserved.
// This software may be modified and distributed under the terms
// of the BSD license. See the LICENSE file for details.

//! The result of a read: an opaque byte buffer with typed accessors.

use crate::codec::unpack_bools_lsb_first;
use crate::device::DeviceCode;
use byteorder::{ByteOrder, LittleEndian};

/// Bytes read back from a device, with accessors that reinterpret them as
/// arrays of the protocol's scalar types. A trailing partial element is
/// zero-padded.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiveItem {
    device: DeviceCode,
    address: u32,
    bytes: Vec<u8>,
}

/// pad `bytes` out to a multiple of `size` with zero bytes, so a trailing
/// partial element can still be decoded.
fn padded(bytes: &[u8], size: usize) -> Vec<u8> {
    let mut out = bytes.to_vec();
    let rem = out.len() % size;
    if rem != 0 {
        out.resize(out.len() + (size - rem), 0);
    }
    out
}

impl ReceiveItem {
    pub fn new(device: DeviceCode, address: u32, bytes: Vec<u8>) -> Self {
        ReceiveItem {
            device,
            address,
            bytes,
        }
    }

    pub fn device(&self) -> DeviceCode {
        self.device
    }

    pub fn address(&self) -> u32 {
        self.address
    }

    pub fn get_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// 16 bools per 2-byte word, bit 0 of the low byte first.
    pub fn get_bool_array(&self) -> Vec<bool> {
        unpack_bools_lsb_first(&self.bytes)
    }

    pub fn get_i16_array(&self) -> Vec<i16> {
        let buf = padded(&self.bytes, 2);
        buf.chunks_exact(2).map(LittleEndian::read_i16).collect()
    }

    pub fn get_u16_array(&self) -> Vec<u16> {
        let buf = padded(&self.bytes, 2);
        buf.chunks_exact(2).map(LittleEndian::read_u16).collect()
    }

    pub fn get_i32_array(&self) -> Vec<i32> {
        let buf = padded(&self.bytes, 4);
        buf.chunks_exact(4).map(LittleEndian::read_i32).collect()
    }

    pub fn get_u32_array(&self) -> Vec<u32> {
        let buf = padded(&self.bytes, 4);
        buf.chunks_exact(4).map(LittleEndian::read_u32).collect()
    }

    pub fn get_i64_array(&self) -> Vec<i64> {
        let buf = padded(&self.bytes, 8);
        buf.chunks_exact(8).map(LittleEndian::read_i64).collect()
    }

    pub fn get_u64_array(&self) -> Vec<u64> {
        let buf = padded(&self.bytes, 8);
        buf.chunks_exact(8).map(LittleEndian::read_u64).collect()
    }

    pub fn get_f32_array(&self) -> Vec<f32> {
        let buf = padded(&self.bytes, 4);
        buf.chunks_exact(4).map(LittleEndian::read_f32).collect()
    }

    pub fn get_f64_array(&self) -> Vec<f64> {
        let buf = padded(&self.bytes, 8);
        buf.chunks_exact(8).map(LittleEndian::read_f64).collect()
    }

    /// the bytes as an ASCII string, trailing NUL bytes trimmed.
    pub fn get_string(&self) -> String {
        let end = self
            .bytes
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(self.bytes.len());
        String::from_utf8_lossy(&self.bytes[..end]).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int16_array_from_scenario_1() {
        let item = ReceiveItem::new(
            DeviceCode::D,
            100,
            vec![0x01, 0x00, 0x02, 0x00],
        );
        assert_eq!(item.get_i16_array(), vec![1, 2]);
    }

    #[test]
    fn trailing_partial_word_is_zero_padded() {
        let item = ReceiveItem::new(DeviceCode::D, 0, vec![0x2A]);
        assert_eq!(item.get_i16_array(), vec![0x002A]);
    }

    #[test]
    fn bool_array_bit_order() {
        // low byte 0b0000_0001 -> bit0 set; high byte 0b0000_0010 -> bit1 set.
        let item = ReceiveItem::new(DeviceCode::M, 0, vec![0b0000_0001, 0b0000_0010]);
        let bools = item.get_bool_array();
        assert!(bools[0]);
        assert!(!bools[1]);
        assert!(bools[9]);
    }

    #[test]
    fn string_trims_at_first_nul() {
        let item = ReceiveItem::new(DeviceCode::D, 0, b"HI\0\0".to_vec());
        assert_eq!(item.get_string(), "HI");
    }
}
