// Copyright 2019 Petar Dambovaliev. All rights reserved.
// This software may be modified and distributed under the terms
// of the BSD license. See the LICENSE file for details.

//! PLC device codes: the one-byte tags that select a memory area.

/// A PLC memory area, tagged by a single wire byte.
///
/// Codes in `[0x9C, 0xA3]` (`X`, `Y`, `B`, `SB`, `DX`, `DY`) are rendered in
/// hexadecimal in ASCII frames; every other code is rendered in decimal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(clippy::upper_case_acronyms)]
pub enum DeviceCode {
    M,
    SM,
    L,
    F,
    V,
    X,
    Y,
    B,
    SB,
    DX,
    DY,
    D,
    SD,
    R,
    ZR,
    W,
    SW,
    TC,
    TS,
    TN,
    CC,
    CS,
    CN,
    Z,
}

impl DeviceCode {
    /// the one-byte tag sent on the wire.
    pub fn tag(self) -> u8 {
        match self {
            DeviceCode::M => 0x90,
            DeviceCode::SM => 0x91,
            DeviceCode::L => 0x92,
            DeviceCode::F => 0x93,
            DeviceCode::V => 0x94,
            DeviceCode::X => 0x9C,
            DeviceCode::Y => 0x9D,
            DeviceCode::B => 0xA0,
            DeviceCode::SB => 0xA1,
            DeviceCode::DX => 0xA2,
            DeviceCode::DY => 0xA3,
            DeviceCode::D => 0xA8,
            DeviceCode::SD => 0xA9,
            DeviceCode::R => 0xAF,
            DeviceCode::ZR => 0xB0,
            DeviceCode::W => 0xB4,
            DeviceCode::SW => 0xB5,
            DeviceCode::TC => 0xC0,
            DeviceCode::TS => 0xC1,
            DeviceCode::TN => 0xC2,
            DeviceCode::CC => 0xC3,
            DeviceCode::CS => 0xC4,
            DeviceCode::CN => 0xC5,
            DeviceCode::Z => 0xCC,
        }
    }

    /// the textual mnemonic, equal to the enumerator name.
    pub fn mnemonic(self) -> &'static str {
        match self {
            DeviceCode::M => "M",
            DeviceCode::SM => "SM",
            DeviceCode::L => "L",
            DeviceCode::F => "F",
            DeviceCode::V => "V",
            DeviceCode::X => "X",
            DeviceCode::Y => "Y",
            DeviceCode::B => "B",
            DeviceCode::SB => "SB",
            DeviceCode::DX => "DX",
            DeviceCode::DY => "DY",
            DeviceCode::D => "D",
            DeviceCode::SD => "SD",
            DeviceCode::R => "R",
            DeviceCode::ZR => "ZR",
            DeviceCode::W => "W",
            DeviceCode::SW => "SW",
            DeviceCode::TC => "TC",
            DeviceCode::TS => "TS",
            DeviceCode::TN => "TN",
            DeviceCode::CC => "CC",
            DeviceCode::CS => "CS",
            DeviceCode::CN => "CN",
            DeviceCode::Z => "Z",
        }
    }

    /// whether addresses on this device are rendered in hex (rather than decimal)
    /// in ASCII frames.
    pub fn is_hex_addressed(self) -> bool {
        (0x9C..=0xA3).contains(&self.tag())
    }

    /// look up a `DeviceCode` by its wire tag byte.
    pub fn from_tag(tag: u8) -> Option<Self> {
        use DeviceCode::*;
        Some(match tag {
            0x90 => M,
            0x91 => SM,
            0x92 => L,
            0x93 => F,
            0x94 => V,
            0x9C => X,
            0x9D => Y,
            0xA0 => B,
            0xA1 => SB,
            0xA2 => DX,
            0xA3 => DY,
            0xA8 => D,
            0xA9 => SD,
            0xAF => R,
            0xB0 => ZR,
            0xB4 => W,
            0xB5 => SW,
            0xC0 => TC,
            0xC1 => TS,
            0xC2 => TN,
            0xC3 => CC,
            0xC4 => CS,
            0xC5 => CN,
            0xCC => Z,
            _ => return None,
        })
    }
}
