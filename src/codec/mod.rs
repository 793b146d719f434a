// Copyright 2019 Petar Dambovaliev. All rights reserved.
// This software may be modified and distributed under the terms
// of the BSD license. See the LICENSE file for details.

//! Pure functions translating between typed values / addresses and the two
//! wire forms: binary little-endian packed bytes, and ASCII uppercase hex
//! text. Nothing in this module touches a socket.

mod address;
mod ascii;
mod bits;
mod words;

pub use address::*;
pub use ascii::*;
pub use bits::*;
pub use words::*;

use crate::device::DeviceCode;
use crate::error::Error;
