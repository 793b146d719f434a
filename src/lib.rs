// Copyright 2019 Petar Dambovaliev. All rights reserved.
// This software may be modified and distributed under the terms
// of the BSD license. See the LICENSE file for details.

//! A client for the MELSEC Communication (MC) protocol's "3E" frame
//! family: reading and writing memory-mapped devices on a Mitsubishi PLC
//! over TCP.
//!
//! # Examples
//! ```no_run
//! use melsec_mc::{Client, DeviceCode, SendItem, Value};
//!
//! let client = Client::new();
//! client.connect(Some("192.168.10.100"), None).unwrap();
//!
//! client
//!     .write(SendItem::Write {
//!         device: DeviceCode::D,
//!         address: 200,
//!         value: Value::I32(42),
//!     })
//!     .unwrap();
//!
//! let item = client
//!     .read(SendItem::Read {
//!         device: DeviceCode::D,
//!         address: 100,
//!         word_count: 2,
//!     })
//!     .unwrap();
//! println!("{:?}", item.get_i16_array());
//!
//! client.disconnect().unwrap();
//! ```

pub mod client;
pub mod codec;
pub mod device;
pub mod error;
pub mod format;
pub mod frame;
pub mod receive;
pub mod session;
pub mod value;

pub use client::Client;
pub use device::DeviceCode;
pub use error::Error;
pub use format::ProtocolFormat;
pub use receive::ReceiveItem;
pub use session::Config;
pub use value::{SendItem, Value};
