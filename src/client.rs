// Copyright 2019 Petar Dambovaliev. All rights reserved.
// This software may be modified and distributed under the terms
// of the BSD license. See the LICENSE file for details.

//! The public surface: connect, disconnect, refresh, read, write.

use crate::device::DeviceCode;
use crate::error::Error;
use crate::format::ProtocolFormat;
use crate::frame::{self, FrameOptions, ReadKind};
use crate::receive::ReceiveItem;
use crate::session::{Config, Session};
use crate::value::{SendItem, Value};
use log::debug;
use std::sync::Mutex;

/// A PLC client over one persistent TCP connection.
///
/// Every operation takes `&self`: only one request is ever in flight on
/// the wire at a time (see [`Session`]), so `Client` can be shared across
/// threads without an outer lock.
///
/// # Examples
///
/// ```no_run
/// use melsec_mc::{Client, DeviceCode, SendItem, Value};
///
/// let client = Client::new();
/// client.connect(Some("192.168.10.100"), None).unwrap();
/// client.write(SendItem::Write { device: DeviceCode::D, address: 200, value: Value::I32(42) }).unwrap();
/// let item = client.read(SendItem::Read { device: DeviceCode::D, address: 100, word_count: 2 }).unwrap();
/// println!("{:?}", item.get_i16_array());
/// client.disconnect().unwrap();
/// ```
pub struct Client {
    config: Mutex<Config>,
    session: Mutex<Option<Session>>,
}

impl Default for Client {
    fn default() -> Self {
        Client::new()
    }
}

impl Client {
    pub fn new() -> Client {
        Client {
            config: Mutex::new(Config::default()),
            session: Mutex::new(None),
        }
    }

    pub fn with_config(config: Config) -> Client {
        Client {
            config: Mutex::new(config),
            session: Mutex::new(None),
        }
    }

    pub fn set_protocol_format(&self, format: ProtocolFormat) {
        self.config.lock().unwrap().protocol_format = format;
    }

    pub fn set_network_no(&self, network_no: u8) {
        self.config.lock().unwrap().network_no = network_no;
    }

    pub fn set_pc_no(&self, pc_no: u8) {
        self.config.lock().unwrap().pc_no = pc_no;
    }

    /// rounded down to whole 250 ms ticks.
    pub fn set_timeout_ms(&self, timeout_ms: u32) {
        self.config.lock().unwrap().timeout_ticks = (timeout_ms / 250) as u16;
    }

    /// Free of side effects; does not wait on or hold the communication
    /// mutex that guards in-flight requests.
    pub fn is_connected(&self) -> bool {
        self.session
            .lock()
            .unwrap()
            .as_ref()
            .map_or(false, Session::is_connected)
    }

    pub fn connect(&self, ip: Option<&str>, port: Option<u16>) -> Result<(), Error> {
        let mut session_guard = self.session.lock().unwrap();
        if session_guard.is_some() {
            return Err(Error::AlreadyOpen);
        }

        let mut config = self.config.lock().unwrap();
        if let Some(ip) = ip {
            config.ip = ip.to_string();
        }
        if let Some(port) = port {
            config.port = port;
        }

        let session = Session::connect(&config)?;
        debug!("client connected to {}:{}", config.ip, config.port);
        *session_guard = Some(session);
        Ok(())
    }

    pub fn disconnect(&self) -> Result<(), Error> {
        let session = self.session.lock().unwrap().take().ok_or(Error::NotOpen)?;
        session.disconnect();
        debug!("client disconnected");
        Ok(())
    }

    pub fn refresh(&self) -> Result<(), Error> {
        self.disconnect()?;
        self.connect(None, None)
    }

    fn frame_options(&self) -> FrameOptions {
        let config = self.config.lock().unwrap();
        FrameOptions {
            network_no: config.network_no,
            pc_no: config.pc_no,
            timeout_ticks: config.timeout_ticks,
            format: config.protocol_format,
        }
    }

    /// # Examples
    ///
    /// ```no_run
    /// use melsec_mc::{Client, DeviceCode, SendItem};
    ///
    /// let client = Client::new();
    /// client.connect(None, None).unwrap();
    /// let item = client.read(SendItem::Read { device: DeviceCode::D, address: 100, word_count: 2 }).unwrap();
    /// assert_eq!(item.get_i16_array().len(), 2);
    /// ```
    pub fn read(&self, item: SendItem) -> Result<ReceiveItem, Error> {
        match item {
            SendItem::Read {
                device,
                address,
                word_count,
            } => self.read_one(device, address, word_count),
            SendItem::Write { .. } => Err(Error::WrongMessageFormat),
        }
    }

    /// Reads a heterogeneous batch of single word/dword points in one
    /// Random Read frame.
    pub fn read_many(&self, items: &[SendItem]) -> Result<Vec<ReceiveItem>, Error> {
        let mut points = Vec::with_capacity(items.len());
        for item in items {
            match item {
                SendItem::Read {
                    device,
                    address,
                    word_count,
                } => points.push((*device, *address, *word_count)),
                SendItem::Write { .. } => return Err(Error::WrongMessageFormat),
            }
        }

        let mut word_idx = Vec::new();
        let mut dword_idx = Vec::new();
        for (i, &(_, _, word_count)) in points.iter().enumerate() {
            match frame::classify_read_word_count(word_count)? {
                ReadKind::Word => word_idx.push(i),
                ReadKind::Dword => dword_idx.push(i),
            }
        }
        let expected_len = word_idx.len() * 2 + dword_idx.len() * 4;

        let guard = self.session.lock().unwrap();
        let session = guard.as_ref().ok_or(Error::NotOpen)?;
        let opts = self.frame_options();
        debug!("random read of {} points", points.len());

        let frame = frame::assemble_random_read(&opts, &points)?;
        let parsed = session.request(&frame, opts.format, Some(expected_len))?;

        let mut results: Vec<Option<ReceiveItem>> = vec![None; points.len()];
        let mut offset = 0usize;
        for &i in &word_idx {
            let (device, address, _) = points[i];
            let bytes = slice_payload(&parsed.payload, offset, 2)?;
            results[i] = Some(ReceiveItem::new(device, address, bytes));
            offset += 2;
        }
        for &i in &dword_idx {
            let (device, address, _) = points[i];
            let bytes = slice_payload(&parsed.payload, offset, 4)?;
            results[i] = Some(ReceiveItem::new(device, address, bytes));
            offset += 4;
        }

        Ok(results.into_iter().map(|r| r.unwrap()).collect())
    }

    pub fn write(&self, item: SendItem) -> Result<(), Error> {
        match item {
            SendItem::Write {
                device,
                address,
                value,
            } => self.write_one(device, address, &value),
            SendItem::Read { .. } => Err(Error::WrongMessageFormat),
        }
    }

    /// Writes a heterogeneous batch. Bit-shaped and word/dword-shaped
    /// values can't share one random-write frame, so a mixed batch is
    /// split and sent as (up to) two requests.
    pub fn write_many(&self, items: &[SendItem]) -> Result<(), Error> {
        let mut bit_points: Vec<(DeviceCode, u32, bool)> = Vec::new();
        let mut word_items: Vec<(DeviceCode, u32, Value)> = Vec::new();

        for item in items {
            match item {
                SendItem::Write {
                    device,
                    address,
                    value,
                } => match value {
                    Value::Bool(b) => bit_points.push((*device, *address, *b)),
                    Value::Bools(bits) => {
                        for (i, b) in bits.iter().enumerate() {
                            bit_points.push((*device, address.wrapping_add(i as u32), *b));
                        }
                    }
                    other => word_items.push((*device, *address, other.clone())),
                },
                SendItem::Read { .. } => return Err(Error::WrongMessageFormat),
            }
        }

        let guard = self.session.lock().unwrap();
        let session = guard.as_ref().ok_or(Error::NotOpen)?;
        let opts = self.frame_options();

        if !bit_points.is_empty() {
            debug!("random write of {} bit points", bit_points.len());
            let frame = frame::assemble_random_write_bits(&opts, &bit_points)?;
            session.request(&frame, opts.format, None)?;
        }
        if !word_items.is_empty() {
            debug!("random write of {} word/dword points", word_items.len());
            let frame = frame::assemble_random_write_words(&opts, &word_items)?;
            session.request(&frame, opts.format, None)?;
        }
        Ok(())
    }

    fn read_one(
        &self,
        device: DeviceCode,
        address: u32,
        word_count: u16,
    ) -> Result<ReceiveItem, Error> {
        let guard = self.session.lock().unwrap();
        let session = guard.as_ref().ok_or(Error::NotOpen)?;
        let opts = self.frame_options();
        debug!("read {:?}@{} x{}", device, address, word_count);
        let frame = frame::assemble_read_single(&opts, device, address, word_count);
        let parsed = session.request(&frame, opts.format, Some(word_count as usize * 2))?;
        Ok(ReceiveItem::new(device, address, parsed.payload))
    }

    fn write_one(&self, device: DeviceCode, address: u32, value: &Value) -> Result<(), Error> {
        let guard = self.session.lock().unwrap();
        let session = guard.as_ref().ok_or(Error::NotOpen)?;
        let opts = self.frame_options();
        debug!("write {:?}@{}", device, address);
        let frame = frame::assemble_write_single(&opts, device, address, value)?;
        session.request(&frame, opts.format, None)?;
        Ok(())
    }
}

fn slice_payload(payload: &[u8], offset: usize, len: usize) -> Result<Vec<u8>, Error> {
    payload
        .get(offset..offset + len)
        .map(|s| s.to_vec())
        .ok_or(Error::LengthMismatch {
            expected: offset + len,
            actual: payload.len(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_rejects_a_write_item() {
        let client = Client::new();
        let err = client
            .read(SendItem::Write {
                device: DeviceCode::D,
                address: 0,
                value: Value::U8(1),
            })
            .unwrap_err();
        assert!(matches!(err, Error::WrongMessageFormat));
    }

    #[test]
    fn write_rejects_a_read_item() {
        let client = Client::new();
        let err = client
            .write(SendItem::Read {
                device: DeviceCode::D,
                address: 0,
                word_count: 1,
            })
            .unwrap_err();
        assert!(matches!(err, Error::WrongMessageFormat));
    }

    #[test]
    fn operations_fail_before_connect() {
        let client = Client::new();
        assert!(!client.is_connected());
        let err = client
            .read(SendItem::Read {
                device: DeviceCode::D,
                address: 0,
                word_count: 1,
            })
            .unwrap_err();
        assert!(matches!(err, Error::NotOpen));
    }

    #[test]
    fn disconnect_without_connect_is_not_open() {
        let client = Client::new();
        assert!(matches!(client.disconnect().unwrap_err(), Error::NotOpen));
    }

    #[test]
    fn timeout_setter_rounds_down_to_whole_ticks() {
        let client = Client::new();
        client.set_timeout_ms(999);
        assert_eq!(client.frame_options().timeout_ticks, 3);
    }
}
