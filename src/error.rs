// Copyright 2019 Petar Dambovaliev. All rights reserved.
// This software may be modified and distributed under the terms
// of the BSD license. See the LICENSE file for details.

use std::error;
use std::fmt;
use std::io::Error as IOError;

/// Every way a request against a PLC can fail.
#[derive(Debug)]
pub enum Error {
    /// `connect` was called while the session was already connected.
    AlreadyOpen,
    /// `connect` was given an IP that does not parse as an IPv4 dotted-quad.
    InvalidIp(String),
    /// a read or write was attempted while the session was disconnected.
    NotOpen,
    /// a read-shaped `SendItem` was passed to `write`, or vice versa.
    WrongMessageFormat,
    /// a value the codec does not know how to encode for the wire.
    InvalidPlcDataFormat(String),
    /// a random read/write frame would need more than 255 word or dword points.
    MessageSizeOverflow,
    /// the response's fixed header prefix did not match what was sent.
    ProtocolMismatch,
    /// the response's length field disagreed with the buffer or the expected size.
    LengthMismatch { expected: usize, actual: usize },
    /// the PLC's end code was non-zero.
    DeviceError { code: u16, trailing: Vec<u8> },
    /// no response arrived within the configured timeout.
    Timeout,
    /// the underlying socket failed.
    Transport(IOError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::AlreadyOpen => write!(f, "session is already connected"),
            Error::InvalidIp(ip) => write!(f, "invalid IPv4 address: {}", ip),
            Error::NotOpen => write!(f, "session is not connected"),
            Error::WrongMessageFormat => {
                write!(f, "read item passed to write, or write item passed to read")
            }
            Error::InvalidPlcDataFormat(reason) => write!(f, "invalid PLC data format: {}", reason),
            Error::MessageSizeOverflow => {
                write!(f, "random read/write word or dword count exceeds 255")
            }
            Error::ProtocolMismatch => write!(f, "response header did not match the 3E frame prefix"),
            Error::LengthMismatch { expected, actual } => write!(
                f,
                "response length mismatch: expected {} got {}",
                expected, actual
            ),
            Error::DeviceError { code, trailing } => {
                write!(f, "PLC returned end code 0x{:04X}, trailing {:?}", code, trailing)
            }
            Error::Timeout => write!(f, "timed out waiting for a response"),
            Error::Transport(e) => write!(f, "transport error: {}", e),
        }
    }
}

impl From<IOError> for Error {
    fn from(e: IOError) -> Self {
        Error::Transport(e)
    }
}

// This is important for other errors to wrap this one.
impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Transport(e) => Some(e),
            _ => None,
        }
    }
}
