// Copyright 2019 Petar Dambovaliev. All rights reserved.
// This software may be modified and distributed under the terms
// of the BSD license. See the LICENSE file for details.

//! Owns the TCP socket, the reader thread, the watchdog thread, and the
//! inbound frame queue; serializes requests against the single shared
//! socket.

use crate::error::Error;
use crate::format::ProtocolFormat;
use crate::frame::{self, ParsedResponse};
use log::{debug, warn};
use std::collections::VecDeque;
use std::io::{Read, Write};
use std::net::{IpAddr, Shutdown, SocketAddr, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Session/connection parameters.
#[derive(Debug, Clone)]
pub struct Config {
    pub ip: String,
    pub port: u16,
    pub protocol_format: ProtocolFormat,
    pub network_no: u8,
    pub pc_no: u8,
    /// timeout in 250 ms ticks.
    pub timeout_ticks: u16,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            ip: "192.168.10.100".to_string(),
            port: 6000,
            protocol_format: ProtocolFormat::Binary,
            network_no: 0x00,
            pc_no: 0xFF,
            timeout_ticks: 16, // 4000 ms
        }
    }
}

impl Config {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(u64::from(self.timeout_ticks) * 250)
    }
}

fn open_stream(ip: &str, port: u16) -> Result<TcpStream, Error> {
    let ip_addr: IpAddr = ip.parse().map_err(|_| Error::InvalidIp(ip.to_string()))?;
    Ok(TcpStream::connect(SocketAddr::new(ip_addr, port))?)
}

/// read one complete response buffer: repeatedly read up to 256 bytes,
/// appending, until a short read signals the end of the buffer.
fn read_one_frame(stream: &mut TcpStream) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    loop {
        let mut chunk = [0u8; 256];
        let n = stream.read(&mut chunk)?;
        if n == 0 {
            return Err(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "peer closed the connection",
            ));
        }
        buf.extend_from_slice(&chunk[..n]);
        if n < 256 {
            return Ok(buf);
        }
    }
}

fn reader_loop(
    mut stream: TcpStream,
    inbound: Arc<Mutex<VecDeque<Vec<u8>>>>,
    connected: Arc<AtomicBool>,
) {
    loop {
        match read_one_frame(&mut stream) {
            Ok(buf) => inbound.lock().unwrap().push_back(buf),
            Err(e) => {
                warn!("reader thread exiting after socket read error: {}", e);
                connected.store(false, Ordering::SeqCst);
                return;
            }
        }
    }
}

fn spawn_reader(
    stream: TcpStream,
    inbound: Arc<Mutex<VecDeque<Vec<u8>>>>,
    connected: Arc<AtomicBool>,
) -> JoinHandle<()> {
    thread::spawn(move || reader_loop(stream, inbound, connected))
}

#[allow(clippy::too_many_arguments)]
fn watchdog_loop(
    ip: String,
    port: u16,
    connected: Arc<AtomicBool>,
    shutdown: Arc<AtomicBool>,
    inbound: Arc<Mutex<VecDeque<Vec<u8>>>>,
    write_stream: Arc<Mutex<TcpStream>>,
    reader_handle: Arc<Mutex<Option<JoinHandle<()>>>>,
) {
    loop {
        thread::sleep(Duration::from_secs(1));
        if shutdown.load(Ordering::SeqCst) {
            return;
        }
        if connected.load(Ordering::SeqCst) {
            continue;
        }
        warn!("session to {}:{} is down, attempting to reconnect", ip, port);
        match open_stream(&ip, port) {
            Ok(new_stream) => {
                let reader_stream = match new_stream.try_clone() {
                    Ok(s) => s,
                    Err(e) => {
                        warn!("reconnect could not clone the new socket: {}", e);
                        continue;
                    }
                };
                connected.store(true, Ordering::SeqCst);
                let new_handle = spawn_reader(reader_stream, inbound.clone(), connected.clone());
                *write_stream.lock().unwrap() = new_stream;
                *reader_handle.lock().unwrap() = Some(new_handle);
                debug!("reconnected to {}:{}", ip, port);
            }
            Err(e) => warn!("reconnect attempt failed: {}", e),
        }
    }
}

/// A live, connected session. Constructed by [`Session::connect`], consumed
/// by [`Session::disconnect`].
pub struct Session {
    write_stream: Arc<Mutex<TcpStream>>,
    inbound: Arc<Mutex<VecDeque<Vec<u8>>>>,
    comm_mutex: Mutex<()>,
    connected: Arc<AtomicBool>,
    shutdown: Arc<AtomicBool>,
    reader_handle: Arc<Mutex<Option<JoinHandle<()>>>>,
    watchdog_handle: Option<JoinHandle<()>>,
    ip: String,
    port: u16,
    timeout: Duration,
}

impl Session {
    pub fn connect(config: &Config) -> Result<Session, Error> {
        let stream = open_stream(&config.ip, config.port)?;
        let connected = Arc::new(AtomicBool::new(true));
        let shutdown = Arc::new(AtomicBool::new(false));
        let inbound = Arc::new(Mutex::new(VecDeque::new()));

        let reader_stream = stream.try_clone()?;
        let reader_handle = Arc::new(Mutex::new(Some(spawn_reader(
            reader_stream,
            inbound.clone(),
            connected.clone(),
        ))));
        let write_stream = Arc::new(Mutex::new(stream));

        let watchdog_handle = Some(thread::spawn({
            let connected = connected.clone();
            let shutdown = shutdown.clone();
            let inbound = inbound.clone();
            let write_stream = write_stream.clone();
            let reader_handle = reader_handle.clone();
            let ip = config.ip.clone();
            let port = config.port;
            move || watchdog_loop(ip, port, connected, shutdown, inbound, write_stream, reader_handle)
        }));

        debug!("connected to {}:{}", config.ip, config.port);
        Ok(Session {
            write_stream,
            inbound,
            comm_mutex: Mutex::new(()),
            connected,
            shutdown,
            reader_handle,
            watchdog_handle,
            ip: config.ip.clone(),
            port: config.port,
            timeout: config.timeout(),
        })
    }

    /// lock-free; safe to call without holding the communication mutex.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Send one request frame and wait for exactly one response buffer,
    /// then run it through the Frame Parser. `expected_payload_len` is
    /// forwarded to [`frame::parse_response`]; pass `None` when the caller
    /// has no fixed expectation for the response size.
    pub fn request(
        &self,
        frame: &[u8],
        format: ProtocolFormat,
        expected_payload_len: Option<usize>,
    ) -> Result<ParsedResponse, Error> {
        if !self.is_connected() {
            return Err(Error::NotOpen);
        }

        let _guard = self.comm_mutex.lock().unwrap();
        {
            let mut stream = self.write_stream.lock().unwrap();
            if let Err(e) = stream.write_all(frame) {
                self.connected.store(false, Ordering::SeqCst);
                return Err(e.into());
            }
        }

        let deadline = Instant::now() + self.timeout;
        loop {
            if let Some(buf) = self.inbound.lock().unwrap().pop_front() {
                return frame::parse_response(format, &buf, expected_payload_len);
            }
            if Instant::now() >= deadline {
                // drop whatever arrives late so the next request doesn't
                // misread it as its own response (see §9 "Queue/match race").
                self.inbound.lock().unwrap().clear();
                return Err(Error::Timeout);
            }
            thread::sleep(Duration::from_millis(10));
        }
    }

    pub fn disconnect(self) {
        self.shutdown.store(true, Ordering::SeqCst);
        self.connected.store(false, Ordering::SeqCst);
        {
            let stream = self.write_stream.lock().unwrap();
            let _ = stream.set_linger(Some(Duration::from_millis(500)));
            let _ = stream.shutdown(Shutdown::Both);
        }
        if let Some(handle) = self.reader_handle.lock().unwrap().take() {
            let _ = handle.join();
        }
        if let Some(handle) = self.watchdog_handle {
            let _ = handle.join();
        }
        debug!("disconnected from {}:{}", self.ip, self.port);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    #[test]
    fn config_defaults_match_spec() {
        let cfg = Config::default();
        assert_eq!(cfg.ip, "192.168.10.100");
        assert_eq!(cfg.port, 6000);
        assert_eq!(cfg.protocol_format, ProtocolFormat::Binary);
        assert_eq!(cfg.network_no, 0x00);
        assert_eq!(cfg.pc_no, 0xFF);
        assert_eq!(cfg.timeout(), Duration::from_millis(4000));
    }

    #[test]
    fn connect_request_and_disconnect_against_a_loopback_peer() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let server = thread::spawn(move || {
            let (mut sock, _) = listener.accept().unwrap();
            let mut req = vec![0u8; 21];
            sock.read_exact(&mut req).unwrap();
            // canned response to scenario 1's single-point read.
            let resp: [u8; 15] = [
                0xD0, 0x00, 0x00, 0xFF, 0xFF, 0x03, 0x00, 0x06, 0x00, 0x00, 0x00, 0x01, 0x00,
                0x02, 0x00,
            ];
            sock.write_all(&resp).unwrap();
        });

        let config = Config {
            ip: addr.ip().to_string(),
            port: addr.port(),
            ..Config::default()
        };
        let session = Session::connect(&config).unwrap();
        assert!(session.is_connected());

        let frame = frame::assemble_read_single(
            &frame::FrameOptions {
                network_no: 0,
                pc_no: 0xFF,
                timeout_ticks: 16,
                format: ProtocolFormat::Binary,
            },
            crate::device::DeviceCode::D,
            100,
            2,
        );
        let parsed = session.request(&frame, ProtocolFormat::Binary, Some(4)).unwrap();
        assert_eq!(parsed.payload, vec![0x01, 0x00, 0x02, 0x00]);

        session.disconnect();
        server.join().unwrap();
    }
}
