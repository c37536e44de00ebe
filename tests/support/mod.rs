//! Scripted in-process gateway for integration tests

#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::{Ipv4Addr, SocketAddr, TcpListener, UdpSocket};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use screenlogic::protocol::messages::{
    BodyStatus, CONNECT_PREAMBLE, ControllerConfigResponse, DISCOVERY_REQUEST, DiscoveryResponse,
    HistoryData, PoolStatusResponse, SetPointRange,
};
use screenlogic::protocol::{Decoder, Encoder, FrameHeader};
use screenlogic::transport::{FrameReader, FrameWriter};
use screenlogic::{BodyType, ClientConfig, DiscoveryConfig, HeatMode};

pub const MAC: &str = "00-11-22-33-44-55";
pub const VERSION: &str = "POOL: 5.2 Build 736.0 Rel";
pub const NAME: &str = "Pentair: 00-11-22";

/// How the scripted gateway behaves
#[derive(Debug, Clone, Default)]
pub struct Script {
    /// Connections to accept before the thread exits
    pub connections: usize,
    /// Report Celsius in the configuration
    pub celsius: bool,
    /// Push a weather notification before every status answer
    pub weather_before_status: bool,
    /// Hang up on the first status request of the first connection
    pub drop_first_status: bool,
    /// Answer the login with the failure code
    pub reject_login: bool,
    /// Answer the login with this code and an empty body instead
    pub login_reply: Option<u16>,
    /// Answer the version query with a header claiming a 20 MB body
    pub oversized_version: bool,
    /// Send half a status body on the first connection, then hang up
    pub truncate_first_status: bool,
    /// Samples pushed after a history acknowledgement
    pub history: HistoryData,
}

/// One frame as the gateway saw it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seen {
    pub sequence: u16,
    pub code: u16,
}

pub struct MockGateway {
    pub addr: SocketAddr,
    handle: JoinHandle<Vec<Vec<Seen>>>,
}

impl MockGateway {
    pub fn start(script: Script) -> Self {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = thread::spawn(move || {
            (0..script.connections)
                .map(|index| {
                    let (stream, _) = listener.accept().unwrap();
                    serve(stream, &script, index)
                })
                .collect()
        });
        Self { addr, handle }
    }

    /// Frames received, per connection. Blocks until every scripted
    /// connection has been closed by the client.
    pub fn join(self) -> Vec<Vec<Seen>> {
        self.handle.join().unwrap()
    }

    pub fn discovery(&self) -> DiscoveryResponse {
        DiscoveryResponse {
            kind: 2,
            address: Ipv4Addr::LOCALHOST,
            port: self.addr.port(),
            gateway_type: 2,
            subnet: 0,
            name: NAME.to_string(),
        }
    }
}

fn serve(stream: std::net::TcpStream, script: &Script, index: usize) -> Vec<Seen> {
    stream
        .set_read_timeout(Some(Duration::from_secs(10)))
        .unwrap();

    let mut preamble = [0u8; CONNECT_PREAMBLE.len()];
    (&stream).read_exact(&mut preamble).unwrap();
    assert_eq!(&preamble[..], CONNECT_PREAMBLE);

    let mut reader = FrameReader::new(stream.try_clone().unwrap());
    let mut writer = FrameWriter::new(stream, 1);
    let mut seen = Vec::new();

    while let Ok(frame) = reader.read_frame() {
        let header = *frame.header();
        seen.push(Seen {
            sequence: header.sequence(),
            code: header.code(),
        });

        match header.code() {
            14 => {
                let mut enc = Encoder::new();
                enc.put_string(MAC).unwrap();
                writer.write_frame(15, &enc.finish()).unwrap();
            }
            27 => {
                if let Some(code) = script.login_reply {
                    writer.write_frame(code, &[]).unwrap();
                } else if script.reject_login {
                    writer.write_frame(13, &[]).unwrap();
                } else {
                    writer.write_frame(28, &[0u8; 16]).unwrap();
                }
            }
            8120 => {
                if script.oversized_version {
                    let header = FrameHeader::new(9, 8121, 20_000_000);
                    let mut raw = header.to_bytes().to_vec();
                    raw.extend_from_slice(&[0xAA; 64]);
                    writer.get_ref().write_all(&raw).unwrap();
                    continue;
                }
                let mut enc = Encoder::new();
                enc.put_string(VERSION).unwrap();
                for _ in 0..6 {
                    enc.put_u32(0);
                }
                writer.write_frame(8121, &enc.finish()).unwrap();
            }
            12532 => {
                let body = config(script.celsius).encode().unwrap();
                writer.write_frame(12533, &body).unwrap();
            }
            12526 => {
                if script.drop_first_status && index == 0 {
                    break;
                }
                if script.truncate_first_status && index == 0 {
                    let body = status().encode().unwrap();
                    let header = FrameHeader::new(9, 12527, body.len() as u32);
                    let mut raw = header.to_bytes().to_vec();
                    raw.extend_from_slice(&body[..body.len() / 2]);
                    writer.get_ref().write_all(&raw).unwrap();
                    break;
                }
                if script.weather_before_status {
                    writer.write_frame(9806, &[]).unwrap();
                }
                writer.write_frame(12527, &status().encode().unwrap()).unwrap();
            }
            12528 => {
                writer.write_frame(12529, &[]).unwrap();
            }
            12538 => {
                let mut dec = Decoder::new(frame.body());
                let _controller = dec.read_u32().unwrap();
                let _body = dec.read_u32().unwrap();
                let mode = dec.read_u32().unwrap();
                if mode == HeatMode::Unchanged.as_u32() {
                    writer.write_frame(31, &[]).unwrap();
                } else {
                    writer.write_frame(12539, &[]).unwrap();
                }
            }
            12534 => {
                writer.write_frame(12535, &[]).unwrap();
                writer
                    .write_frame(12502, &script.history.encode().unwrap())
                    .unwrap();
            }
            _ => break,
        }
    }
    seen
}

pub fn config(celsius: bool) -> ControllerConfigResponse {
    ControllerConfigResponse {
        controller_id: 100,
        pool_set_point: SetPointRange { min: 40, max: 104 },
        spa_set_point: SetPointRange { min: 40, max: 104 },
        is_celsius: celsius,
        controller_type: 5,
        equipment_flags: 0x1,
        default_circuit_name: "Aux".to_string(),
        ..ControllerConfigResponse::default()
    }
}

pub fn status() -> PoolStatusResponse {
    PoolStatusResponse {
        readiness: 1,
        air_temperature: 68,
        bodies: vec![
            BodyStatus {
                body: BodyType::Pool,
                current_temperature: 80,
                heater_status: 0,
                heat_set_point: 84,
                cool_set_point: 90,
                heat_mode: HeatMode::Off.as_u32(),
            },
            BodyStatus {
                body: BodyType::Spa,
                current_temperature: 101,
                heater_status: 1,
                heat_set_point: 102,
                cool_set_point: 104,
                heat_mode: HeatMode::On.as_u32(),
            },
        ],
        ..PoolStatusResponse::default()
    }
}

/// Answer one discovery broadcast on loopback; returns the port and the
/// request bytes the responder received.
pub fn discovery_responder(answer: DiscoveryResponse) -> (u16, JoinHandle<Vec<u8>>) {
    let socket = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
    socket
        .set_read_timeout(Some(Duration::from_secs(10)))
        .unwrap();
    let port = socket.local_addr().unwrap().port();

    let handle = thread::spawn(move || {
        let mut buf = [0u8; 64];
        let (len, from) = socket.recv_from(&mut buf).unwrap();
        if buf[..len] == DISCOVERY_REQUEST {
            socket.send_to(&answer.encode(), from).unwrap();
        }
        buf[..len].to_vec()
    });
    (port, handle)
}

pub fn client_config(discovery_port: u16) -> ClientConfig {
    ClientConfig {
        client_name: "integration".to_string(),
        read_timeout: Some(Duration::from_secs(5)),
        write_timeout: Some(Duration::from_secs(5)),
        discovery: DiscoveryConfig {
            broadcast_address: Ipv4Addr::LOCALHOST,
            port: discovery_port,
            timeout: Some(Duration::from_secs(5)),
        },
        ..ClientConfig::default()
    }
}
