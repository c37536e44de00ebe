//! Discovery datagrams
//!
//! Discovery runs over UDP and does not use frame headers.

use std::net::Ipv4Addr;

use crate::protocol::{Decoder, Result};

/// Broadcast payload that asks gateways to announce themselves.
///
/// It has the shape of a frame header with sequence 1 and nothing else.
pub const DISCOVERY_REQUEST: [u8; 8] = [0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];

/// Fixed fields before the gateway name
pub const DISCOVERY_FIXED_SIZE: usize = 12;

/// A gateway's answer to the discovery broadcast.
///
/// ```text
/// [type u32][ipv4 4 bytes][port u16][gateway type u8][subnet u8]
/// [name ... (to end, NUL-terminated)]
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiscoveryResponse {
    /// Response type tag
    pub kind: u32,
    /// Address the gateway listens on
    pub address: Ipv4Addr,
    /// TCP port the gateway listens on
    pub port: u16,
    /// Vendor gateway type
    pub gateway_type: u8,
    /// Subnet id
    pub subnet: u8,
    /// Display name, e.g. `Pentair: 00-11-22`; invalid UTF-8 is replaced with U+FFFD
    pub name: String,
}

impl DiscoveryResponse {
    /// Decode a discovery datagram
    pub fn decode(datagram: &[u8]) -> Result<Self> {
        let mut decoder = Decoder::new(datagram);

        let kind = decoder.read_u32()?;
        let address = Ipv4Addr::from(decoder.read_array::<4>()?);
        let port = decoder.read_u16()?;
        let gateway_type = decoder.read_u8()?;
        let subnet = decoder.read_u8()?;

        let tail = decoder.read_tail();
        let name = tail
            .iter()
            .position(|&b| b == 0)
            .map_or(tail, |end| &tail[..end]);

        Ok(Self {
            kind,
            address,
            port,
            gateway_type,
            subnet,
            name: String::from_utf8_lossy(name).into_owned(),
        })
    }

    /// Encode into the datagram layout (used by test responders)
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(DISCOVERY_FIXED_SIZE + self.name.len() + 1);
        out.extend_from_slice(&self.kind.to_le_bytes());
        out.extend_from_slice(&self.address.octets());
        out.extend_from_slice(&self.port.to_le_bytes());
        out.push(self.gateway_type);
        out.push(self.subnet);
        out.extend_from_slice(self.name.as_bytes());
        out.push(0);
        out
    }
}
