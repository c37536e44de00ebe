//! Gateway discovery over UDP broadcast

use std::net::{Ipv4Addr, SocketAddr, UdpSocket};

use tracing::{debug, instrument};

use crate::config::DiscoveryConfig;
use crate::protocol::Result;
use crate::protocol::messages::{DISCOVERY_REQUEST, DiscoveryResponse};

/// Largest discovery answer we accept
const MAX_DATAGRAM: usize = 1024;

/// Broadcast the discovery request and decode the first answer.
///
/// This performs a single blocking read bounded by [`DiscoveryConfig::timeout`].
#[instrument(level = "debug", skip(config), fields(port = config.port))]
pub fn discover(config: &DiscoveryConfig) -> Result<DiscoveryResponse> {
    let socket = UdpSocket::bind(SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0)))?;
    socket.set_broadcast(true)?;
    socket.set_read_timeout(config.timeout)?;

    let target = SocketAddr::from((config.broadcast_address, config.port));
    socket.send_to(&DISCOVERY_REQUEST, target)?;

    let mut buf = [0u8; MAX_DATAGRAM];
    let (len, from) = socket.recv_from(&mut buf)?;
    let response = DiscoveryResponse::decode(&buf[..len])?;

    debug!(
        %from,
        address = %response.address,
        port = response.port,
        name = %response.name,
        "gateway answered discovery"
    );
    Ok(response)
}
