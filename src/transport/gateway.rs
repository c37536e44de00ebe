//! One TCP session with a gateway
//!
//! ```text
//! Unconnected --connect--> Connected --login--> Authenticated
//!      ^                                              |
//!      +------------------ close / reconnect ---------+
//! ```

use std::fmt;
use std::io::{BufReader, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};

use chrono::NaiveDateTime;
use tracing::{debug, instrument};

use super::discovery::discover;
use super::framing::{FrameReader, FrameWriter, OutOfBandHandler};
use crate::config::ClientConfig;
use crate::equipment::{BodyType, ControllerConfig, HeatMode, PoolStatus};
use crate::protocol::messages::{
    CONNECT_PREAMBLE, ChallengeRequest, ChallengeResponse, ControllerConfigRequest,
    ControllerConfigResponse, DiscoveryResponse, HistoryData, HistoryRequest, HistoryResponse,
    LoginResponse, PoolStatusRequest, PoolStatusResponse, SetHeatModeRequest,
    SetHeatModeResponse, SetHeatPointRequest, SetHeatPointResponse, VersionRequest,
    VersionResponse,
};
use crate::protocol::{Error, FrameHeader, Request, Response, Result};

/// Where a session stands in its handshake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No socket
    Unconnected,
    /// Socket open and challenge answered
    Connected,
    /// Logged in; requests may be issued
    Authenticated,
}

/// What is known about the gateway on the other end
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GatewayIdentity {
    /// Discovery answer: address, port, type, subnet and name
    pub discovery: DiscoveryResponse,
    /// MAC address reported in the connect challenge
    pub mac_address: Option<String>,
}

impl GatewayIdentity {
    /// Socket address of the gateway's TCP listener
    #[must_use]
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::from((self.discovery.address, self.discovery.port))
    }
}

#[derive(Debug)]
struct Connection {
    writer: FrameWriter<TcpStream>,
    reader: FrameReader<BufReader<TcpStream>>,
}

/// A session with one gateway.
///
/// Not safe for concurrent use; [`crate::Client`] serializes access.
pub struct Gateway {
    identity: GatewayIdentity,
    config: ClientConfig,
    state: SessionState,
    conn: Option<Connection>,
    // parked here while no connection holds it
    handler: Option<OutOfBandHandler>,
}

impl fmt::Debug for Gateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gateway")
            .field("identity", &self.identity)
            .field("state", &self.state)
            .field("conn", &self.conn)
            .finish_non_exhaustive()
    }
}

fn log_out_of_band() -> OutOfBandHandler {
    Box::new(|header: &FrameHeader, body: &[u8]| {
        debug!(
            code = header.code(),
            body_len = body.len(),
            "ignoring unsolicited frame"
        );
        Ok(())
    })
}

impl Gateway {
    /// Create an unconnected session for a discovered gateway
    #[must_use]
    pub fn new(discovery: DiscoveryResponse, config: ClientConfig) -> Self {
        Self {
            identity: GatewayIdentity {
                discovery,
                mac_address: None,
            },
            config,
            state: SessionState::Unconnected,
            conn: None,
            handler: Some(log_out_of_band()),
        }
    }

    /// Discover a gateway, connect and log in
    pub fn open(config: ClientConfig) -> Result<Self> {
        let discovery = discover(&config.discovery)?;
        let mut gateway = Self::new(discovery, config);
        gateway.connect()?;
        gateway.login()?;
        Ok(gateway)
    }

    /// Gateway identity
    #[must_use]
    pub const fn identity(&self) -> &GatewayIdentity {
        &self.identity
    }

    /// Raw display name from discovery, e.g. `Pentair: 00-11-22`
    #[must_use]
    pub fn name(&self) -> &str {
        &self.identity.discovery.name
    }

    /// Session state
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Replace the handler for unsolicited frames.
    ///
    /// Only pushed and unknown codes reach it; a wrong reply still fails the
    /// request. The default handler logs at debug level and drops the frame.
    /// The handler survives reconnects.
    pub fn set_out_of_band_handler<F>(&mut self, handler: F)
    where
        F: FnMut(&FrameHeader, &[u8]) -> Result<()> + Send + 'static,
    {
        let handler: OutOfBandHandler = Box::new(handler);
        match self.conn.as_mut() {
            Some(conn) => {
                conn.reader.set_handler(handler);
            }
            None => self.handler = Some(handler),
        }
    }

    /// Open the socket, send the preamble and answer the challenge
    #[instrument(level = "debug", skip(self), fields(addr = %self.identity.socket_addr()))]
    pub fn connect(&mut self) -> Result<()> {
        self.close();

        let addr = self.identity.socket_addr();
        let stream = match self.config.connect_timeout {
            Some(timeout) => TcpStream::connect_timeout(&addr, timeout)?,
            None => TcpStream::connect(addr)?,
        };
        stream.set_nodelay(true)?;
        stream.set_read_timeout(self.config.read_timeout)?;
        stream.set_write_timeout(self.config.write_timeout)?;

        (&stream).write_all(CONNECT_PREAMBLE)?;
        debug!("preamble sent");

        let read_half = stream.try_clone()?;
        let mut reader = FrameReader::new(BufReader::new(read_half));
        if let Some(handler) = self.handler.take() {
            reader.set_handler(handler);
        }
        self.conn = Some(Connection {
            writer: FrameWriter::new(stream, self.config.initial_sequence),
            reader,
        });

        let challenge: ChallengeResponse = match self.exchange(&ChallengeRequest) {
            Ok(challenge) => challenge,
            Err(err) => {
                self.close();
                return Err(err);
            }
        };
        debug!(mac = %challenge.mac_address, "challenge answered");
        self.identity.mac_address = Some(challenge.mac_address);
        self.state = SessionState::Connected;
        Ok(())
    }

    /// Log in on a connected session
    #[instrument(level = "debug", skip(self), fields(client = %self.config.client_name))]
    pub fn login(&mut self) -> Result<()> {
        if self.state != SessionState::Connected {
            return Err(Error::NotConnected);
        }
        let request = self.config.login_request();
        self.exchange::<_, LoginResponse>(&request)?;
        self.state = SessionState::Authenticated;
        debug!("logged in");
        Ok(())
    }

    /// Tear the socket down and run the handshake again.
    ///
    /// Discovery is not repeated and the sequence counter restarts.
    pub fn reconnect(&mut self) -> Result<()> {
        self.close();
        self.connect()?;
        self.login()
    }

    /// Close the socket; the session becomes unconnected
    pub fn close(&mut self) {
        if let Some(mut conn) = self.conn.take() {
            if let Some(handler) = conn.reader.take_handler() {
                self.handler = Some(handler);
            }
            // the peer may already be gone
            let _ = conn.writer.get_ref().shutdown(Shutdown::Both);
        }
        self.state = SessionState::Unconnected;
    }

    /// Firmware version string
    pub fn version(&mut self) -> Result<String> {
        let resp: VersionResponse = self.call(&VersionRequest)?;
        Ok(resp.version)
    }

    /// Fetch the controller configuration
    pub fn controller_config(&mut self) -> Result<ControllerConfig> {
        let resp: ControllerConfigResponse = self.call(&ControllerConfigRequest::default())?;
        Ok(ControllerConfig::new(resp))
    }

    /// Fetch the pool/spa status
    pub fn pool_status(&mut self) -> Result<PoolStatus> {
        let resp: PoolStatusResponse = self.call(&PoolStatusRequest::default())?;
        Ok(PoolStatus::new(resp))
    }

    /// Set the heat set-point of `body`, in the controller's unit
    pub fn set_heat_point(&mut self, body: BodyType, temperature: u32) -> Result<()> {
        let request = SetHeatPointRequest {
            controller_index: self.config.controller_index,
            body,
            temperature,
        };
        self.call::<_, SetHeatPointResponse>(&request)?;
        Ok(())
    }

    /// Set the heat mode of `body`
    pub fn set_heat_mode(&mut self, body: BodyType, mode: HeatMode) -> Result<()> {
        let request = SetHeatModeRequest {
            controller_index: self.config.controller_index,
            body,
            mode,
        };
        self.call::<_, SetHeatModeResponse>(&request)?;
        Ok(())
    }

    /// Temperature history between `start` and `end`.
    ///
    /// The gateway acknowledges first and pushes the samples in a second frame.
    pub fn history(&mut self, start: NaiveDateTime, end: NaiveDateTime) -> Result<HistoryData> {
        let request = HistoryRequest {
            controller_index: self.config.controller_index,
            start,
            end,
            sender_id: 0,
        };
        self.call::<_, HistoryResponse>(&request)?;
        self.guarded(|conn| conn.reader.read_response::<HistoryData>())
    }

    fn call<Q: Request, A: Response>(&mut self, request: &Q) -> Result<A> {
        if self.state != SessionState::Authenticated {
            return Err(Error::NotConnected);
        }
        self.exchange(request)
    }

    fn exchange<Q: Request, A: Response>(&mut self, request: &Q) -> Result<A> {
        self.guarded(|conn| {
            conn.writer.write_request(request)?;
            conn.reader.read_response::<A>()
        })
    }

    /// Run `f` on the open connection. A dropped or desynchronised stream
    /// closes the session so the next request reports [`Error::NotConnected`].
    fn guarded<T>(&mut self, f: impl FnOnce(&mut Connection) -> Result<T>) -> Result<T> {
        let conn = self.conn.as_mut().ok_or(Error::NotConnected)?;
        let result = f(conn);
        if let Err(err) = &result {
            if err.is_transient() || err.breaks_framing() {
                debug!(error = ?err, "closing session");
                self.close();
            }
        }
        result
    }
}

impl Drop for Gateway {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn offline() -> Gateway {
        Gateway::new(
            DiscoveryResponse {
                kind: 2,
                address: Ipv4Addr::LOCALHOST,
                port: 80,
                gateway_type: 2,
                subnet: 0,
                name: "Pentair: 00-11-22".to_string(),
            },
            ClientConfig::default(),
        )
    }

    #[test]
    fn test_requests_need_authentication() {
        let mut gateway = offline();
        assert_eq!(gateway.state(), SessionState::Unconnected);
        assert!(matches!(gateway.pool_status(), Err(Error::NotConnected)));
        assert!(matches!(gateway.login(), Err(Error::NotConnected)));
    }

    #[test]
    fn test_name_is_raw() {
        let gateway = offline();
        assert_eq!(gateway.name(), "Pentair: 00-11-22");
        assert_eq!(
            gateway.identity().socket_addr(),
            SocketAddr::from((Ipv4Addr::LOCALHOST, 80))
        );
    }
}
