//! Client configuration

use std::net::Ipv4Addr;
use std::time::Duration;

use crate::protocol::DISCOVERY_PORT;
use crate::protocol::messages::LoginRequest;
use crate::protocol::messages::handshake::LOGIN_SCHEMA;

/// Discovery options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryConfig {
    /// Address the discovery request is broadcast to.
    pub broadcast_address: Ipv4Addr,
    /// UDP port gateways listen on.
    pub port: u16,
    /// How long to wait for an answer. `None` blocks until one arrives.
    pub timeout: Option<Duration>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            broadcast_address: Ipv4Addr::BROADCAST,
            port: DISCOVERY_PORT,
            timeout: Some(Duration::from_secs(5)),
        }
    }
}

/// Session and client options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Name this client shows up as on the gateway.
    pub client_name: String,
    /// Remote password. Password logins are not supported; a non-empty value
    /// makes the login fail with [`crate::Error::Unimplemented`].
    pub password: Option<String>,
    /// Sequence number of the first frame on every connection.
    pub initial_sequence: u16,
    /// Schema version sent on login.
    pub login_schema: u32,
    /// Connection type sent on login.
    pub login_connection_type: u32,
    /// Process id sent on login.
    pub process_id: u32,
    /// Controller index used by commands.
    pub controller_index: u32,
    /// How long cached configuration and status stay fresh.
    pub cache_ttl: Duration,
    /// Reconnect-and-retry attempts after a transient failure.
    pub reconnect_retries: u32,
    /// Optional TCP connect timeout.
    pub connect_timeout: Option<Duration>,
    /// Optional socket read timeout.
    pub read_timeout: Option<Duration>,
    /// Optional socket write timeout.
    pub write_timeout: Option<Duration>,
    /// Discovery options.
    pub discovery: DiscoveryConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            client_name: "screenlogic-rs".to_string(),
            password: None,
            initial_sequence: 2,
            login_schema: LOGIN_SCHEMA,
            login_connection_type: 0,
            process_id: 2,
            controller_index: 0,
            cache_ttl: Duration::from_secs(60),
            reconnect_retries: 1,
            connect_timeout: Some(Duration::from_secs(10)),
            read_timeout: Some(Duration::from_secs(10)),
            write_timeout: Some(Duration::from_secs(10)),
            discovery: DiscoveryConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Default options with a different client name
    #[must_use]
    pub fn with_client_name(client_name: impl Into<String>) -> Self {
        Self {
            client_name: client_name.into(),
            ..Self::default()
        }
    }

    pub(crate) fn login_request(&self) -> LoginRequest {
        LoginRequest {
            schema: self.login_schema,
            connection_type: self.login_connection_type,
            client_name: self.client_name.clone(),
            password: self.password.clone(),
            process_id: self.process_id,
        }
    }
}
