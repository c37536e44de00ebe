//! ScreenLogic - client for the Pentair ScreenLogic pool/spa gateway protocol
//!
//! This library speaks the gateway's binary protocol over the local network:
//! UDP discovery, the framed TCP session with its challenge and login
//! handshake, and the typed request/response messages for configuration,
//! status, heating commands and temperature history.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use screenlogic::{BodyType, Client, ClientConfig, TemperatureUnit};
//!
//! let client = Client::connect(ClientConfig::with_client_name("deck"))?;
//! println!("{}", client.gateway_name());
//!
//! let pool = client.current_temperature(BodyType::Pool, TemperatureUnit::Celsius)?;
//! println!("pool is at {pool}°C");
//! # Ok::<(), screenlogic::Error>(())
//! ```
//!
//! # Layers
//!
//! - [`protocol`] - wire format, codec and message catalog; no I/O
//! - [`transport`] - discovery, framing and the [`Gateway`] session
//! - [`Client`] - thread-safe wrapper with caching and reconnect-and-retry
//!
//! Password-protected logins are refused with [`Error::Unimplemented`]: the
//! protocol's password path is not implemented and the client will not send a
//! password in clear.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

mod client;
mod config;
mod equipment;
pub mod protocol;
pub mod transport;

pub use client::{Client, Session};
pub use config::{ClientConfig, DiscoveryConfig};
pub use equipment::{
    BodyType, ControllerConfig, HeatMode, HeatingState, PoolStatus, Readiness, TemperatureUnit,
};
pub use protocol::metrics::{MetricsSnapshot, snapshot as metrics};
pub use protocol::{DISCOVERY_PORT, Error, FrameHeader, MessageCode, Result};
pub use transport::{Gateway, GatewayIdentity, SessionState, discover};
