//! ScreenLogic protocol core
//!
//! This module provides the wire format, the field codec and the message
//! catalog. Nothing here touches a socket.

mod codec;
mod error;
mod header;
mod message;
pub mod messages;
pub mod metrics;
mod types;

pub use codec::{DATE_TIME_SIZE, Decoder, Encoder, string_padding};
pub use error::{Error, Result};
pub use header::FrameHeader;
pub use message::{Frame, Request, Response};
pub use types::MessageCode;

/// Frame header size in bytes
pub const HEADER_SIZE: usize = 8;

/// Largest body a frame may declare (16 MB)
pub const MAX_BODY_SIZE: usize = 16 * 1024 * 1024;

/// Well-known UDP port gateways listen on for discovery broadcasts
pub const DISCOVERY_PORT: u16 = 1444;
