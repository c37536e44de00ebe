//! Sockets and sessions: discovery, framing and the gateway session

mod discovery;
mod framing;
mod gateway;

pub use discovery::discover;
pub use framing::{FrameReader, FrameWriter, OutOfBandHandler};
pub use gateway::{Gateway, GatewayIdentity, SessionState};
