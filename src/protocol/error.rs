//! ScreenLogic error types

use std::io;

use thiserror::Error;

use crate::equipment::BodyType;

/// ScreenLogic protocol and session errors
#[derive(Error, Debug)]
pub enum Error {
    /// IO error on the underlying socket
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A field or frame body claimed more bytes than were available
    #[error("truncated packet: need {needed} bytes, {remaining} remaining")]
    Truncated {
        /// Bytes the field needed
        needed: usize,
        /// Bytes left in the buffer
        remaining: usize,
    },

    /// A frame arrived whose type code nobody asked for
    #[error("malformed packet: expected type code {expected}, got {found}")]
    UnexpectedMessage {
        /// Type code the reader was waiting for
        expected: u16,
        /// Type code found in the frame header
        found: u16,
    },

    /// A response violated one of its own invariants
    #[error("malformed packet: {0}")]
    Malformed(String),

    /// A frame header was unusable; the position in the stream is lost
    #[error("malformed frame: {0}")]
    Framing(String),

    /// The gateway rejected the login
    #[error("login failed")]
    LoginFailed,

    /// The gateway rejected a command's parameters
    #[error("gateway rejected parameters of request {request}")]
    BadParameter {
        /// Type code of the rejected request
        request: u16,
    },

    /// Feature the protocol offers but this client refuses to fake
    #[error("not implemented: {0}")]
    Unimplemented(&'static str),

    /// A request was issued before the session was authenticated
    #[error("gateway session is not connected")]
    NotConnected,

    /// The status snapshot carries no record for the requested body of water
    #[error("controller reported no {0} body")]
    BodyNotReported(BodyType),

    /// Re-establishing the session failed while recovering from a dropped connection
    #[error("reconnect failed: {0}")]
    ReconnectFailed(#[source] Box<Error>),

    /// Every attempt the retry budget allowed hit a transient failure
    #[error("gave up after {attempts} attempts: {source}")]
    RetriesExhausted {
        /// Number of attempts made
        attempts: u32,
        /// Error from the final attempt
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Build a [`Error::Malformed`] from anything printable.
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed(reason.into())
    }

    /// Whether this error looks like a dropped connection that a reconnect may cure.
    ///
    /// Format and protocol errors are never transient: retrying them would only
    /// repeat the same misunderstanding on a fresh socket.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Io(err) => matches!(
                err.kind(),
                io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::ConnectionRefused
                    | io::ErrorKind::BrokenPipe
                    | io::ErrorKind::UnexpectedEof
                    | io::ErrorKind::TimedOut
                    | io::ErrorKind::WouldBlock
                    | io::ErrorKind::NotConnected
                    | io::ErrorKind::Interrupted
            ),
            Self::NotConnected => true,
            _ => false,
        }
    }

    /// Whether this error is one of the malformed-packet family.
    #[must_use]
    pub const fn is_malformed(&self) -> bool {
        matches!(
            self,
            Self::UnexpectedMessage { .. } | Self::Malformed(_) | Self::Framing(_)
        )
    }

    /// Whether the connection that raised this error can no longer be read in step.
    #[must_use]
    pub const fn breaks_framing(&self) -> bool {
        matches!(self, Self::Truncated { .. } | Self::Framing(_))
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
