//! Request/response traits shared by the message catalog

use bytes::Bytes;

use super::{Encoder, Error, FrameHeader, MessageCode, Result};

/// A message the client sends to the gateway.
pub trait Request {
    /// Type code written into the frame header
    const CODE: MessageCode;

    /// Write this message's body. Messages without a body write nothing.
    fn encode_body(&self, _encoder: &mut Encoder) -> Result<()> {
        Ok(())
    }

    /// Encode into the type code and body bytes that go into a frame
    fn encode(&self) -> Result<(u16, Bytes)> {
        let mut encoder = Encoder::new();
        self.encode_body(&mut encoder)?;
        Ok((Self::CODE.as_u16(), encoder.finish()))
    }
}

/// A message the client reads back from the gateway.
pub trait Response: Sized {
    /// Type code this response normally carries
    const CODE: MessageCode;

    /// Whether a frame with `code` is an answer to the pending request.
    ///
    /// Anything this rejects is treated as out-of-band by the frame reader.
    /// Responses that can come back as a distinguished failure code widen this.
    fn accepts(code: u16) -> bool {
        code == Self::CODE.as_u16()
    }

    /// Decode a response body; the header has already been matched by [`Response::accepts`]
    fn decode(header: &FrameHeader, body: &[u8]) -> Result<Self>;
}

/// Reject a header whose code is not `expected`.
pub(crate) fn expect_code(header: &FrameHeader, expected: MessageCode) -> Result<()> {
    if header.code() == expected.as_u16() {
        Ok(())
    } else {
        Err(Error::UnexpectedMessage {
            expected: expected.as_u16(),
            found: header.code(),
        })
    }
}

/// An empty acknowledgement, generic over its type code.
///
/// Used by commands whose answer carries no fields.
macro_rules! empty_response {
    ($(#[$meta:meta])* $name:ident => $code:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
        pub struct $name;

        impl $crate::protocol::Response for $name {
            const CODE: $crate::protocol::MessageCode = $code;

            fn decode(
                header: &$crate::protocol::FrameHeader,
                _body: &[u8],
            ) -> $crate::protocol::Result<Self> {
                $crate::protocol::message::expect_code(header, Self::CODE)?;
                Ok(Self)
            }
        }
    };
}

pub(crate) use empty_response;

/// One raw frame: header plus body bytes.
#[derive(Debug, Clone)]
pub struct Frame {
    header: FrameHeader,
    body: Bytes,
}

impl Frame {
    /// Create a frame from its parts
    #[must_use]
    pub fn new(header: FrameHeader, body: Bytes) -> Self {
        Self { header, body }
    }

    /// Get header
    #[must_use]
    pub const fn header(&self) -> &FrameHeader {
        &self.header
    }

    /// Get body
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Decode the body as `T`
    pub fn decode<T: Response>(&self) -> Result<T> {
        T::decode(&self.header, &self.body)
    }
}
