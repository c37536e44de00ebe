//! Frame reader and writer over a byte stream
//!
//! ```text
//! write: [header 8 bytes][body]  -> one write_all
//! read:  [header 8 bytes] -> body_len bytes -> accepted?  -> decode
//!                                           \-> otherwise -> out-of-band handler, loop
//! ```

use std::fmt;
use std::io::{Read, Write};

use bytes::{BufMut, Bytes, BytesMut};
use tracing::{debug, trace};

use crate::protocol::metrics::{FrameDirection, Metrics};
use crate::protocol::{
    Error, Frame, FrameHeader, HEADER_SIZE, MessageCode, Request, Response, Result,
};

/// Callback for frames nobody asked for: gateway pushes such as the weather
/// notification, and codes this crate does not know.
///
/// Returning an error aborts the pending read with that error.
pub type OutOfBandHandler = Box<dyn FnMut(&FrameHeader, &[u8]) -> Result<()> + Send>;

/// Writes frames and owns the outgoing sequence counter.
#[derive(Debug)]
pub struct FrameWriter<W> {
    inner: W,
    next_sequence: u16,
}

impl<W: Write> FrameWriter<W> {
    /// Wrap a stream; the first frame carries `initial_sequence`
    pub const fn new(inner: W, initial_sequence: u16) -> Self {
        Self {
            inner,
            next_sequence: initial_sequence,
        }
    }

    /// Write one frame. Header and body go out in a single write; some gateway
    /// firmware mishandles a header that arrives on its own.
    pub fn write_frame(&mut self, code: u16, body: &[u8]) -> Result<FrameHeader> {
        let body_len = u32::try_from(body.len())
            .map_err(|_| Error::malformed(format!("body of {} bytes", body.len())))?;
        let header = FrameHeader::new(self.next_sequence, code, body_len);
        header.validate()?;

        let mut buf = BytesMut::with_capacity(HEADER_SIZE + body.len());
        buf.put_slice(&header.to_bytes());
        buf.put_slice(body);

        self.inner.write_all(&buf)?;
        self.inner.flush()?;
        self.next_sequence = self.next_sequence.wrapping_add(1);

        trace!(
            sequence = header.sequence(),
            code,
            body_len,
            "frame written"
        );
        Metrics::record_frame(FrameDirection::Sent, buf.len());
        Ok(header)
    }

    /// Encode and write a request
    pub fn write_request<R: Request>(&mut self, request: &R) -> Result<FrameHeader> {
        let (code, body) = request.encode()?;
        self.write_frame(code, &body)
    }

    /// Borrow the underlying stream
    pub const fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Unwrap the underlying stream
    pub fn into_inner(self) -> W {
        self.inner
    }
}

/// Reads frames and routes the ones the caller did not ask for.
pub struct FrameReader<R> {
    inner: R,
    handler: Option<OutOfBandHandler>,
}

impl<R> fmt::Debug for FrameReader<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameReader")
            .field("handler", &self.handler.is_some())
            .finish_non_exhaustive()
    }
}

impl<R: Read> FrameReader<R> {
    /// Wrap a stream with no out-of-band handler
    pub const fn new(inner: R) -> Self {
        Self {
            inner,
            handler: None,
        }
    }

    /// Install the out-of-band handler, returning the previous one
    pub fn set_handler(&mut self, handler: OutOfBandHandler) -> Option<OutOfBandHandler> {
        self.handler.replace(handler)
    }

    /// Remove the out-of-band handler
    pub fn take_handler(&mut self) -> Option<OutOfBandHandler> {
        self.handler.take()
    }

    /// Read exactly one frame.
    ///
    /// A stream that ends before the header is an I/O error; a body shorter than
    /// the header declares is [`Error::Truncated`].
    pub fn read_frame(&mut self) -> Result<Frame> {
        let mut raw = [0u8; HEADER_SIZE];
        self.inner.read_exact(&mut raw)?;
        let header = FrameHeader::from_bytes(&raw)?;

        let needed = header.body_len() as usize;
        let mut body = Vec::with_capacity(needed);
        (&mut self.inner)
            .take(u64::from(header.body_len()))
            .read_to_end(&mut body)?;
        if body.len() < needed {
            return Err(Error::Truncated {
                needed,
                remaining: body.len(),
            });
        }

        trace!(
            sequence = header.sequence(),
            code = header.code(),
            body_len = needed,
            "frame read"
        );
        Metrics::record_frame(FrameDirection::Received, HEADER_SIZE + needed);
        Ok(Frame::new(header, Bytes::from(body)))
    }

    /// Read frames until one `T` accepts, handing pushed and unknown frames to
    /// the out-of-band handler in arrival order.
    ///
    /// A known reply code that `T` does not accept is a wrong answer, not a
    /// push, and fails with [`Error::UnexpectedMessage`] whatever the handler.
    pub fn read_response<T: Response>(&mut self) -> Result<T> {
        loop {
            let frame = self.read_frame()?;
            if T::accepts(frame.header().code()) {
                return frame.decode::<T>();
            }
            self.out_of_band(&frame, T::CODE)?;
        }
    }

    fn out_of_band(&mut self, frame: &Frame, expected: MessageCode) -> Result<()> {
        let header = frame.header();
        let known = header.message_code();
        let wrong_answer = known.is_some_and(|code| !code.is_unsolicited());
        let handler = match self.handler.as_mut() {
            Some(handler) if !wrong_answer => handler,
            _ => {
                return Err(Error::UnexpectedMessage {
                    expected: expected.as_u16(),
                    found: header.code(),
                });
            }
        };

        debug!(
            code = header.code(),
            ?known,
            waiting_for = %expected,
            "out-of-band frame"
        );
        Metrics::record_out_of_band();
        handler(header, &frame.body()[..])
    }

    /// Borrow the underlying stream
    pub const fn get_ref(&self) -> &R {
        &self.inner
    }
}
