//! ScreenLogic field codec
//!
//! Little-endian primitives, length-prefixed strings padded to 4 bytes, and the
//! 16 byte date-time record. Decoding never panics and never zero-fills: a
//! field that runs past the end of the buffer is an [`Error::Truncated`].

use bytes::{Buf, BufMut, Bytes, BytesMut};
use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

use super::{Error, Result};

/// Size of an encoded date-time record in bytes
pub const DATE_TIME_SIZE: usize = 16;

/// Zero bytes needed after a string of `len` bytes to reach a 4 byte boundary.
#[must_use]
pub const fn string_padding(len: usize) -> usize {
    (4 - len % 4) % 4
}

/// Writes protocol fields into a growable buffer.
#[derive(Debug, Default)]
pub struct Encoder {
    buf: BytesMut,
}

impl Encoder {
    /// Create an empty encoder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a single byte
    pub fn put_u8(&mut self, value: u8) {
        self.buf.put_u8(value);
    }

    /// Write a boolean as one byte (1 or 0)
    pub fn put_bool(&mut self, value: bool) {
        self.buf.put_u8(u8::from(value));
    }

    /// Write a little-endian `u16`
    pub fn put_u16(&mut self, value: u16) {
        self.buf.put_u16_le(value);
    }

    /// Write a little-endian `u32`
    pub fn put_u32(&mut self, value: u32) {
        self.buf.put_u32_le(value);
    }

    /// Write a little-endian `i32`
    pub fn put_i32(&mut self, value: i32) {
        self.buf.put_i32_le(value);
    }

    /// Write raw bytes with no length prefix
    pub fn put_bytes(&mut self, data: &[u8]) {
        self.buf.put_slice(data);
    }

    /// Write a `u32` length, the bytes, then zero padding up to a 4 byte boundary
    pub fn put_string(&mut self, value: &str) -> Result<()> {
        self.put_padded(value.as_bytes())
    }

    /// Same layout as [`Encoder::put_string`] for data that is not text
    pub fn put_padded(&mut self, data: &[u8]) -> Result<()> {
        let len = u32::try_from(data.len())
            .map_err(|_| Error::malformed(format!("string of {} bytes", data.len())))?;
        self.buf.put_u32_le(len);
        self.buf.put_slice(data);
        self.buf.put_bytes(0, string_padding(data.len()));
        Ok(())
    }

    /// Write year, month, day-of-week (always 0), day, hour, minute, second and
    /// millisecond as `u16` fields
    pub fn put_date_time(&mut self, value: &NaiveDateTime) -> Result<()> {
        let year = u16::try_from(value.year())
            .map_err(|_| Error::malformed(format!("year {} out of range", value.year())))?;
        let millis = (value.nanosecond() / 1_000_000).min(999);

        self.put_u16(year);
        self.put_u16(to_u16(value.month()));
        self.put_u16(0);
        self.put_u16(to_u16(value.day()));
        self.put_u16(to_u16(value.hour()));
        self.put_u16(to_u16(value.minute()));
        self.put_u16(to_u16(value.second()));
        self.put_u16(to_u16(millis));
        Ok(())
    }

    /// Bytes written so far
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Check whether nothing has been written
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Consume the encoder and return the written bytes
    #[must_use]
    pub fn finish(self) -> Bytes {
        self.buf.freeze()
    }
}

// chrono calendar fields are all far below u16::MAX
fn to_u16(value: u32) -> u16 {
    u16::try_from(value).unwrap_or(u16::MAX)
}

/// Reads protocol fields from a borrowed body.
#[derive(Debug, Clone)]
pub struct Decoder<'a> {
    buf: &'a [u8],
}

impl<'a> Decoder<'a> {
    /// Create a decoder over `buf`
    #[must_use]
    pub const fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    /// Bytes not yet consumed
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.buf.len()
    }

    fn need(&self, needed: usize) -> Result<()> {
        if self.buf.len() < needed {
            return Err(Error::Truncated {
                needed,
                remaining: self.buf.len(),
            });
        }
        Ok(())
    }

    /// Read a single byte
    pub fn read_u8(&mut self) -> Result<u8> {
        self.need(1)?;
        Ok(self.buf.get_u8())
    }

    /// Read a boolean; only the byte 1 is `true`
    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? == 1)
    }

    /// Read a little-endian `u16`
    pub fn read_u16(&mut self) -> Result<u16> {
        self.need(2)?;
        Ok(self.buf.get_u16_le())
    }

    /// Read a little-endian `u32`
    pub fn read_u32(&mut self) -> Result<u32> {
        self.need(4)?;
        Ok(self.buf.get_u32_le())
    }

    /// Read a little-endian `i32`
    pub fn read_i32(&mut self) -> Result<i32> {
        self.need(4)?;
        Ok(self.buf.get_i32_le())
    }

    /// Fill `out` with the next `out.len()` bytes
    pub fn copy_into(&mut self, out: &mut [u8]) -> Result<()> {
        self.need(out.len())?;
        self.buf.copy_to_slice(out);
        Ok(())
    }

    /// Read a fixed-size byte array
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        self.copy_into(&mut out)?;
        Ok(out)
    }

    /// Discard `len` bytes
    pub fn skip(&mut self, len: usize) -> Result<()> {
        self.need(len)?;
        self.buf.advance(len);
        Ok(())
    }

    /// Read a length-prefixed padded byte string, dropping the padding
    pub fn read_padded(&mut self) -> Result<&'a [u8]> {
        let len = self.read_u32()? as usize;
        let padded = len
            .checked_add(string_padding(len))
            .ok_or_else(|| Error::malformed(format!("string length {len}")))?;
        self.need(padded)?;

        let (value, rest) = self.buf.split_at(padded);
        self.buf = rest;
        Ok(&value[..len])
    }

    /// Read a length-prefixed padded string.
    ///
    /// Lossy: invalid UTF-8 sequences become U+FFFD instead of failing the read.
    pub fn read_string(&mut self) -> Result<String> {
        let raw = self.read_padded()?;
        Ok(String::from_utf8_lossy(raw).into_owned())
    }

    /// Read a date-time record; the day-of-week slot is ignored
    pub fn read_date_time(&mut self) -> Result<NaiveDateTime> {
        self.need(DATE_TIME_SIZE)?;
        let year = self.read_u16()?;
        let month = self.read_u16()?;
        let _day_of_week = self.read_u16()?;
        let day = self.read_u16()?;
        let hour = self.read_u16()?;
        let minute = self.read_u16()?;
        let second = self.read_u16()?;
        let millis = self.read_u16()?;

        NaiveDate::from_ymd_opt(i32::from(year), u32::from(month), u32::from(day))
            .and_then(|date| {
                date.and_hms_milli_opt(
                    u32::from(hour),
                    u32::from(minute),
                    u32::from(second),
                    u32::from(millis),
                )
            })
            .ok_or_else(|| {
                Error::malformed(format!(
                    "invalid date-time {year:04}-{month:02}-{day:02} \
                     {hour:02}:{minute:02}:{second:02}.{millis:03}"
                ))
            })
    }

    /// Everything left in the buffer
    pub fn read_tail(&mut self) -> &'a [u8] {
        let tail = self.buf;
        self.buf = &[];
        tail
    }
}
