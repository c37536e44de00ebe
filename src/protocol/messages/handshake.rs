//! Connection challenge, login and firmware version messages

use crate::protocol::message::expect_code;
use crate::protocol::{
    Decoder, Encoder, Error, FrameHeader, MessageCode, Request, Response, Result,
};

/// Literal written right after the TCP connect, before any framed traffic
pub const CONNECT_PREAMBLE: &[u8] = b"CONNECTSERVERHOST\r\n\r\n";

/// Length of the zero-filled password field sent on local logins
pub const EMPTY_PASSWORD_LEN: usize = 16;

/// Schema version sent on login
pub const LOGIN_SCHEMA: u32 = 348;

/// Challenge request (no body)
#[derive(Debug, Clone, Copy, Default)]
pub struct ChallengeRequest;

impl Request for ChallengeRequest {
    const CODE: MessageCode = MessageCode::Challenge;
}

/// Challenge answer carrying the gateway's MAC address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeResponse {
    /// MAC address string, e.g. `00-11-22-33-44-55`
    pub mac_address: String,
}

impl Response for ChallengeResponse {
    const CODE: MessageCode = MessageCode::ChallengeResponse;

    fn decode(header: &FrameHeader, body: &[u8]) -> Result<Self> {
        expect_code(header, Self::CODE)?;
        let mac_address = Decoder::new(body).read_string()?;
        Ok(Self { mac_address })
    }
}

/// Local login request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginRequest {
    /// Protocol schema version
    pub schema: u32,
    /// Connection type
    pub connection_type: u32,
    /// Name this client shows up as on the gateway
    pub client_name: String,
    /// Remote password. Only `None` or empty is supported.
    pub password: Option<String>,
    /// Process identifier reported to the gateway
    pub process_id: u32,
}

impl Request for LoginRequest {
    const CODE: MessageCode = MessageCode::Login;

    fn encode_body(&self, encoder: &mut Encoder) -> Result<()> {
        // Refuse before writing anything: sending the password in clear is not an option.
        if self.password.as_deref().is_some_and(|p| !p.is_empty()) {
            return Err(Error::Unimplemented("password-protected login"));
        }

        encoder.put_u32(self.schema);
        encoder.put_u32(self.connection_type);
        encoder.put_string(&self.client_name)?;
        encoder.put_padded(&[0u8; EMPTY_PASSWORD_LEN])?;
        encoder.put_u32(self.process_id);
        Ok(())
    }
}

/// Login acknowledgement.
///
/// The body carries 16 bytes nobody has decoded yet; they are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoginResponse;

impl Response for LoginResponse {
    const CODE: MessageCode = MessageCode::LoginResponse;

    fn accepts(code: u16) -> bool {
        code == Self::CODE.as_u16() || code == MessageCode::LoginFailed.as_u16()
    }

    fn decode(header: &FrameHeader, _body: &[u8]) -> Result<Self> {
        if header.code() == MessageCode::LoginFailed.as_u16() {
            return Err(Error::LoginFailed);
        }
        expect_code(header, Self::CODE)?;
        Ok(Self)
    }
}

/// Firmware version query (no body)
#[derive(Debug, Clone, Copy, Default)]
pub struct VersionRequest;

impl Request for VersionRequest {
    const CODE: MessageCode = MessageCode::Version;
}

/// Number of opaque `u32` fields after the version string
const VERSION_TRAILER_FIELDS: usize = 6;

/// Firmware version answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionResponse {
    /// Version string, e.g. `POOL: 5.2 Build 736.0 Rel`
    pub version: String,
}

impl Response for VersionResponse {
    const CODE: MessageCode = MessageCode::VersionResponse;

    fn decode(header: &FrameHeader, body: &[u8]) -> Result<Self> {
        expect_code(header, Self::CODE)?;
        let mut decoder = Decoder::new(body);
        let version = decoder.read_string()?;
        decoder.skip(VERSION_TRAILER_FIELDS * 4)?;
        Ok(Self { version })
    }
}
