//! Heating commands: set-point and heat mode

use crate::equipment::{BodyType, HeatMode};
use crate::protocol::message::expect_code;
use crate::protocol::{Encoder, Error, FrameHeader, MessageCode, Request, Response, Result};

/// Set the heat set-point of one body of water
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetHeatPointRequest {
    /// Controller index, normally 0
    pub controller_index: u32,
    /// Body of water to change
    pub body: BodyType,
    /// New set-point in the controller's unit
    pub temperature: u32,
}

impl Request for SetHeatPointRequest {
    const CODE: MessageCode = MessageCode::SetHeatPoint;

    fn encode_body(&self, encoder: &mut Encoder) -> Result<()> {
        encoder.put_u32(self.controller_index);
        encoder.put_u32(self.body.as_u32());
        encoder.put_u32(self.temperature);
        Ok(())
    }
}

/// Set the heat mode of one body of water
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetHeatModeRequest {
    /// Controller index, normally 0
    pub controller_index: u32,
    /// Body of water to change
    pub body: BodyType,
    /// New heat mode
    pub mode: HeatMode,
}

impl Request for SetHeatModeRequest {
    const CODE: MessageCode = MessageCode::SetHeatMode;

    fn encode_body(&self, encoder: &mut Encoder) -> Result<()> {
        encoder.put_u32(self.controller_index);
        encoder.put_u32(self.body.as_u32());
        encoder.put_u32(self.mode.as_u32());
        Ok(())
    }
}

/// Command acknowledgement that may come back as a bad-parameter frame instead.
fn decode_ack(header: &FrameHeader, code: MessageCode, request: MessageCode) -> Result<()> {
    if header.code() == MessageCode::BadParameter.as_u16() {
        return Err(Error::BadParameter {
            request: request.as_u16(),
        });
    }
    expect_code(header, code)
}

fn accepts_ack(code: u16, ack: MessageCode) -> bool {
    code == ack.as_u16() || code == MessageCode::BadParameter.as_u16()
}

/// Set-point acknowledgement (no body)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetHeatPointResponse;

impl Response for SetHeatPointResponse {
    const CODE: MessageCode = MessageCode::SetHeatPointResponse;

    fn accepts(code: u16) -> bool {
        accepts_ack(code, Self::CODE)
    }

    fn decode(header: &FrameHeader, _body: &[u8]) -> Result<Self> {
        decode_ack(header, Self::CODE, MessageCode::SetHeatPoint)?;
        Ok(Self)
    }
}

/// Heat mode acknowledgement (no body)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetHeatModeResponse;

impl Response for SetHeatModeResponse {
    const CODE: MessageCode = MessageCode::SetHeatModeResponse;

    fn accepts(code: u16) -> bool {
        accepts_ack(code, Self::CODE)
    }

    fn decode(header: &FrameHeader, _body: &[u8]) -> Result<Self> {
        decode_ack(header, Self::CODE, MessageCode::SetHeatMode)?;
        Ok(Self)
    }
}
