//! Pool/spa status query and answer

use bytes::Bytes;

use super::config::count;
use crate::equipment::BodyType;
use crate::protocol::message::expect_code;
use crate::protocol::{
    Decoder, Encoder, Error, FrameHeader, MessageCode, Request, Response, Result,
};

/// Most bodies of water a controller can report (pool and spa)
pub const MAX_BODIES: u32 = 2;

/// Pool/spa status query. The single argument is always sent as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStatusRequest {
    /// Opaque argument
    pub arg: u32,
}

impl Request for PoolStatusRequest {
    const CODE: MessageCode = MessageCode::PoolStatus;

    fn encode_body(&self, encoder: &mut Encoder) -> Result<()> {
        encoder.put_u32(self.arg);
        Ok(())
    }
}

/// Temperature state of one body of water, in the controller's unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BodyStatus {
    /// Which body this record describes
    pub body: BodyType,
    /// Current water temperature
    pub current_temperature: i32,
    /// Heater status; 1 means heating
    pub heater_status: u32,
    /// Heat set-point
    pub heat_set_point: u32,
    /// Cool set-point
    pub cool_set_point: u32,
    /// Raw heat mode, see [`crate::HeatMode`]
    pub heat_mode: u32,
}

/// Runtime state of one circuit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CircuitStatus {
    /// Circuit id
    pub id: u32,
    /// Valve state
    pub valve_state: u32,
    /// Light color set
    pub color_set: u8,
    /// Light color position
    pub color_position: u8,
    /// Light color stagger
    pub color_stagger: u8,
    /// Delay
    pub delay: u8,
}

/// Water chemistry readings
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Chemistry {
    /// pH
    pub ph: f32,
    /// Oxidation reduction potential
    pub orp: f32,
    /// Saturation index
    pub saturation: f32,
    /// Salt, parts per million
    pub salt_ppm: u32,
    /// pH tank level
    pub ph_tank_level: u32,
    /// ORP tank level
    pub orp_tank_level: u32,
    /// Chemistry alarm bitmask
    pub alarms: u32,
}

/// Decoded pool/spa status body
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoolStatusResponse {
    /// Readiness code: 1 ready, 2 syncing, 3 service mode
    pub readiness: u32,
    /// Freeze protection state
    pub freeze_mode: u8,
    /// Remotes
    pub remotes: u8,
    /// Pool delay
    pub pool_delay: u8,
    /// Spa delay
    pub spa_delay: u8,
    /// Cleaner delay
    pub cleaner_delay: u8,
    /// Three bytes of unknown meaning
    pub reserved: [u8; 3],
    /// Outside air temperature
    pub air_temperature: i32,
    /// Bodies of water, in wire order
    pub bodies: Vec<BodyStatus>,
    /// Circuit states
    pub circuits: Vec<CircuitStatus>,
    /// Chemistry readings
    pub chemistry: Chemistry,
}

impl Response for PoolStatusResponse {
    const CODE: MessageCode = MessageCode::PoolStatusResponse;

    fn decode(header: &FrameHeader, body: &[u8]) -> Result<Self> {
        expect_code(header, Self::CODE)?;
        let mut dec = Decoder::new(body);

        let readiness = dec.read_u32()?;
        let freeze_mode = dec.read_u8()?;
        let remotes = dec.read_u8()?;
        let pool_delay = dec.read_u8()?;
        let spa_delay = dec.read_u8()?;
        let cleaner_delay = dec.read_u8()?;
        let reserved = dec.read_array::<3>()?;
        let air_temperature = dec.read_i32()?;

        let body_count = dec.read_u32()?;
        if body_count > MAX_BODIES {
            return Err(Error::malformed(format!(
                "{body_count} bodies of water (max {MAX_BODIES})"
            )));
        }
        let mut bodies: Vec<BodyStatus> = Vec::with_capacity(body_count as usize);
        for _ in 0..body_count {
            let raw_type = dec.read_u32()?;
            let body = BodyType::from_u32(raw_type)
                .ok_or_else(|| Error::malformed(format!("unknown body type {raw_type}")))?;
            if bodies.iter().any(|b| b.body == body) {
                return Err(Error::malformed(format!("{body} reported twice")));
            }
            bodies.push(BodyStatus {
                body,
                current_temperature: dec.read_i32()?,
                heater_status: dec.read_u32()?,
                heat_set_point: dec.read_u32()?,
                cool_set_point: dec.read_u32()?,
                heat_mode: dec.read_u32()?,
            });
        }

        let circuit_count = dec.read_u32()?;
        let mut circuits = Vec::new();
        for _ in 0..circuit_count {
            circuits.push(CircuitStatus {
                id: dec.read_u32()?,
                valve_state: dec.read_u32()?,
                color_set: dec.read_u8()?,
                color_position: dec.read_u8()?,
                color_stagger: dec.read_u8()?,
                delay: dec.read_u8()?,
            });
        }

        let chemistry = Chemistry {
            ph: hundredths(dec.read_u32()?),
            orp: hundredths(dec.read_u32()?),
            saturation: hundredths(dec.read_u32()?),
            salt_ppm: dec.read_u32()?,
            ph_tank_level: dec.read_u32()?,
            orp_tank_level: dec.read_u32()?,
            alarms: dec.read_u32()?,
        };

        Ok(Self {
            readiness,
            freeze_mode,
            remotes,
            pool_delay,
            spa_delay,
            cleaner_delay,
            reserved,
            air_temperature,
            bodies,
            circuits,
            chemistry,
        })
    }
}

#[allow(clippy::cast_precision_loss)]
fn hundredths(raw: u32) -> f32 {
    raw as f32 / 100.0
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_hundredths(value: f32) -> u32 {
    (value * 100.0).round() as u32
}

impl PoolStatusResponse {
    /// Encode into the wire layout (used by test gateways)
    pub fn encode(&self) -> Result<Bytes> {
        let mut enc = Encoder::new();
        enc.put_u32(self.readiness);
        enc.put_u8(self.freeze_mode);
        enc.put_u8(self.remotes);
        enc.put_u8(self.pool_delay);
        enc.put_u8(self.spa_delay);
        enc.put_u8(self.cleaner_delay);
        enc.put_bytes(&self.reserved);
        enc.put_i32(self.air_temperature);

        enc.put_u32(count(self.bodies.len())?);
        for body in &self.bodies {
            enc.put_u32(body.body.as_u32());
            enc.put_i32(body.current_temperature);
            enc.put_u32(body.heater_status);
            enc.put_u32(body.heat_set_point);
            enc.put_u32(body.cool_set_point);
            enc.put_u32(body.heat_mode);
        }

        enc.put_u32(count(self.circuits.len())?);
        for circuit in &self.circuits {
            enc.put_u32(circuit.id);
            enc.put_u32(circuit.valve_state);
            enc.put_u8(circuit.color_set);
            enc.put_u8(circuit.color_position);
            enc.put_u8(circuit.color_stagger);
            enc.put_u8(circuit.delay);
        }

        let chem = &self.chemistry;
        enc.put_u32(to_hundredths(chem.ph));
        enc.put_u32(to_hundredths(chem.orp));
        enc.put_u32(to_hundredths(chem.saturation));
        enc.put_u32(chem.salt_ppm);
        enc.put_u32(chem.ph_tank_level);
        enc.put_u32(chem.orp_tank_level);
        enc.put_u32(chem.alarms);
        Ok(enc.finish())
    }
}
