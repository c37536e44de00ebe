//! Controller configuration query and answer

use crate::protocol::message::expect_code;
use crate::protocol::{Decoder, Encoder, FrameHeader, MessageCode, Request, Response, Result};

/// Size of the pump table in the configuration answer
pub const PUMP_COUNT: usize = 8;

/// Controller configuration query.
///
/// Both fields are sent as zero; their meaning is not known.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControllerConfigRequest {
    /// First opaque argument
    pub arg0: u32,
    /// Second opaque argument
    pub arg1: u32,
}

impl Request for ControllerConfigRequest {
    const CODE: MessageCode = MessageCode::ControllerConfig;

    fn encode_body(&self, encoder: &mut Encoder) -> Result<()> {
        encoder.put_u32(self.arg0);
        encoder.put_u32(self.arg1);
        Ok(())
    }
}

/// Inclusive set-point range, in the controller's unit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SetPointRange {
    /// Lowest allowed set-point
    pub min: u8,
    /// Highest allowed set-point
    pub max: u8,
}

/// A named circuit defined on the controller
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Circuit {
    /// Circuit id used by circuit commands
    pub id: u32,
    /// Display name
    pub name: String,
    /// Index into the controller's name table
    pub name_index: u8,
    /// Circuit function code
    pub function: u8,
    /// Interface code
    pub interface: u8,
    /// Circuit flags
    pub flags: u8,
    /// Light color set
    pub color_set: u8,
    /// Light color position
    pub color_position: u8,
    /// Light color stagger
    pub color_stagger: u8,
    /// Device id
    pub device_id: u8,
    /// Default run time
    pub default_runtime: u16,
}

/// A named light color
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Color {
    /// Display name
    pub name: String,
    /// Red component
    pub red: u32,
    /// Green component
    pub green: u32,
    /// Blue component
    pub blue: u32,
}

/// Decoded controller configuration body
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ControllerConfigResponse {
    /// Controller id
    pub controller_id: u32,
    /// Allowed pool heat set-points
    pub pool_set_point: SetPointRange,
    /// Allowed spa heat set-points
    pub spa_set_point: SetPointRange,
    /// Whether the controller reports temperatures in Celsius
    pub is_celsius: bool,
    /// Controller model code
    pub controller_type: u8,
    /// Hardware revision code
    pub hardware_type: u8,
    /// Controller buffer
    pub controller_buffer: u8,
    /// Equipment capability bitmask
    pub equipment_flags: u32,
    /// Name given to unnamed circuits
    pub default_circuit_name: String,
    /// Circuits defined on the controller
    pub circuits: Vec<Circuit>,
    /// Light colors
    pub colors: Vec<Color>,
    /// One opaque byte per pump slot
    pub pumps: [u8; PUMP_COUNT],
    /// Which tabs the vendor UI shows
    pub interface_tab_flags: u32,
    /// Whether the vendor UI shows alarms
    pub show_alarms: bool,
}

impl Response for ControllerConfigResponse {
    const CODE: MessageCode = MessageCode::ControllerConfigResponse;

    fn decode(header: &FrameHeader, body: &[u8]) -> Result<Self> {
        expect_code(header, Self::CODE)?;
        let mut dec = Decoder::new(body);

        let controller_id = dec.read_u32()?;
        let pool_set_point = SetPointRange {
            min: dec.read_u8()?,
            max: dec.read_u8()?,
        };
        let spa_set_point = SetPointRange {
            min: dec.read_u8()?,
            max: dec.read_u8()?,
        };
        let is_celsius = dec.read_bool()?;
        let controller_type = dec.read_u8()?;
        let hardware_type = dec.read_u8()?;
        let controller_buffer = dec.read_u8()?;
        let equipment_flags = dec.read_u32()?;
        let default_circuit_name = dec.read_string()?;

        let circuit_count = dec.read_u32()?;
        let mut circuits = Vec::new();
        for _ in 0..circuit_count {
            circuits.push(decode_circuit(&mut dec)?);
        }

        let color_count = dec.read_u32()?;
        let mut colors = Vec::new();
        for _ in 0..color_count {
            colors.push(Color {
                name: dec.read_string()?,
                red: dec.read_u32()?,
                green: dec.read_u32()?,
                blue: dec.read_u32()?,
            });
        }

        let pumps = dec.read_array::<PUMP_COUNT>()?;
        let interface_tab_flags = dec.read_u32()?;
        let show_alarms = dec.read_bool()?;

        Ok(Self {
            controller_id,
            pool_set_point,
            spa_set_point,
            is_celsius,
            controller_type,
            hardware_type,
            controller_buffer,
            equipment_flags,
            default_circuit_name,
            circuits,
            colors,
            pumps,
            interface_tab_flags,
            show_alarms,
        })
    }
}

fn decode_circuit(dec: &mut Decoder<'_>) -> Result<Circuit> {
    let circuit = Circuit {
        id: dec.read_u32()?,
        name: dec.read_string()?,
        name_index: dec.read_u8()?,
        function: dec.read_u8()?,
        interface: dec.read_u8()?,
        flags: dec.read_u8()?,
        color_set: dec.read_u8()?,
        color_position: dec.read_u8()?,
        color_stagger: dec.read_u8()?,
        device_id: dec.read_u8()?,
        default_runtime: dec.read_u16()?,
    };
    // two bytes of unknown meaning close every circuit record
    dec.skip(2)?;
    Ok(circuit)
}

impl ControllerConfigResponse {
    /// Encode into the wire layout (used by test gateways)
    pub fn encode(&self) -> Result<bytes::Bytes> {
        let mut enc = Encoder::new();
        enc.put_u32(self.controller_id);
        enc.put_u8(self.pool_set_point.min);
        enc.put_u8(self.pool_set_point.max);
        enc.put_u8(self.spa_set_point.min);
        enc.put_u8(self.spa_set_point.max);
        enc.put_bool(self.is_celsius);
        enc.put_u8(self.controller_type);
        enc.put_u8(self.hardware_type);
        enc.put_u8(self.controller_buffer);
        enc.put_u32(self.equipment_flags);
        enc.put_string(&self.default_circuit_name)?;

        enc.put_u32(count(self.circuits.len())?);
        for circuit in &self.circuits {
            enc.put_u32(circuit.id);
            enc.put_string(&circuit.name)?;
            enc.put_u8(circuit.name_index);
            enc.put_u8(circuit.function);
            enc.put_u8(circuit.interface);
            enc.put_u8(circuit.flags);
            enc.put_u8(circuit.color_set);
            enc.put_u8(circuit.color_position);
            enc.put_u8(circuit.color_stagger);
            enc.put_u8(circuit.device_id);
            enc.put_u16(circuit.default_runtime);
            enc.put_u16(0);
        }

        enc.put_u32(count(self.colors.len())?);
        for color in &self.colors {
            enc.put_string(&color.name)?;
            enc.put_u32(color.red);
            enc.put_u32(color.green);
            enc.put_u32(color.blue);
        }

        enc.put_bytes(&self.pumps);
        enc.put_u32(self.interface_tab_flags);
        enc.put_bool(self.show_alarms);
        Ok(enc.finish())
    }
}

pub(crate) fn count(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| crate::Error::malformed(format!("{len} records")))
}
