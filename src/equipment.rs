//! Equipment model
//!
//! Typed views over the decoded configuration and status bodies. The wrappers
//! hold the wire payload unchanged and derive everything else on access.

use std::fmt;

use crate::protocol::messages::{
    BodyStatus, Chemistry, Circuit, CircuitStatus, ControllerConfigResponse, PoolStatusResponse,
    SetPointRange,
};
use crate::protocol::{Error, Result};

/// Body of water
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u32)]
pub enum BodyType {
    /// Pool
    Pool = 0,
    /// Spa
    Spa = 1,
}

impl BodyType {
    /// Convert from the wire value
    #[must_use]
    pub const fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Pool),
            1 => Some(Self::Spa),
            _ => None,
        }
    }

    /// Convert to the wire value
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self as u32
    }
}

impl fmt::Display for BodyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Self::Pool => "pool",
            Self::Spa => "spa",
        })
    }
}

/// Heating strategy for a body of water
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u32)]
pub enum HeatMode {
    /// Heating disabled
    Off = 0,
    /// Solar only
    SolarOnly = 1,
    /// Solar first, heater as backup
    SolarPreferred = 2,
    /// Heater
    On = 3,
    /// Leave the current mode alone; only meaningful in commands
    Unchanged = 4,
}

impl HeatMode {
    /// Convert from the wire value
    #[must_use]
    pub const fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Off),
            1 => Some(Self::SolarOnly),
            2 => Some(Self::SolarPreferred),
            3 => Some(Self::On),
            4 => Some(Self::Unchanged),
            _ => None,
        }
    }

    /// Convert to the wire value
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self as u32
    }

}

/// What the heater is doing right now
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HeatingState {
    /// Not heating
    Idle,
    /// Heating
    Heating,
}

/// Temperature unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TemperatureUnit {
    /// Degrees Fahrenheit
    Fahrenheit,
    /// Degrees Celsius
    Celsius,
}

impl TemperatureUnit {
    /// Convert a whole-degree reading from `self` into `target`.
    ///
    /// The controller works in whole degrees; results are floored. `None` when
    /// the result does not fit an `i32`.
    #[must_use]
    pub fn convert(self, value: i32, target: Self) -> Option<i32> {
        let value = i64::from(value);
        let converted = match (self, target) {
            (Self::Fahrenheit, Self::Celsius) => ((value - 32) * 5).div_euclid(9),
            (Self::Celsius, Self::Fahrenheit) => (value * 9).div_euclid(5) + 32,
            _ => value,
        };
        i32::try_from(converted).ok()
    }

    /// Unit symbol
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Fahrenheit => "°F",
            Self::Celsius => "°C",
        }
    }
}

/// Controller readiness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Readiness {
    /// Ready
    Ready,
    /// Synchronising with the equipment
    Syncing,
    /// Service mode
    ServiceMode,
    /// A code this client does not know
    Unknown(u32),
}

impl Readiness {
    /// Convert from the wire value
    #[must_use]
    pub const fn from_u32(value: u32) -> Self {
        match value {
            1 => Self::Ready,
            2 => Self::Syncing,
            3 => Self::ServiceMode,
            other => Self::Unknown(other),
        }
    }
}

/// Controller configuration snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ControllerConfig {
    raw: ControllerConfigResponse,
}

const FLAG_SOLAR: u32 = 0x1;
const FLAG_SOLAR_AS_HEAT_PUMP: u32 = 0x2;
const FLAG_CHLORINATOR: u32 = 0x4;
const FLAG_COOLING: u32 = 0x800;
const FLAG_INTELLICHEM: u32 = 0x8000;

impl ControllerConfig {
    /// Wrap a decoded configuration body
    #[must_use]
    pub const fn new(raw: ControllerConfigResponse) -> Self {
        Self { raw }
    }

    /// The decoded wire payload
    #[must_use]
    pub const fn raw(&self) -> &ControllerConfigResponse {
        &self.raw
    }

    /// Unit the controller reports temperatures in
    #[must_use]
    pub const fn temperature_unit(&self) -> TemperatureUnit {
        if self.raw.is_celsius {
            TemperatureUnit::Celsius
        } else {
            TemperatureUnit::Fahrenheit
        }
    }

    /// Allowed heat set-points for `body`, in the controller's unit
    #[must_use]
    pub const fn set_point_range(&self, body: BodyType) -> SetPointRange {
        match body {
            BodyType::Pool => self.raw.pool_set_point,
            BodyType::Spa => self.raw.spa_set_point,
        }
    }

    /// Circuits defined on the controller
    #[must_use]
    pub fn circuits(&self) -> &[Circuit] {
        &self.raw.circuits
    }

    /// Look up a circuit by id
    #[must_use]
    pub fn circuit(&self, id: u32) -> Option<&Circuit> {
        self.raw.circuits.iter().find(|c| c.id == id)
    }

    /// Solar heating installed
    #[must_use]
    pub const fn has_solar(&self) -> bool {
        self.raw.equipment_flags & FLAG_SOLAR != 0
    }

    /// Solar slot drives a heat pump
    #[must_use]
    pub const fn has_solar_as_heat_pump(&self) -> bool {
        self.raw.equipment_flags & FLAG_SOLAR_AS_HEAT_PUMP != 0
    }

    /// Salt chlorinator installed
    #[must_use]
    pub const fn has_chlorinator(&self) -> bool {
        self.raw.equipment_flags & FLAG_CHLORINATOR != 0
    }

    /// Cooling capable
    #[must_use]
    pub const fn has_cooling(&self) -> bool {
        self.raw.equipment_flags & FLAG_COOLING != 0
    }

    /// IntelliChem installed
    #[must_use]
    pub const fn has_intellichem(&self) -> bool {
        self.raw.equipment_flags & FLAG_INTELLICHEM != 0
    }

    /// EasyTouch controller (types 13 and 14)
    #[must_use]
    pub const fn is_easy_touch(&self) -> bool {
        matches!(self.raw.controller_type, 13 | 14)
    }

    /// IntelliTouch controller: anything that is not EasyTouch or type 10
    #[must_use]
    pub const fn is_intelli_touch(&self) -> bool {
        !matches!(self.raw.controller_type, 10 | 13 | 14)
    }

    /// EasyTouch Lite: type 13 with hardware bit 0x4
    #[must_use]
    pub const fn is_easy_touch_lite(&self) -> bool {
        self.raw.controller_type == 13 && self.raw.hardware_type & 0x4 != 0
    }

    /// Shared-equipment dual body controller (type 5)
    #[must_use]
    pub const fn is_dual_body(&self) -> bool {
        self.raw.controller_type == 5
    }

    /// Chem2 (type 252, hardware 2)
    #[must_use]
    pub const fn is_chem2(&self) -> bool {
        self.raw.controller_type == 252 && self.raw.hardware_type == 2
    }
}

impl From<ControllerConfigResponse> for ControllerConfig {
    fn from(raw: ControllerConfigResponse) -> Self {
        Self::new(raw)
    }
}

/// Pool/spa status snapshot
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoolStatus {
    raw: PoolStatusResponse,
}

impl PoolStatus {
    /// Wrap a decoded status body
    #[must_use]
    pub const fn new(raw: PoolStatusResponse) -> Self {
        Self { raw }
    }

    /// The decoded wire payload
    #[must_use]
    pub const fn raw(&self) -> &PoolStatusResponse {
        &self.raw
    }

    /// Controller readiness
    #[must_use]
    pub const fn readiness(&self) -> Readiness {
        Readiness::from_u32(self.raw.readiness)
    }

    /// Readiness code 1
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        self.raw.readiness == 1
    }

    /// Readiness code 2
    #[must_use]
    pub const fn is_syncing(&self) -> bool {
        self.raw.readiness == 2
    }

    /// Readiness code 3
    #[must_use]
    pub const fn is_in_service_mode(&self) -> bool {
        self.raw.readiness == 3
    }

    /// Outside air temperature in the controller's unit
    #[must_use]
    pub const fn air_temperature(&self) -> i32 {
        self.raw.air_temperature
    }

    /// Record for `body`, matched on the body type the controller sent
    #[must_use]
    pub fn body(&self, body: BodyType) -> Option<&BodyStatus> {
        self.raw.bodies.iter().find(|b| b.body == body)
    }

    /// Record for `body`, or [`Error::BodyNotReported`]
    pub fn require_body(&self, body: BodyType) -> Result<&BodyStatus> {
        self.body(body).ok_or(Error::BodyNotReported(body))
    }

    /// Every reported body, in wire order
    #[must_use]
    pub fn bodies(&self) -> &[BodyStatus] {
        &self.raw.bodies
    }

    /// Circuit states
    #[must_use]
    pub fn circuits(&self) -> &[CircuitStatus] {
        &self.raw.circuits
    }

    /// Chemistry readings
    #[must_use]
    pub const fn chemistry(&self) -> &Chemistry {
        &self.raw.chemistry
    }
}

impl From<PoolStatusResponse> for PoolStatus {
    fn from(raw: PoolStatusResponse) -> Self {
        Self::new(raw)
    }
}

impl BodyStatus {
    /// Decoded heat mode; an unknown code is malformed
    pub fn heat_mode(&self) -> Result<HeatMode> {
        HeatMode::from_u32(self.heat_mode)
            .ok_or_else(|| Error::malformed(format!("unknown heat mode {}", self.heat_mode)))
    }

    /// Whether the heater is running
    #[must_use]
    pub const fn heating_state(&self) -> HeatingState {
        if self.heater_status == 1 {
            HeatingState::Heating
        } else {
            HeatingState::Idle
        }
    }
}
