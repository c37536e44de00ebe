//! ScreenLogic message type codes

use std::fmt;

/// Known message type codes
///
/// Responses are the request code plus one, except for the frames the gateway
/// pushes on its own (login failure, bad parameter, weather, history data).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum MessageCode {
    /// Login rejected
    LoginFailed = 13,
    /// Connection challenge
    Challenge = 14,
    /// Challenge answer carrying the gateway MAC
    ChallengeResponse = 15,
    /// Local login
    Login = 27,
    /// Login accepted
    LoginResponse = 28,
    /// Command parameters rejected
    BadParameter = 31,

    /// Firmware version query
    Version = 8120,
    /// Firmware version answer
    VersionResponse = 8121,
    /// Unsolicited weather forecast notification
    WeatherForecastChanged = 9806,

    /// Pushed history samples
    HistoryData = 12502,
    /// Pool/spa status query
    PoolStatus = 12526,
    /// Pool/spa status answer
    PoolStatusResponse = 12527,
    /// Set heat set-point
    SetHeatPoint = 12528,
    /// Set heat set-point acknowledgement
    SetHeatPointResponse = 12529,
    /// Controller configuration query
    ControllerConfig = 12532,
    /// Controller configuration answer
    ControllerConfigResponse = 12533,
    /// History query
    History = 12534,
    /// History query acknowledgement
    HistoryResponse = 12535,
    /// Set heat mode
    SetHeatMode = 12538,
    /// Set heat mode acknowledgement
    SetHeatModeResponse = 12539,
}

impl MessageCode {
    /// Convert from a raw header code
    #[must_use]
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            13 => Some(Self::LoginFailed),
            14 => Some(Self::Challenge),
            15 => Some(Self::ChallengeResponse),
            27 => Some(Self::Login),
            28 => Some(Self::LoginResponse),
            31 => Some(Self::BadParameter),
            8120 => Some(Self::Version),
            8121 => Some(Self::VersionResponse),
            9806 => Some(Self::WeatherForecastChanged),
            12502 => Some(Self::HistoryData),
            12526 => Some(Self::PoolStatus),
            12527 => Some(Self::PoolStatusResponse),
            12528 => Some(Self::SetHeatPoint),
            12529 => Some(Self::SetHeatPointResponse),
            12532 => Some(Self::ControllerConfig),
            12533 => Some(Self::ControllerConfigResponse),
            12534 => Some(Self::History),
            12535 => Some(Self::HistoryResponse),
            12538 => Some(Self::SetHeatMode),
            12539 => Some(Self::SetHeatModeResponse),
            _ => None,
        }
    }

    /// Convert to the raw header code
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Check if the gateway sends this code without being asked
    #[must_use]
    pub const fn is_unsolicited(self) -> bool {
        matches!(self, Self::WeatherForecastChanged | Self::HistoryData)
    }
}

impl fmt::Display for MessageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::LoginFailed => "LoginFailed",
            Self::Challenge => "Challenge",
            Self::ChallengeResponse => "ChallengeResponse",
            Self::Login => "Login",
            Self::LoginResponse => "LoginResponse",
            Self::BadParameter => "BadParameter",
            Self::Version => "Version",
            Self::VersionResponse => "VersionResponse",
            Self::WeatherForecastChanged => "WeatherForecastChanged",
            Self::HistoryData => "HistoryData",
            Self::PoolStatus => "PoolStatus",
            Self::PoolStatusResponse => "PoolStatusResponse",
            Self::SetHeatPoint => "SetHeatPoint",
            Self::SetHeatPointResponse => "SetHeatPointResponse",
            Self::ControllerConfig => "ControllerConfig",
            Self::ControllerConfigResponse => "ControllerConfigResponse",
            Self::History => "History",
            Self::HistoryResponse => "HistoryResponse",
            Self::SetHeatMode => "SetHeatMode",
            Self::SetHeatModeResponse => "SetHeatModeResponse",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_code_roundtrip() {
        let codes = [
            MessageCode::Challenge,
            MessageCode::LoginFailed,
            MessageCode::PoolStatusResponse,
            MessageCode::HistoryData,
        ];

        for code in codes {
            assert_eq!(MessageCode::from_u16(code.as_u16()), Some(code));
        }
    }

    #[test]
    fn test_responses_follow_requests() {
        let pairs = [
            (MessageCode::Challenge, MessageCode::ChallengeResponse),
            (MessageCode::Login, MessageCode::LoginResponse),
            (MessageCode::Version, MessageCode::VersionResponse),
            (MessageCode::PoolStatus, MessageCode::PoolStatusResponse),
            (MessageCode::SetHeatPoint, MessageCode::SetHeatPointResponse),
            (MessageCode::ControllerConfig, MessageCode::ControllerConfigResponse),
            (MessageCode::History, MessageCode::HistoryResponse),
            (MessageCode::SetHeatMode, MessageCode::SetHeatModeResponse),
        ];

        for (request, response) in pairs {
            assert_eq!(request.as_u16() + 1, response.as_u16());
        }
    }

    #[test]
    fn test_unknown_code() {
        assert_eq!(MessageCode::from_u16(0xFFFF), None);
        assert!(MessageCode::WeatherForecastChanged.is_unsolicited());
        assert!(!MessageCode::PoolStatusResponse.is_unsolicited());
    }
}
