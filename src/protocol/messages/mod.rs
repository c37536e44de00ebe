//! Message catalog
//!
//! One module per exchange. Requests implement [`Request`](super::Request),
//! answers implement [`Response`](super::Response).

pub mod config;
pub mod discovery;
pub mod handshake;
pub mod heat;
pub mod history;
pub mod status;

pub use config::{
    Circuit, Color, ControllerConfigRequest, ControllerConfigResponse, SetPointRange,
};
pub use discovery::{DISCOVERY_REQUEST, DiscoveryResponse};
pub use handshake::{
    CONNECT_PREAMBLE, ChallengeRequest, ChallengeResponse, LoginRequest, LoginResponse,
    VersionRequest, VersionResponse,
};
pub use heat::{SetHeatModeRequest, SetHeatModeResponse, SetHeatPointRequest, SetHeatPointResponse};
pub use history::{HistoryData, HistoryRequest, HistoryResponse, HistorySample};
pub use status::{BodyStatus, Chemistry, CircuitStatus, PoolStatusRequest, PoolStatusResponse};
