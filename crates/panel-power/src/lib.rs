//! Solar Panel Power
//!
//! Drives an STK session through the fixed scenario script and returns the
//! power time series of one solar-panel group:
//!
//! ```text
//! attach (11 -> 10 -> 12) -> scenario + window -> epoch -> satellite
//!   -> HPOP + step -> classical state -> nadir attitude -> propagate
//!   -> model -> EpSec -> panel groups -> render method -> compute
//!   -> W -> Solar Panel Power (group k) -> (time_s, power_w)
//! ```
//!
//! All physics happens inside the application; this crate only validates,
//! sequences and extracts.

use stk_connect::ConnectError;
use thiserror::Error;

pub mod commands;
pub mod config;
pub mod job;
pub mod series;
pub mod session;
pub mod workflow;

pub use commands::{RenderMethod, SolarPanelCommand};
pub use config::{ConnectConfig, ScenarioOptions};
pub use job::{PanelGroups, PowerJob};
pub use series::{PowerSample, PowerTimeSeries};
pub use session::Session;
pub use workflow::{generate_solar_panel_power, run};

#[derive(Error, Debug)]
pub enum PanelPowerError {
    #[error("Invalid job: {0}")]
    Validation(String),
    #[error(transparent)]
    Connect(#[from] ConnectError),
    #[error("Panel group index {index} out of range (1..={count})")]
    GroupIndexOutOfRange { index: usize, count: usize },
    #[error("Application returned no power samples")]
    EmptyResult,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, PanelPowerError>;

impl PanelPowerError {
    /// True when the application itself rejected a command
    pub fn is_rejection(&self) -> bool {
        matches!(self, PanelPowerError::Connect(ConnectError::Nack { .. }))
    }
}
