//! STK Connect
//!
//! Line-oriented command client for a running STK instance, the [`Automation`]
//! seam the power workflow is written against, version-fallback attach, and an
//! in-process stand-in application for tests and offline runs.
//!
//! # Wire format
//!
//! ```text
//! client -> New / */Satellite PowerSat\n
//! server <- ACK AGI421009New            0010010000000000
//! ```
//!
//! See [`codec`] for the reply framing.
//!
//! # Features
//!
//! - `server`: tokio Connect server in front of [`sim::SimulatedStk`]

pub mod attach;
pub mod automation;
pub mod client;
pub mod codec;
pub mod command;
pub mod error;
pub mod sim;
pub mod types;

#[cfg(feature = "server")]
pub mod server;

pub use attach::{attach_first, verify_version, Connector, Endpoint, TcpConnector};
pub use automation::Automation;
pub use client::ConnectClient;
pub use command::{Arg, Command};
pub use error::{ConnectError, Result};
pub use sim::{SimConnector, SimulatedStk, SOLAR_PANEL_POWER};
pub use types::{
    AnalysisWindow, AttitudeProfile, ClassicalElements, DataProviderQuery, DataSet, ObjectPath,
    PropagatorKind, StkDate, StkVersion, UnitPreference,
};
