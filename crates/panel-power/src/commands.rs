//! Solar-panel tool commands
//!
//! ```text
//! VO */Satellite/PowerSat SolarPanel Visualization AddGroup "PanelA" AddGroup "PanelB" On
//! VO */Satellite/PowerSat SolarPanel RenderMethod PBuffer
//! VO */Satellite/PowerSat SolarPanel Compute "1 Jan 2020 00:00:00.000" "1 Jan 2020 01:00:00.000" 60 Power
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use stk_connect::command::verbs;
use stk_connect::{AnalysisWindow, Command, ObjectPath};

use crate::PanelGroups;

/// How the panel tool renders the model for illumination
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderMethod {
    /// Off-screen buffer
    #[default]
    PBuffer,
    WindowSpace,
}

impl RenderMethod {
    pub fn keyword(&self) -> &'static str {
        match self {
            RenderMethod::PBuffer => "PBuffer",
            RenderMethod::WindowSpace => "WindowSpace",
        }
    }
}

impl fmt::Display for RenderMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

#[derive(Debug, Clone, Copy)]
pub enum SolarPanelCommand<'a> {
    /// Register the named groups, in order, and switch the tool on
    Register(&'a PanelGroups),
    RenderMethod(RenderMethod),
    /// Power over the window at its step
    Compute(&'a AnalysisWindow),
}

impl SolarPanelCommand<'_> {
    pub fn to_command(&self, sat: &ObjectPath) -> Command {
        let base = Command::new(verbs::VO, sat).word("SolarPanel");

        match self {
            SolarPanelCommand::Register(groups) => groups
                .names()
                .iter()
                .fold(base.word("Visualization"), |cmd, name| {
                    cmd.word("AddGroup").text(name.as_str())
                })
                .word("On"),
            SolarPanelCommand::RenderMethod(method) => {
                base.word("RenderMethod").word(method.keyword())
            }
            SolarPanelCommand::Compute(window) => base
                .word("Compute")
                .date(&window.start)
                .date(&window.stop)
                .number(window.step_s)
                .word("Power"),
        }
    }
}
