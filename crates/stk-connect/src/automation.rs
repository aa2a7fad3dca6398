//! Automation seam over the STK object model
//!
//! [`Automation`] lists the operations the power workflow needs from the external
//! application. [`ConnectClient`] implements it by translating each call into
//! Connect commands; [`crate::sim::SimulatedStk`] implements it in-process.

use std::path::Path;

use crate::command::verbs;
use crate::{
    AnalysisWindow, AttitudeProfile, ClassicalElements, Command, ConnectClient, ConnectError,
    DataProviderQuery, DataSet, ObjectPath, PropagatorKind, Result, StkDate, UnitPreference,
};

/// Remote object model of a running STK instance
pub trait Automation {
    /// Application version string, e.g. `11.6.0`
    fn version(&mut self) -> Result<String>;

    /// Create a new scenario, replacing whatever scenario was loaded
    fn new_scenario(&mut self, name: &str) -> Result<()>;

    fn set_analysis_period(&mut self, window: &AnalysisWindow) -> Result<()>;

    fn set_epoch(&mut self, epoch: &StkDate) -> Result<()>;

    fn new_satellite(&mut self, name: &str) -> Result<ObjectPath>;

    fn set_propagator(&mut self, sat: &ObjectPath, kind: PropagatorKind, step_s: f64) -> Result<()>;

    /// Initial state from classical elements valid at `epoch`
    fn assign_classical(
        &mut self,
        sat: &ObjectPath,
        elements: &ClassicalElements,
        epoch: &StkDate,
    ) -> Result<()>;

    fn set_attitude(&mut self, sat: &ObjectPath, profile: AttitudeProfile) -> Result<()>;

    fn propagate(&mut self, sat: &ObjectPath) -> Result<()>;

    /// Attach a 3-D model file to the vehicle
    fn set_model(&mut self, sat: &ObjectPath, model: &Path) -> Result<()>;

    fn set_unit(&mut self, unit: UnitPreference) -> Result<()>;

    /// Execute a free-form command, returning its reply lines
    fn execute(&mut self, command: &Command) -> Result<Vec<String>>;

    fn query_data_provider(&mut self, sat: &ObjectPath, query: &DataProviderQuery) -> Result<DataSet>;

    fn unload_scenario(&mut self) -> Result<()>;
}

impl<A: Automation + ?Sized> Automation for &mut A {
    fn version(&mut self) -> Result<String> {
        (**self).version()
    }

    fn new_scenario(&mut self, name: &str) -> Result<()> {
        (**self).new_scenario(name)
    }

    fn set_analysis_period(&mut self, window: &AnalysisWindow) -> Result<()> {
        (**self).set_analysis_period(window)
    }

    fn set_epoch(&mut self, epoch: &StkDate) -> Result<()> {
        (**self).set_epoch(epoch)
    }

    fn new_satellite(&mut self, name: &str) -> Result<ObjectPath> {
        (**self).new_satellite(name)
    }

    fn set_propagator(&mut self, sat: &ObjectPath, kind: PropagatorKind, step_s: f64) -> Result<()> {
        (**self).set_propagator(sat, kind, step_s)
    }

    fn assign_classical(
        &mut self,
        sat: &ObjectPath,
        elements: &ClassicalElements,
        epoch: &StkDate,
    ) -> Result<()> {
        (**self).assign_classical(sat, elements, epoch)
    }

    fn set_attitude(&mut self, sat: &ObjectPath, profile: AttitudeProfile) -> Result<()> {
        (**self).set_attitude(sat, profile)
    }

    fn propagate(&mut self, sat: &ObjectPath) -> Result<()> {
        (**self).propagate(sat)
    }

    fn set_model(&mut self, sat: &ObjectPath, model: &Path) -> Result<()> {
        (**self).set_model(sat, model)
    }

    fn set_unit(&mut self, unit: UnitPreference) -> Result<()> {
        (**self).set_unit(unit)
    }

    fn execute(&mut self, command: &Command) -> Result<Vec<String>> {
        (**self).execute(command)
    }

    fn query_data_provider(&mut self, sat: &ObjectPath, query: &DataProviderQuery) -> Result<DataSet> {
        (**self).query_data_provider(sat, query)
    }

    fn unload_scenario(&mut self) -> Result<()> {
        (**self).unload_scenario()
    }
}

impl Automation for ConnectClient {
    fn version(&mut self) -> Result<String> {
        let lines = self.send(&Command::new(verbs::GET_VERSION, "/"))?;
        lines
            .into_iter()
            .next()
            .map(|v| v.trim().to_string())
            .ok_or_else(|| ConnectError::Protocol("empty version reply".to_string()))
    }

    fn new_scenario(&mut self, name: &str) -> Result<()> {
        self.send(&Command::new(verbs::NEW, "/").word("Scenario").word(name))?;
        Ok(())
    }

    fn set_analysis_period(&mut self, window: &AnalysisWindow) -> Result<()> {
        self.send(
            &Command::new(verbs::SET_ANALYSIS_PERIOD, "*")
                .date(&window.start)
                .date(&window.stop),
        )?;
        Ok(())
    }

    fn set_epoch(&mut self, epoch: &StkDate) -> Result<()> {
        self.send(&Command::new(verbs::SET_EPOCH, "*").date(epoch))?;
        Ok(())
    }

    fn new_satellite(&mut self, name: &str) -> Result<ObjectPath> {
        self.send(&Command::new(verbs::NEW, "/").word("*/Satellite").word(name))?;
        Ok(ObjectPath::satellite(name))
    }

    fn set_propagator(&mut self, sat: &ObjectPath, kind: PropagatorKind, step_s: f64) -> Result<()> {
        self.send(
            &Command::new(verbs::PROPAGATOR, sat)
                .word("Type")
                .word(kind.keyword())
                .word("StepSize")
                .number(step_s),
        )?;
        Ok(())
    }

    fn assign_classical(
        &mut self,
        sat: &ObjectPath,
        elements: &ClassicalElements,
        epoch: &StkDate,
    ) -> Result<()> {
        // Connect distances are in meters
        self.send(
            &Command::new(verbs::SET_STATE, sat)
                .word("Classical")
                .word("ICRF")
                .date(epoch)
                .number(elements.semi_major_axis_km * 1000.0)
                .number(elements.eccentricity)
                .number(elements.inclination_deg)
                .number(elements.arg_of_perigee_deg)
                .number(elements.raan_deg)
                .number(elements.true_anomaly_deg)
                .word("TrueAnomaly"),
        )?;
        Ok(())
    }

    fn set_attitude(&mut self, sat: &ObjectPath, profile: AttitudeProfile) -> Result<()> {
        self.send(
            &Command::new(verbs::SET_ATTITUDE, sat)
                .word("Profile")
                .word(profile.keyword()),
        )?;
        Ok(())
    }

    fn propagate(&mut self, sat: &ObjectPath) -> Result<()> {
        self.send(&Command::new(verbs::PROPAGATE, sat))?;
        Ok(())
    }

    fn set_model(&mut self, sat: &ObjectPath, model: &Path) -> Result<()> {
        self.send(
            &Command::new(verbs::VO, sat)
                .word("Model")
                .word("File")
                .text(model.display().to_string()),
        )?;
        Ok(())
    }

    fn set_unit(&mut self, unit: UnitPreference) -> Result<()> {
        self.send(
            &Command::new(verbs::SET_UNITS, "/")
                .word(unit.dimension())
                .word(unit.unit()),
        )?;
        Ok(())
    }

    fn execute(&mut self, command: &Command) -> Result<Vec<String>> {
        self.send(command)
    }

    fn query_data_provider(&mut self, sat: &ObjectPath, query: &DataProviderQuery) -> Result<DataSet> {
        let mut command = Command::new(verbs::DATA_PROVIDER, sat)
            .text(query.provider.clone())
            .word("Group")
            .int(query.group as i64)
            .date(&query.window.start)
            .date(&query.window.stop)
            .number(query.window.step_s)
            .word("Elements");
        for element in &query.elements {
            command = command.word(element.clone());
        }

        let lines = self.send(&command)?;
        DataSet::from_csv(&lines.join("\n"))
    }

    fn unload_scenario(&mut self) -> Result<()> {
        self.send(&Command::new(verbs::UNLOAD, "/").word("*"))?;
        Ok(())
    }
}
