//! In-process stand-in for the STK application
//!
//! [`SimulatedStk`] implements [`Automation`] with the object-model preconditions
//! the real application enforces (scenario before objects, propagation before
//! panel analysis, registered groups before queries) and records every call so
//! callers can check sequencing.
//!
//! Its solar-panel numbers come from a crude geometry stub: two-body motion from
//! the classical elements, nadir attitude, a low-precision sun direction, a
//! cylindrical Earth shadow and one flat panel normal per registered group. They
//! are plausible, non-negative and deterministic, nothing more.

use chrono::NaiveDateTime;
use nalgebra::{Rotation3, Vector3};
use std::cell::RefCell;
use std::f64::consts::TAU;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::attach::{verify_version, Connector};
use crate::command::{verbs, Arg};
use crate::{
    AnalysisWindow, AttitudeProfile, Automation, ClassicalElements, Command, ConnectError,
    DataProviderQuery, DataSet, ObjectPath, PropagatorKind, Result, StkDate, StkVersion,
    UnitPreference,
};

/// Name of the grouped data provider holding panel power
pub const SOLAR_PANEL_POWER: &str = "Solar Panel Power";

const MU_EARTH_KM3_S2: f64 = 398_600.4418;
const R_EARTH_KM: f64 = 6_378.137;
const SOLAR_FLUX_W_M2: f64 = 1_361.0;
const PANEL_AREA_M2: f64 = 1.0;
const PANEL_EFFICIENCY: f64 = 0.30;
const J2000_UNIX_S: i64 = 946_728_000;

/// Step assumed for an analysis period set over Connect (which carries no step)
const DEFAULT_SCENARIO_STEP_S: f64 = 60.0;

/// One recorded automation call
#[derive(Debug, Clone, PartialEq)]
pub enum SimCall {
    Version,
    NewScenario(String),
    SetAnalysisPeriod,
    SetEpoch,
    NewSatellite(String),
    SetPropagator(PropagatorKind),
    AssignClassical,
    SetAttitude(AttitudeProfile),
    Propagate,
    SetModel,
    SetUnit(UnitPreference),
    /// Serialized free-form command
    Execute(String),
    QueryDataProvider(usize),
    UnloadScenario,
}

#[derive(Debug)]
struct Scenario {
    name: String,
    window: Option<AnalysisWindow>,
    epoch: Option<StkDate>,
    date_unit: &'static str,
    power_unit: &'static str,
    satellites: Vec<Satellite>,
}

#[derive(Debug)]
struct Satellite {
    path: ObjectPath,
    propagator: Option<(PropagatorKind, f64)>,
    initial: Option<(ClassicalElements, StkDate)>,
    attitude: Option<AttitudeProfile>,
    propagated: bool,
    model: Option<PathBuf>,
    panels: PanelAnalysis,
}

#[derive(Debug, Default)]
struct PanelAnalysis {
    groups: Vec<String>,
    visible: bool,
    render_method: Option<String>,
    computed: Option<AnalysisWindow>,
}

#[derive(Debug)]
pub struct SimulatedStk {
    version: String,
    scenario: Option<Scenario>,
    calls: Vec<SimCall>,
}

impl SimulatedStk {
    pub fn new(version: &str) -> Self {
        Self {
            version: version.to_string(),
            scenario: None,
            calls: Vec::new(),
        }
    }

    /// Every call made so far, in order
    pub fn calls(&self) -> &[SimCall] {
        &self.calls
    }

    pub fn scenario_name(&self) -> Option<&str> {
        self.scenario.as_ref().map(|s| s.name.as_str())
    }

    /// Panel groups registered on a satellite
    pub fn panel_groups(&self, sat: &ObjectPath) -> Vec<String> {
        self.scenario
            .as_ref()
            .and_then(|s| s.satellites.iter().find(|v| &v.path == sat))
            .map(|v| v.panels.groups.clone())
            .unwrap_or_default()
    }

    fn scenario_mut(&mut self, op: &str) -> Result<&mut Scenario> {
        self.scenario
            .as_mut()
            .ok_or_else(|| ConnectError::nack(op, "no scenario is loaded"))
    }

    fn satellite_mut(&mut self, op: &str, sat: &ObjectPath) -> Result<&mut Satellite> {
        self.scenario_mut(op)?
            .satellites
            .iter_mut()
            .find(|v| &v.path == sat)
            .ok_or_else(|| ConnectError::nack(op, format!("unknown object {}", sat)))
    }

    /// Handle one parsed Connect command (used by the stub server)
    pub fn dispatch(&mut self, command: &Command) -> Result<Vec<String>> {
        let op = command.verb();
        let target = command.target();

        match op {
            verbs::GET_VERSION => Ok(vec![self.version()?]),
            verbs::NEW => match arg_text(command, 0)?.as_str() {
                "Scenario" => self.new_scenario(&arg_text(command, 1)?).map(|_| Vec::new()),
                "*/Satellite" => self.new_satellite(&arg_text(command, 1)?).map(|_| Vec::new()),
                other => Err(ConnectError::nack(op, format!("cannot create '{}'", other))),
            },
            verbs::UNLOAD => self.unload_scenario().map(|_| Vec::new()),
            verbs::SET_ANALYSIS_PERIOD => {
                let window = AnalysisWindow::new(
                    arg_date(command, 0)?,
                    arg_date(command, 1)?,
                    DEFAULT_SCENARIO_STEP_S,
                )
                .map_err(|e| ConnectError::nack(op, e.to_string()))?;
                self.set_analysis_period(&window).map(|_| Vec::new())
            }
            verbs::SET_EPOCH => self.set_epoch(&arg_date(command, 0)?).map(|_| Vec::new()),
            verbs::PROPAGATOR => {
                let sat = object_path(command)?;
                expect_word(command, 0, "Type")?;
                let kind = PropagatorKind::from_keyword(&arg_text(command, 1)?)
                    .ok_or_else(|| ConnectError::nack(op, "unknown propagator"))?;
                expect_word(command, 2, "StepSize")?;
                let step = arg_f64(command, 3)?;
                self.set_propagator(&sat, kind, step).map(|_| Vec::new())
            }
            verbs::SET_STATE => {
                let sat = object_path(command)?;
                expect_word(command, 0, "Classical")?;
                let epoch = arg_date(command, 2)?;
                let mut v = [0.0; 6];
                for (i, slot) in v.iter_mut().enumerate() {
                    *slot = arg_f64(command, 3 + i)?;
                }
                v[0] /= 1000.0;
                let elements = ClassicalElements::from_array(v);
                self.assign_classical(&sat, &elements, &epoch).map(|_| Vec::new())
            }
            verbs::SET_ATTITUDE => {
                let sat = object_path(command)?;
                expect_word(command, 0, "Profile")?;
                let profile = AttitudeProfile::from_keyword(&arg_text(command, 1)?)
                    .ok_or_else(|| ConnectError::nack(op, "unknown attitude profile"))?;
                self.set_attitude(&sat, profile).map(|_| Vec::new())
            }
            verbs::PROPAGATE => self.propagate(&object_path(command)?).map(|_| Vec::new()),
            verbs::SET_UNITS => {
                let unit = match (arg_text(command, 0)?.as_str(), arg_text(command, 1)?.as_str()) {
                    ("DateFormat", "EpSec") => UnitPreference::EpochSeconds,
                    ("Power", "W") => UnitPreference::Watts,
                    (dim, unit) => {
                        return Err(ConnectError::nack(op, format!("unsupported unit {} {}", dim, unit)))
                    }
                };
                self.set_unit(unit).map(|_| Vec::new())
            }
            verbs::VO if command.arg(0).map(Arg::to_text).as_deref() == Some("Model") => {
                let sat = object_path(command)?;
                expect_word(command, 1, "File")?;
                let model = PathBuf::from(arg_text(command, 2)?);
                self.set_model(&sat, &model).map(|_| Vec::new())
            }
            verbs::VO => self.execute(command),
            verbs::DATA_PROVIDER => {
                let sat = object_path(command)?;
                let provider = arg_text(command, 0)?;
                expect_word(command, 1, "Group")?;
                let group = command
                    .arg(2)
                    .and_then(Arg::as_usize)
                    .ok_or_else(|| ConnectError::nack(op, "bad group index"))?;
                let window = AnalysisWindow::new(
                    arg_date(command, 3)?,
                    arg_date(command, 4)?,
                    arg_f64(command, 5)?,
                )
                .map_err(|e| ConnectError::nack(op, e.to_string()))?;
                expect_word(command, 6, "Elements")?;
                let elements = command.args()[7..].iter().map(Arg::to_text).collect();

                let query = DataProviderQuery { provider, group, window, elements };
                let data = self.query_data_provider(&sat, &query)?;
                Ok(data.to_csv_lines())
            }
            _ => {
                debug!("unrecognized command {} {}", op, target);
                Err(ConnectError::nack(op, "Unrecognized command"))
            }
        }
    }

    /// `VO <sat> SolarPanel ...`
    fn solar_panel_command(&mut self, command: &Command) -> Result<()> {
        let op = command.to_string();
        let sat = object_path(command)?;
        expect_word(command, 0, "SolarPanel")?;

        let scenario_window = self.scenario_mut(&op)?.window;
        let vehicle = self.satellite_mut(&op, &sat)?;

        match arg_text(command, 1)?.as_str() {
            "Visualization" => {
                if vehicle.model.is_none() {
                    return Err(ConnectError::nack(op, "no model assigned"));
                }

                let mut groups = Vec::new();
                let mut visible = false;
                let mut args = command.args()[2..].iter();
                while let Some(arg) = args.next() {
                    match arg {
                        Arg::Word(w) if w == "AddGroup" => match args.next() {
                            Some(name) => groups.push(name.to_text()),
                            None => return Err(ConnectError::nack(op, "AddGroup without a name")),
                        },
                        Arg::Word(w) if w == "On" => visible = true,
                        Arg::Word(w) if w == "Off" => visible = false,
                        other => {
                            return Err(ConnectError::nack(op, format!("unexpected token {}", other)))
                        }
                    }
                }
                if groups.is_empty() {
                    return Err(ConnectError::nack(op, "no panel groups given"));
                }

                vehicle.panels.groups = groups;
                vehicle.panels.visible = visible;
                vehicle.panels.computed = None;
                Ok(())
            }
            "RenderMethod" => {
                let method = arg_text(command, 2)?;
                if method != "PBuffer" && method != "WindowSpace" {
                    return Err(ConnectError::nack(op, format!("unknown render method {}", method)));
                }
                vehicle.panels.render_method = Some(method);
                Ok(())
            }
            "Compute" => {
                if !vehicle.propagated {
                    return Err(ConnectError::nack(op, "vehicle has not been propagated"));
                }
                if vehicle.panels.groups.is_empty() {
                    return Err(ConnectError::nack(op, "no panel groups registered"));
                }
                let window = AnalysisWindow::new(
                    arg_date(command, 2)?,
                    arg_date(command, 3)?,
                    arg_f64(command, 4)?,
                )
                .map_err(|e| ConnectError::nack(&op, e.to_string()))?;
                if let Some(period) = scenario_window {
                    if window.start < period.start || window.stop > period.stop {
                        return Err(ConnectError::nack(op, "compute interval outside analysis period"));
                    }
                }
                vehicle.panels.computed = Some(window);
                Ok(())
            }
            other => Err(ConnectError::nack(op, format!("unknown SolarPanel option {}", other))),
        }
    }
}

impl Automation for SimulatedStk {
    fn version(&mut self) -> Result<String> {
        self.calls.push(SimCall::Version);
        Ok(self.version.clone())
    }

    fn new_scenario(&mut self, name: &str) -> Result<()> {
        self.calls.push(SimCall::NewScenario(name.to_string()));
        if name.is_empty() {
            return Err(ConnectError::nack(verbs::NEW, "scenario name is empty"));
        }
        self.scenario = Some(Scenario {
            name: name.to_string(),
            window: None,
            epoch: None,
            date_unit: "UTCG",
            power_unit: "kW",
            satellites: Vec::new(),
        });
        Ok(())
    }

    fn set_analysis_period(&mut self, window: &AnalysisWindow) -> Result<()> {
        self.calls.push(SimCall::SetAnalysisPeriod);
        window
            .validate()
            .map_err(|e| ConnectError::nack(verbs::SET_ANALYSIS_PERIOD, e.to_string()))?;
        self.scenario_mut(verbs::SET_ANALYSIS_PERIOD)?.window = Some(*window);
        Ok(())
    }

    fn set_epoch(&mut self, epoch: &StkDate) -> Result<()> {
        self.calls.push(SimCall::SetEpoch);
        self.scenario_mut(verbs::SET_EPOCH)?.epoch = Some(*epoch);
        Ok(())
    }

    fn new_satellite(&mut self, name: &str) -> Result<ObjectPath> {
        self.calls.push(SimCall::NewSatellite(name.to_string()));
        let path = ObjectPath::satellite(name);
        let scenario = self.scenario_mut(verbs::NEW)?;

        if scenario.satellites.iter().any(|v| v.path == path) {
            return Err(ConnectError::nack(verbs::NEW, format!("{} already exists", path)));
        }
        scenario.satellites.push(Satellite {
            path: path.clone(),
            propagator: None,
            initial: None,
            attitude: None,
            propagated: false,
            model: None,
            panels: PanelAnalysis::default(),
        });
        Ok(path)
    }

    fn set_propagator(&mut self, sat: &ObjectPath, kind: PropagatorKind, step_s: f64) -> Result<()> {
        self.calls.push(SimCall::SetPropagator(kind));
        if !step_s.is_finite() || step_s <= 0.0 {
            return Err(ConnectError::nack(verbs::PROPAGATOR, "step size must be positive"));
        }
        let vehicle = self.satellite_mut(verbs::PROPAGATOR, sat)?;
        vehicle.propagator = Some((kind, step_s));
        vehicle.propagated = false;
        Ok(())
    }

    fn assign_classical(
        &mut self,
        sat: &ObjectPath,
        elements: &ClassicalElements,
        epoch: &StkDate,
    ) -> Result<()> {
        self.calls.push(SimCall::AssignClassical);
        elements
            .validate()
            .map_err(|e| ConnectError::nack(verbs::SET_STATE, e.to_string()))?;
        if elements.semi_major_axis_km * (1.0 - elements.eccentricity) <= R_EARTH_KM {
            return Err(ConnectError::nack(verbs::SET_STATE, "perigee is below the Earth surface"));
        }
        let vehicle = self.satellite_mut(verbs::SET_STATE, sat)?;
        vehicle.initial = Some((*elements, *epoch));
        vehicle.propagated = false;
        Ok(())
    }

    fn set_attitude(&mut self, sat: &ObjectPath, profile: AttitudeProfile) -> Result<()> {
        self.calls.push(SimCall::SetAttitude(profile));
        self.satellite_mut(verbs::SET_ATTITUDE, sat)?.attitude = Some(profile);
        Ok(())
    }

    fn propagate(&mut self, sat: &ObjectPath) -> Result<()> {
        self.calls.push(SimCall::Propagate);
        let has_window = self.scenario_mut(verbs::PROPAGATE)?.window.is_some();
        let vehicle = self.satellite_mut(verbs::PROPAGATE, sat)?;

        if vehicle.propagator.is_none() {
            return Err(ConnectError::nack(verbs::PROPAGATE, "no propagator assigned"));
        }
        if vehicle.initial.is_none() {
            return Err(ConnectError::nack(verbs::PROPAGATE, "no initial state"));
        }
        if !has_window {
            return Err(ConnectError::nack(verbs::PROPAGATE, "no analysis period"));
        }
        vehicle.propagated = true;
        Ok(())
    }

    fn set_model(&mut self, sat: &ObjectPath, model: &Path) -> Result<()> {
        self.calls.push(SimCall::SetModel);
        if !model.is_file() {
            return Err(ConnectError::nack(
                verbs::VO,
                format!("model file {} not found", model.display()),
            ));
        }
        let vehicle = self.satellite_mut(verbs::VO, sat)?;
        vehicle.model = Some(model.to_path_buf());
        vehicle.panels = PanelAnalysis::default();
        Ok(())
    }

    fn set_unit(&mut self, unit: UnitPreference) -> Result<()> {
        self.calls.push(SimCall::SetUnit(unit));
        let scenario = self.scenario_mut(verbs::SET_UNITS)?;
        match unit {
            UnitPreference::EpochSeconds => scenario.date_unit = unit.unit(),
            UnitPreference::Watts => scenario.power_unit = unit.unit(),
        }
        Ok(())
    }

    fn execute(&mut self, command: &Command) -> Result<Vec<String>> {
        self.calls.push(SimCall::Execute(command.to_string()));
        match command.verb() {
            verbs::VO => self.solar_panel_command(command).map(|_| Vec::new()),
            other => Err(ConnectError::nack(other, "Unrecognized command")),
        }
    }

    fn query_data_provider(&mut self, sat: &ObjectPath, query: &DataProviderQuery) -> Result<DataSet> {
        self.calls.push(SimCall::QueryDataProvider(query.group));
        let op = verbs::DATA_PROVIDER;

        if query.provider != SOLAR_PANEL_POWER {
            return Err(ConnectError::nack(op, format!("unknown data provider '{}'", query.provider)));
        }

        let scenario = self.scenario_mut(op)?;
        let epoch = scenario
            .epoch
            .or(scenario.window.map(|w| w.start))
            .ok_or_else(|| ConnectError::nack(op, "scenario has no epoch"))?;
        let power_scale = if scenario.power_unit == "W" { 1.0 } else { 1.0e-3 };
        let epoch_seconds = scenario.date_unit == "EpSec";

        let vehicle = self.satellite_mut(op, sat)?;
        if vehicle.panels.computed.is_none() {
            return Err(ConnectError::nack(op, "solar panel power has not been computed"));
        }
        let group_count = vehicle.panels.groups.len();
        if query.group == 0 || query.group > group_count {
            return Err(ConnectError::nack(
                op,
                format!("group index {} out of range 1..={}", query.group, group_count),
            ));
        }
        let (elements, orbit_epoch) = vehicle
            .initial
            .ok_or_else(|| ConnectError::nack(op, "no initial state"))?;

        let mut columns = Vec::with_capacity(query.elements.len());
        for element in &query.elements {
            match element.as_str() {
                "Time" if !epoch_seconds => {
                    return Err(ConnectError::nack(op, "Time element needs the EpSec date unit"))
                }
                "Time" | "Power" => columns.push(element.clone()),
                other => return Err(ConnectError::nack(op, format!("unknown element '{}'", other))),
            }
        }

        let sun = sun_direction(query.window.start.datetime());
        let start_offset = query.window.start.seconds_since(&epoch);
        let rows = query
            .window
            .sample_offsets()
            .into_iter()
            .map(|offset| {
                let at = query.window.start.plus_seconds(offset);
                let power = panel_power_w(
                    &elements,
                    at.seconds_since(&orbit_epoch),
                    &sun,
                    query.group - 1,
                    group_count,
                ) * power_scale;
                columns
                    .iter()
                    .map(|c| if c == "Time" { start_offset + offset } else { power })
                    .collect()
            })
            .collect();

        Ok(DataSet { elements: columns, rows })
    }

    fn unload_scenario(&mut self) -> Result<()> {
        self.calls.push(SimCall::UnloadScenario);
        if self.scenario.take().is_none() {
            return Err(ConnectError::nack(verbs::UNLOAD, "no scenario is loaded"));
        }
        Ok(())
    }
}

/// Hands out [`SimulatedStk`] instances for a fixed set of "installed" versions
pub struct SimConnector {
    installed: Vec<StkVersion>,
    attempts: RefCell<Vec<StkVersion>>,
}

impl SimConnector {
    pub fn new(installed: Vec<StkVersion>) -> Self {
        Self {
            installed,
            attempts: RefCell::new(Vec::new()),
        }
    }

    /// Versions asked for so far, in order
    pub fn attempts(&self) -> Vec<StkVersion> {
        self.attempts.borrow().clone()
    }
}

impl Connector for SimConnector {
    type Handle = SimulatedStk;

    fn attach(&self, version: StkVersion) -> Result<SimulatedStk> {
        self.attempts.borrow_mut().push(version);
        if !self.installed.contains(&version) {
            return Err(ConnectError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                format!("STK {} is not installed", version),
            )));
        }
        let mut sim = SimulatedStk::new(&format!("{}.0.0", version));
        verify_version(&mut sim, version)?;
        Ok(sim)
    }
}

// ============================================================================
// Geometry stub
// ============================================================================

/// Two-body position and velocity (km, km/s) `dt_s` seconds after the element epoch
fn two_body_state(el: &ClassicalElements, dt_s: f64) -> (Vector3<f64>, Vector3<f64>) {
    let a = el.semi_major_axis_km;
    let e = el.eccentricity;

    let nu0 = el.true_anomaly_deg.to_radians();
    let ea0 = 2.0 * (((1.0 - e) / (1.0 + e)).sqrt() * (nu0 / 2.0).tan()).atan();
    let m0 = ea0 - e * ea0.sin();
    let mean_motion = (MU_EARTH_KM3_S2 / a.powi(3)).sqrt();
    let m = m0 + mean_motion * dt_s;

    let mut ea = m;
    for _ in 0..20 {
        ea -= (ea - e * ea.sin() - m) / (1.0 - e * ea.cos());
    }
    let nu = 2.0 * ((1.0 + e).sqrt() * (ea / 2.0).sin()).atan2((1.0 - e).sqrt() * (ea / 2.0).cos());

    let p = a * (1.0 - e * e);
    let r = p / (1.0 + e * nu.cos());
    let sqrt_mu_p = (MU_EARTH_KM3_S2 / p).sqrt();

    let r_pqw = Vector3::new(r * nu.cos(), r * nu.sin(), 0.0);
    let v_pqw = Vector3::new(-sqrt_mu_p * nu.sin(), sqrt_mu_p * (e + nu.cos()), 0.0);

    let pqw_to_eci = Rotation3::from_axis_angle(&Vector3::z_axis(), el.raan_deg.to_radians())
        * Rotation3::from_axis_angle(&Vector3::x_axis(), el.inclination_deg.to_radians())
        * Rotation3::from_axis_angle(&Vector3::z_axis(), el.arg_of_perigee_deg.to_radians());

    (pqw_to_eci * r_pqw, pqw_to_eci * v_pqw)
}

/// Low-precision unit vector toward the sun (mean equator, ~0.01 deg)
fn sun_direction(at: NaiveDateTime) -> Vector3<f64> {
    let d = (at.and_utc().timestamp() - J2000_UNIX_S) as f64 / 86_400.0;
    let g = (357.528 + 0.985_600_3 * d).to_radians();
    let lambda = (280.460 + 0.985_647_4 * d).to_radians()
        + (1.915 * g.sin() + 0.020 * (2.0 * g).sin()).to_radians();
    let obliquity = 23.439_f64.to_radians();

    Vector3::new(
        lambda.cos(),
        obliquity.cos() * lambda.sin(),
        obliquity.sin() * lambda.sin(),
    )
}

/// Power of panel group `group` (0-based) out of `group_count`.
///
/// Body frame is nadir aligned with the velocity constraint. Group normals are
/// spread evenly about the along-track axis, starting at zenith.
fn panel_power_w(
    el: &ClassicalElements,
    dt_s: f64,
    sun: &Vector3<f64>,
    group: usize,
    group_count: usize,
) -> f64 {
    let (r, v) = two_body_state(el, dt_s);

    let rs = r.dot(sun);
    let in_shadow = rs < 0.0 && (r - sun * rs).norm() < R_EARTH_KM;
    if in_shadow {
        return 0.0;
    }

    let zenith = r.normalize();
    let neg_orbit_normal = -r.cross(&v).normalize();
    let theta = TAU * group as f64 / group_count.max(1) as f64;
    let normal = theta.cos() * zenith + theta.sin() * neg_orbit_normal;

    SOLAR_FLUX_W_M2 * PANEL_AREA_M2 * PANEL_EFFICIENCY * normal.dot(sun).max(0.0)
}

fn arg_text(command: &Command, idx: usize) -> Result<String> {
    command
        .arg(idx)
        .map(Arg::to_text)
        .ok_or_else(|| ConnectError::nack(command.verb(), format!("missing argument {}", idx + 1)))
}

fn arg_f64(command: &Command, idx: usize) -> Result<f64> {
    command
        .arg(idx)
        .and_then(Arg::as_f64)
        .ok_or_else(|| ConnectError::nack(command.verb(), format!("argument {} is not a number", idx + 1)))
}

fn arg_date(command: &Command, idx: usize) -> Result<StkDate> {
    arg_text(command, idx)?
        .parse()
        .map_err(|e: ConnectError| ConnectError::nack(command.verb(), e.to_string()))
}

fn expect_word(command: &Command, idx: usize, word: &str) -> Result<()> {
    match command.arg(idx) {
        Some(Arg::Word(w)) if w == word => Ok(()),
        _ => Err(ConnectError::nack(command.verb(), format!("expected '{}'", word))),
    }
}

fn object_path(command: &Command) -> Result<ObjectPath> {
    ObjectPath::parse(command.target())
        .map_err(|e| ConnectError::nack(command.verb(), e.to_string()))
}
