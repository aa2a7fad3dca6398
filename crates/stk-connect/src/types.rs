//! Value types accepted by the STK object model

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{ConnectError, Result};

/// Parse format for STK Gregorian UTC dates (fractional seconds optional)
const DATE_PARSE_FORMAT: &str = "%d %b %Y %H:%M:%S%.f";

/// Canonical rendering, e.g. `1 Jan 2020 00:00:00.000`
const DATE_DISPLAY_FORMAT: &str = "%-d %b %Y %H:%M:%S%.3f";

/// Tolerance used when deciding whether a sample coincides with the stop time
const STEP_EPSILON_S: f64 = 1.0e-6;

/// Most samples a single analysis window may produce
pub const MAX_SAMPLES: usize = 1_000_000;

/// Major version of the STK application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StkVersion(pub u8);

impl StkVersion {
    /// Attach order used when nothing else is configured
    pub const FALLBACK_ORDER: [StkVersion; 3] = [StkVersion(11), StkVersion(10), StkVersion(12)];

    /// True if a reported version string (`"11.6.0"`) belongs to this major version
    pub fn matches(&self, reported: &str) -> bool {
        reported
            .trim()
            .split('.')
            .next()
            .and_then(|major| major.parse::<u8>().ok())
            .is_some_and(|major| major == self.0)
    }
}

impl fmt::Display for StkVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Date in the application's UTCG format
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StkDate(NaiveDateTime);

impl StkDate {
    pub fn new(datetime: NaiveDateTime) -> Self {
        Self(datetime)
    }

    pub fn datetime(&self) -> NaiveDateTime {
        self.0
    }

    /// Seconds from `earlier` to `self` (negative if `self` is before it)
    pub fn seconds_since(&self, earlier: &StkDate) -> f64 {
        (self.0 - earlier.0).num_milliseconds() as f64 / 1000.0
    }

    /// Date offset by a (possibly fractional) number of seconds, millisecond resolution
    pub fn plus_seconds(&self, seconds: f64) -> StkDate {
        StkDate(self.0 + Duration::milliseconds((seconds * 1000.0).round() as i64))
    }
}

impl FromStr for StkDate {
    type Err = ConnectError;

    fn from_str(s: &str) -> Result<Self> {
        NaiveDateTime::parse_from_str(s.trim(), DATE_PARSE_FORMAT)
            .map(StkDate)
            .map_err(|e| ConnectError::InvalidDate(format!("'{}': {}", s, e)))
    }
}

impl TryFrom<String> for StkDate {
    type Error = ConnectError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<StkDate> for String {
    fn from(date: StkDate) -> String {
        date.to_string()
    }
}

impl fmt::Display for StkDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_DISPLAY_FORMAT))
    }
}

/// Analysis interval and sampling step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalysisWindow {
    pub start: StkDate,
    pub stop: StkDate,
    pub step_s: f64,
}

impl AnalysisWindow {
    /// Create a window, rejecting empty/inverted intervals and non-positive steps
    pub fn new(start: StkDate, stop: StkDate, step_s: f64) -> Result<Self> {
        let window = Self { start, stop, step_s };
        window.validate()?;
        Ok(window)
    }

    pub fn validate(&self) -> Result<()> {
        if self.start >= self.stop {
            return Err(ConnectError::InvalidArgument(format!(
                "analysis start {} does not precede stop {}",
                self.start, self.stop
            )));
        }
        if !self.step_s.is_finite() || self.step_s <= 0.0 {
            return Err(ConnectError::InvalidArgument(format!(
                "time step must be positive, got {}",
                self.step_s
            )));
        }
        let count = self.sample_count();
        if count > MAX_SAMPLES {
            return Err(ConnectError::InvalidArgument(format!(
                "time step {} s yields {} samples (max {})",
                self.step_s, count, MAX_SAMPLES
            )));
        }
        Ok(())
    }

    /// Length of the window in seconds
    pub fn span_s(&self) -> f64 {
        self.stop.seconds_since(&self.start)
    }

    /// Sample offsets in seconds from `start`.
    ///
    /// Multiples of the step strictly below the span, then the span itself, so the
    /// stop time is always sampled. 0..3600 s at 60 s gives 61 offsets.
    pub fn sample_offsets(&self) -> Vec<f64> {
        let span = self.span_s();
        let steps = self.step_multiples();

        let mut offsets = Vec::with_capacity(steps.min(MAX_SAMPLES).saturating_add(1));
        offsets.extend((0..steps).map(|k| k as f64 * self.step_s));
        offsets.push(span);
        offsets
    }

    /// Number of samples produced by [`Self::sample_offsets`]
    pub fn sample_count(&self) -> usize {
        self.step_multiples().saturating_add(1)
    }

    /// Count of step multiples lying strictly below the span
    fn step_multiples(&self) -> usize {
        let steps = ((self.span_s() - STEP_EPSILON_S) / self.step_s).ceil();
        if steps.is_nan() || steps <= 0.0 {
            0
        } else {
            // saturating cast
            steps as usize
        }
    }
}

/// Six classical (Keplerian) elements. Distances in km, angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassicalElements {
    pub semi_major_axis_km: f64,
    pub eccentricity: f64,
    pub inclination_deg: f64,
    pub arg_of_perigee_deg: f64,
    pub raan_deg: f64,
    pub true_anomaly_deg: f64,
}

impl ClassicalElements {
    /// From `[a, e, i, argp, raan, nu]`
    pub fn from_array(v: [f64; 6]) -> Self {
        Self {
            semi_major_axis_km: v[0],
            eccentricity: v[1],
            inclination_deg: v[2],
            arg_of_perigee_deg: v[3],
            raan_deg: v[4],
            true_anomaly_deg: v[5],
        }
    }

    pub fn to_array(&self) -> [f64; 6] {
        [
            self.semi_major_axis_km,
            self.eccentricity,
            self.inclination_deg,
            self.arg_of_perigee_deg,
            self.raan_deg,
            self.true_anomaly_deg,
        ]
    }

    /// Closed elliptical orbit with finite angles
    pub fn validate(&self) -> Result<()> {
        if !self.to_array().iter().all(|v| v.is_finite()) {
            return Err(ConnectError::InvalidArgument(
                "orbital elements must be finite".to_string(),
            ));
        }
        if self.semi_major_axis_km <= 0.0 {
            return Err(ConnectError::InvalidArgument(format!(
                "semi-major axis must be positive, got {} km",
                self.semi_major_axis_km
            )));
        }
        if !(0.0..1.0).contains(&self.eccentricity) {
            return Err(ConnectError::InvalidArgument(format!(
                "eccentricity must be in [0, 1), got {}",
                self.eccentricity
            )));
        }
        Ok(())
    }
}

/// Propagator assigned to a vehicle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropagatorKind {
    /// High-precision orbit propagator
    Hpop,
    TwoBody,
    J2Perturbation,
}

impl PropagatorKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Hpop => "HPOP",
            Self::TwoBody => "TwoBody",
            Self::J2Perturbation => "J2Perturbation",
        }
    }

    pub fn from_keyword(s: &str) -> Option<Self> {
        match s {
            "HPOP" => Some(Self::Hpop),
            "TwoBody" => Some(Self::TwoBody),
            "J2Perturbation" => Some(Self::J2Perturbation),
            _ => None,
        }
    }
}

/// Basic attitude profiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttitudeProfile {
    /// Nadir aligned, constrained toward the ECI velocity vector
    NadirEciVelocity,
    /// Sun pointing, constrained toward the ecliptic normal
    SunEclipticNormal,
}

impl AttitudeProfile {
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::NadirEciVelocity => "NadirECIVelocity",
            Self::SunEclipticNormal => "SunEclipticNormal",
        }
    }

    pub fn from_keyword(s: &str) -> Option<Self> {
        match s {
            "NadirECIVelocity" => Some(Self::NadirEciVelocity),
            "SunEclipticNormal" => Some(Self::SunEclipticNormal),
            _ => None,
        }
    }
}

/// Unit preferences the workflow pins before reading results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitPreference {
    /// Times reported as seconds since the scenario epoch
    EpochSeconds,
    /// Power reported in watts
    Watts,
}

impl UnitPreference {
    pub fn dimension(&self) -> &'static str {
        match self {
            Self::EpochSeconds => "DateFormat",
            Self::Watts => "Power",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Self::EpochSeconds => "EpSec",
            Self::Watts => "W",
        }
    }
}

/// Instance path of a scenario object, e.g. `*/Satellite/Sat1`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectPath(String);

impl ObjectPath {
    pub fn satellite(name: &str) -> Self {
        Self(format!("*/Satellite/{}", name))
    }

    pub fn parse(path: &str) -> Result<Self> {
        match path.strip_prefix("*/Satellite/") {
            Some(name) if !name.is_empty() && !name.contains('/') => Ok(Self(path.to_string())),
            _ => Err(ConnectError::Parse(format!("not a satellite path: '{}'", path))),
        }
    }

    /// Last path component
    pub fn name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Data provider request for one group of a grouped provider
#[derive(Debug, Clone, PartialEq)]
pub struct DataProviderQuery {
    pub provider: String,
    /// 1-based group index
    pub group: usize,
    pub window: AnalysisWindow,
    pub elements: Vec<String>,
}

/// Numeric table returned by a data provider
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataSet {
    pub elements: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

impl DataSet {
    /// Values of one named element, in row order
    pub fn column(&self, element: &str) -> Option<Vec<f64>> {
        let idx = self.elements.iter().position(|e| e == element)?;
        self.rows.iter().map(|row| row.get(idx).copied()).collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Parse a CSV report body (header row of element names, numeric rows)
    pub fn from_csv(text: &str) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let elements: Vec<String> = reader
            .headers()
            .map_err(|e| ConnectError::Parse(format!("report header: {}", e)))?
            .iter()
            .map(str::to_string)
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| ConnectError::Parse(format!("report row: {}", e)))?;
            let row = record
                .iter()
                .map(|field| {
                    field
                        .parse::<f64>()
                        .map_err(|_| ConnectError::Parse(format!("non-numeric value '{}'", field)))
                })
                .collect::<Result<Vec<f64>>>()?;
            rows.push(row);
        }

        Ok(Self { elements, rows })
    }

    /// Render as the CSV report body understood by [`Self::from_csv`]
    pub fn to_csv_lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.rows.len() + 1);
        lines.push(self.elements.join(","));
        for row in &self.rows {
            lines.push(row.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(","));
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> StkDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_date_parse_and_display() {
        let d = date("1 Jan 2020 00:00:00");
        assert_eq!(d.to_string(), "1 Jan 2020 00:00:00.000");

        let d = date("15 Mar 2021 12:30:05.250");
        assert_eq!(d.to_string(), "15 Mar 2021 12:30:05.250");

        assert!("2020-01-01T00:00:00".parse::<StkDate>().is_err());
    }

    #[test]
    fn test_date_arithmetic() {
        let start = date("1 Jan 2020 00:00:00");
        let stop = date("1 Jan 2020 01:00:00");
        assert_eq!(stop.seconds_since(&start), 3600.0);
        assert_eq!(start.plus_seconds(3600.0), stop);
    }

    #[test]
    fn test_window_validation() {
        let start = date("1 Jan 2020 00:00:00");
        let stop = date("1 Jan 2020 01:00:00");

        assert!(AnalysisWindow::new(start, stop, 60.0).is_ok());
        assert!(AnalysisWindow::new(stop, start, 60.0).is_err());
        assert!(AnalysisWindow::new(start, start, 60.0).is_err());
        assert!(AnalysisWindow::new(start, stop, 0.0).is_err());
        assert!(AnalysisWindow::new(start, stop, -1.0).is_err());
        assert!(AnalysisWindow::new(start, stop, f64::NAN).is_err());
    }

    #[test]
    fn test_sample_offsets_include_stop() {
        let start = date("1 Jan 2020 00:00:00");
        let w = AnalysisWindow::new(start, date("1 Jan 2020 01:00:00"), 60.0).unwrap();
        let offsets = w.sample_offsets();
        assert_eq!(offsets.len(), 61);
        assert_eq!(offsets[0], 0.0);
        assert_eq!(*offsets.last().unwrap(), 3600.0);

        // Uneven step: last sample is the stop time, not a step multiple
        let w = AnalysisWindow::new(start, date("1 Jan 2020 00:01:40"), 30.0).unwrap();
        assert_eq!(w.sample_offsets(), vec![0.0, 30.0, 60.0, 90.0, 100.0]);
        assert!(w.sample_offsets().windows(2).all(|p| p[1] > p[0]));
        assert_eq!(w.sample_count(), 5);

        // 0..3600 at 7 s: 0, 7, ..., 3598, then 3600
        let w = AnalysisWindow::new(start, date("1 Jan 2020 01:00:00"), 7.0).unwrap();
        assert_eq!(w.sample_count(), 516);
        assert_eq!(w.sample_offsets().len(), 516);
    }

    #[test]
    fn test_tiny_step_rejected() {
        let start = date("1 Jan 2020 00:00:00");
        let stop = date("1 Jan 2020 01:00:00");

        let err = AnalysisWindow::new(start, stop, 1e-300).unwrap_err();
        assert!(matches!(err, ConnectError::InvalidArgument(_)), "{}", err);
        assert!(AnalysisWindow::new(start, stop, 0.001).is_err());

        // counting never overflows, even on a window that skipped validation
        let raw = AnalysisWindow {
            start,
            stop,
            step_s: 1e-300,
        };
        assert_eq!(raw.sample_count(), usize::MAX);

        // right at the limit is still accepted
        let w = AnalysisWindow::new(start, stop, 3600.0 / (MAX_SAMPLES - 1) as f64).unwrap();
        assert!(w.sample_count() <= MAX_SAMPLES);
    }

    #[test]
    fn test_elements_validation() {
        let leo = ClassicalElements::from_array([7000.0, 0.001, 51.6, 0.0, 0.0, 0.0]);
        assert!(leo.validate().is_ok());
        assert_eq!(leo.to_array()[2], 51.6);

        let hyperbolic = ClassicalElements { eccentricity: 1.2, ..leo };
        assert!(hyperbolic.validate().is_err());

        let negative = ClassicalElements { semi_major_axis_km: -1.0, ..leo };
        assert!(negative.validate().is_err());

        let nan = ClassicalElements { raan_deg: f64::NAN, ..leo };
        assert!(nan.validate().is_err());
    }

    #[test]
    fn test_version_matches() {
        assert!(StkVersion(11).matches("11.6.0"));
        assert!(StkVersion(12).matches("12"));
        assert!(!StkVersion(10).matches("11.2"));
        assert!(!StkVersion(10).matches("garbage"));
    }

    #[test]
    fn test_object_path() {
        let p = ObjectPath::satellite("PowerSat");
        assert_eq!(p.as_str(), "*/Satellite/PowerSat");
        assert_eq!(p.name(), "PowerSat");
        assert_eq!(ObjectPath::parse("*/Satellite/PowerSat").unwrap(), p);
        assert!(ObjectPath::parse("*/Facility/Site").is_err());
    }

    #[test]
    fn test_data_set_csv() {
        let ds = DataSet::from_csv("Time,Power\n0,12.5\n60,13\n").unwrap();
        assert_eq!(ds.elements, vec!["Time", "Power"]);
        assert_eq!(ds.column("Time").unwrap(), vec![0.0, 60.0]);
        assert_eq!(ds.column("Power").unwrap(), vec![12.5, 13.0]);
        assert!(ds.column("Voltage").is_none());

        assert!(DataSet::from_csv("Time,Power\n0,abc\n").is_err());
    }
}
