//! Power time series extracted from the data provider

use serde::{Deserialize, Serialize};
use std::io::Write;
use stk_connect::DataSet;

use crate::{PanelPowerError, Result};

pub const TIME_ELEMENT: &str = "Time";
pub const POWER_ELEMENT: &str = "Power";

/// One row: seconds from scenario start, power in watts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerSample {
    pub time_s: f64,
    pub power_w: f64,
}

/// Power of one panel group over the analysis window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PowerTimeSeries {
    group: String,
    group_index: usize,
    samples: Vec<PowerSample>,
}

impl PowerTimeSeries {
    /// Build from a `Time`/`Power` data set, requiring strictly increasing times
    pub fn from_data_set(group: &str, group_index: usize, data: &DataSet) -> Result<Self> {
        let column = |name: &str| {
            data.column(name).ok_or_else(|| {
                PanelPowerError::Connect(stk_connect::ConnectError::Parse(format!(
                    "data set has no '{}' element (got {:?})",
                    name, data.elements
                )))
            })
        };
        let times = column(TIME_ELEMENT)?;
        let powers = column(POWER_ELEMENT)?;

        if times.is_empty() {
            return Err(PanelPowerError::EmptyResult);
        }
        if let Some(w) = times.windows(2).find(|w| w[1] <= w[0]) {
            return Err(PanelPowerError::Validation(format!(
                "sample times not increasing: {} then {}",
                w[0], w[1]
            )));
        }

        let samples = times
            .into_iter()
            .zip(powers)
            .map(|(time_s, power_w)| PowerSample { time_s, power_w })
            .collect();

        Ok(Self {
            group: group.to_string(),
            group_index,
            samples,
        })
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    /// 1-based index the series was extracted for
    pub fn group_index(&self) -> usize {
        self.group_index
    }

    pub fn samples(&self) -> &[PowerSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Two-column `[time_s, power_w]` rows
    pub fn rows(&self) -> Vec<[f64; 2]> {
        self.samples.iter().map(|s| [s.time_s, s.power_w]).collect()
    }

    pub fn peak_w(&self) -> f64 {
        self.samples.iter().map(|s| s.power_w).fold(0.0, f64::max)
    }

    /// Trapezoidal energy over the series, watt-hours
    pub fn energy_wh(&self) -> f64 {
        self.samples
            .windows(2)
            .map(|w| 0.5 * (w[0].power_w + w[1].power_w) * (w[1].time_s - w[0].time_s))
            .sum::<f64>()
            / 3600.0
    }

    /// `time_s,power_w` CSV
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv = csv::Writer::from_writer(writer);
        for sample in &self.samples {
            csv.serialize(sample)?;
        }
        csv.flush()?;
        Ok(())
    }

    pub fn write_json<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }
}
