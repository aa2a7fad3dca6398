//! Power job input and local validation

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use stk_connect::{AnalysisWindow, ClassicalElements, StkDate};

use crate::{PanelPowerError, Result};

/// Ordered, non-empty list of panel group names, addressed by 1-based index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct PanelGroups(Vec<String>);

impl PanelGroups {
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names.into_iter().map(Into::into).collect::<Vec<_>>().try_into()
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Name at a 1-based index
    pub fn get(&self, index: usize) -> Option<&str> {
        index.checked_sub(1).and_then(|i| self.0.get(i)).map(String::as_str)
    }

    /// Check a 1-based index against the registered groups
    pub fn check_index(&self, index: usize) -> Result<()> {
        if index == 0 || index > self.len() {
            return Err(PanelPowerError::GroupIndexOutOfRange {
                index,
                count: self.len(),
            });
        }
        Ok(())
    }
}

impl TryFrom<Vec<String>> for PanelGroups {
    type Error = PanelPowerError;

    fn try_from(names: Vec<String>) -> Result<Self> {
        if names.is_empty() {
            return Err(PanelPowerError::Validation(
                "at least one panel group is required".to_string(),
            ));
        }
        for name in &names {
            if name.trim().is_empty() {
                return Err(PanelPowerError::Validation("empty panel group name".to_string()));
            }
            if name.contains(['"', '\n', '\r']) {
                return Err(PanelPowerError::Validation(format!(
                    "panel group name {:?} cannot be quoted",
                    name
                )));
            }
        }
        Ok(Self(names))
    }
}

impl From<PanelGroups> for Vec<String> {
    fn from(groups: PanelGroups) -> Self {
        groups.0
    }
}

/// Everything needed for one power run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerJob {
    pub start: StkDate,
    pub stop: StkDate,
    pub step_s: f64,
    pub elements: ClassicalElements,
    /// Epoch of the classical elements
    pub orbit_epoch: StkDate,
    /// 3-D model carrying the panel geometry
    pub model_file: PathBuf,
    /// Must equal the number of names in `panel_groups`
    pub panel_count: usize,
    pub panel_groups: PanelGroups,
    /// 1-based index of the group to extract
    #[serde(default = "default_group_index")]
    pub group_index: usize,
}

fn default_group_index() -> usize {
    1
}

impl PowerJob {
    /// Load a job from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let job: PowerJob = serde_json::from_str(&content)?;
        Ok(job)
    }

    pub fn window(&self) -> Result<AnalysisWindow> {
        AnalysisWindow::new(self.start, self.stop, self.step_s)
            .map_err(|e| PanelPowerError::Validation(e.to_string()))
    }

    /// Local checks, run before anything is sent to the application
    pub fn validate(&self) -> Result<()> {
        self.window()?;
        self.elements
            .validate()
            .map_err(|e| PanelPowerError::Validation(e.to_string()))?;

        if !self.model_file.is_file() {
            return Err(PanelPowerError::Validation(format!(
                "model file {} does not exist",
                self.model_file.display()
            )));
        }

        if self.panel_count == 0 || self.panel_count != self.panel_groups.len() {
            return Err(PanelPowerError::Validation(format!(
                "panel count {} does not match {} group names",
                self.panel_count,
                self.panel_groups.len()
            )));
        }

        self.panel_groups.check_index(self.group_index)
    }

    /// Name of the group being extracted
    pub fn group_name(&self) -> Option<&str> {
        self.panel_groups.get(self.group_index)
    }
}
