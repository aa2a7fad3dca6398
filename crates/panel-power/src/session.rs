//! Scenario-owning session over an attached application

use stk_connect::{Automation, StkVersion};
use tracing::{debug, info, warn};

use crate::Result;

/// Owns the automation handle and the scenario created on it.
///
/// The scenario is unloaded by [`Session::close`], or on drop if the session
/// is abandoned early, unless `keep_open` was requested.
pub struct Session<A: Automation> {
    stk: A,
    version: StkVersion,
    scenario: String,
    keep_open: bool,
    closed: bool,
}

impl<A: Automation> Session<A> {
    /// Create `scenario` on the application and take ownership of it
    pub fn open(mut stk: A, version: StkVersion, scenario: &str, keep_open: bool) -> Result<Self> {
        stk.new_scenario(scenario)?;
        info!("Scenario '{}' created on STK {}", scenario, version);

        Ok(Self {
            stk,
            version,
            scenario: scenario.to_string(),
            keep_open,
            closed: false,
        })
    }

    pub fn stk(&mut self) -> &mut A {
        &mut self.stk
    }

    pub fn version(&self) -> StkVersion {
        self.version
    }

    pub fn scenario(&self) -> &str {
        &self.scenario
    }

    /// Tear down: unload the scenario unless it is kept open
    pub fn close(mut self) -> Result<()> {
        self.closed = true;
        if self.keep_open {
            info!("Leaving scenario '{}' open", self.scenario);
            return Ok(());
        }
        self.stk.unload_scenario()?;
        debug!("Scenario '{}' unloaded", self.scenario);
        Ok(())
    }
}

impl<A: Automation> Drop for Session<A> {
    fn drop(&mut self) {
        if self.closed || self.keep_open {
            return;
        }
        if let Err(e) = self.stk.unload_scenario() {
            warn!("Failed to unload scenario '{}': {}", self.scenario, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stk_connect::sim::{SimCall, SimulatedStk};

    #[test]
    fn test_close_unloads() {
        let mut sim = SimulatedStk::new("11.6.0");
        let session = Session::open(&mut sim, StkVersion(11), "S1", false).unwrap();
        assert_eq!(session.scenario(), "S1");
        session.close().unwrap();

        assert_eq!(sim.scenario_name(), None);
        assert_eq!(sim.calls().last(), Some(&SimCall::UnloadScenario));
        // exactly one unload
        assert_eq!(
            sim.calls().iter().filter(|c| **c == SimCall::UnloadScenario).count(),
            1
        );
    }

    #[test]
    fn test_drop_unloads() {
        let mut sim = SimulatedStk::new("11.6.0");
        {
            let mut session = Session::open(&mut sim, StkVersion(11), "S1", false).unwrap();
            session.stk().new_satellite("Sat1").unwrap();
        }
        assert_eq!(sim.scenario_name(), None);
    }

    #[test]
    fn test_keep_open() {
        let mut sim = SimulatedStk::new("11.6.0");
        Session::open(&mut sim, StkVersion(11), "Legacy", true)
            .unwrap()
            .close()
            .unwrap();
        assert_eq!(sim.scenario_name(), Some("Legacy"));

        {
            let _session = Session::open(&mut sim, StkVersion(11), "Legacy2", true).unwrap();
        }
        assert_eq!(sim.scenario_name(), Some("Legacy2"));
        assert!(!sim.calls().contains(&SimCall::UnloadScenario));
    }

    #[test]
    fn test_open_failure_leaves_nothing() {
        let mut sim = SimulatedStk::new("11.6.0");
        assert!(Session::open(&mut sim, StkVersion(11), "", false).is_err());
        assert!(!sim.calls().contains(&SimCall::UnloadScenario));
    }
}
