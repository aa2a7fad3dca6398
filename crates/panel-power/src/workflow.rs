//! The scripted power run

use stk_connect::{
    attach_first, AttitudeProfile, Automation, Connector, DataProviderQuery, PropagatorKind,
    StkVersion, UnitPreference, SOLAR_PANEL_POWER,
};
use tracing::{debug, info, warn};

use crate::series::{POWER_ELEMENT, TIME_ELEMENT};
use crate::{
    ConnectConfig, PanelPowerError, PowerJob, PowerTimeSeries, Result, ScenarioOptions, Session,
    SolarPanelCommand,
};

/// Validate, attach to the first candidate version that accepts, and run the job
pub fn run<C: Connector>(
    connector: &C,
    config: &ConnectConfig,
    job: &PowerJob,
) -> Result<PowerTimeSeries> {
    job.validate()?;
    config.scenario.validate()?;

    let (version, stk) = attach_first(connector, &config.versions())?;
    generate_solar_panel_power(stk, version, job, &config.scenario)
}

/// Run the full scenario script on an attached application
pub fn generate_solar_panel_power<A: Automation>(
    stk: A,
    version: StkVersion,
    job: &PowerJob,
    options: &ScenarioOptions,
) -> Result<PowerTimeSeries> {
    job.validate()?;
    let window = job.window()?;
    let group = job
        .group_name()
        .ok_or(PanelPowerError::GroupIndexOutOfRange {
            index: job.group_index,
            count: job.panel_groups.len(),
        })?
        .to_string();

    let scenario = options.resolve_scenario_name();
    let mut session = Session::open(stk, version, &scenario, options.keep_scenario_open)?;
    let stk = session.stk();

    stk.set_analysis_period(&window)?;
    stk.set_epoch(&window.start)?;
    info!("Analysis window {} .. {} step {} s", window.start, window.stop, window.step_s);

    let sat = stk.new_satellite(&options.satellite_name)?;
    stk.set_propagator(&sat, PropagatorKind::Hpop, job.step_s)?;
    stk.assign_classical(&sat, &job.elements, &job.orbit_epoch)?;
    stk.set_attitude(&sat, AttitudeProfile::NadirEciVelocity)?;
    stk.propagate(&sat)?;
    info!("Propagated {}", sat);

    stk.set_model(&sat, &job.model_file)?;
    stk.set_unit(UnitPreference::EpochSeconds)?;

    for step in [
        SolarPanelCommand::Register(&job.panel_groups),
        SolarPanelCommand::RenderMethod(options.render_method),
        SolarPanelCommand::Compute(&window),
    ] {
        let command = step.to_command(&sat);
        debug!("{}", command);
        stk.execute(&command)?;
    }
    info!("Computed panel power for {} groups", job.panel_groups.len());

    stk.set_unit(UnitPreference::Watts)?;
    let query = DataProviderQuery {
        provider: SOLAR_PANEL_POWER.to_string(),
        group: job.group_index,
        window,
        elements: vec![TIME_ELEMENT.to_string(), POWER_ELEMENT.to_string()],
    };
    let data = stk.query_data_provider(&sat, &query)?;
    let series = PowerTimeSeries::from_data_set(&group, job.group_index, &data)?;

    let expected = window.sample_count();
    if series.len() != expected {
        warn!(
            "Expected {} samples, application returned {}",
            expected,
            series.len()
        );
    }
    info!(
        "Group {} '{}': {} samples, peak {:.1} W",
        job.group_index,
        group,
        series.len(),
        series.peak_w()
    );

    if let Err(e) = session.close() {
        warn!("Teardown failed: {}", e);
    }

    Ok(series)
}
