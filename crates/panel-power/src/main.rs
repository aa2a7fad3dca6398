//! Solar Panel Power CLI
//!
//! Runs the power scenario on a local STK instance and writes the time series.
//!
//! Usage:
//!   panel-power --job jobs/power.json --output power.csv
//!   panel-power --start "1 Jan 2020 00:00:00" --stop "1 Jan 2020 01:00:00" \
//!               --coes 7000,0.001,51.6,0,0,0 --model sat.dae \
//!               --groups PanelA,PanelB --group-index 1 --format json

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use panel_power::{workflow, ConnectConfig, PanelGroups, PowerJob, PowerTimeSeries};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use stk_connect::{ClassicalElements, SimConnector, StkDate, StkVersion};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Csv,
    Json,
}

#[derive(Parser, Debug)]
#[command(
    name = "panel-power",
    about = "Solar-panel power time series from an STK scenario"
)]
struct Args {
    /// JSON job file (replaces the job flags below)
    #[arg(short, long)]
    job: Option<PathBuf>,

    /// Analysis start, e.g. "1 Jan 2020 00:00:00"
    #[arg(long)]
    start: Option<String>,

    /// Analysis stop
    #[arg(long)]
    stop: Option<String>,

    /// Time step in seconds
    #[arg(long, default_value_t = 60.0)]
    step: f64,

    /// Classical elements: a_km,e,i_deg,argp_deg,raan_deg,nu_deg
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    coes: Vec<f64>,

    /// Orbit epoch (defaults to the analysis start)
    #[arg(long)]
    orbit_epoch: Option<String>,

    /// 3-D model file with the panel geometry
    #[arg(long)]
    model: Option<PathBuf>,

    /// Panel group names, in model order
    #[arg(long, value_delimiter = ',')]
    groups: Vec<String>,

    /// 1-based panel group to extract
    #[arg(long, default_value_t = 1)]
    group_index: usize,

    /// Connection config JSON
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output file (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    format: OutputFormat,

    /// Run against the built-in simulated application
    #[arg(long)]
    simulate: bool,

    /// Keep the scenario loaded after the run
    #[arg(long)]
    keep_open: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    // Initialize logging (stderr; stdout may carry the series)
    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();

    if let Err(e) = run(args) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let job = job_from_args(&args)?;

    let mut config = ConnectConfig::load(args.config.as_deref()).context("loading config")?;
    if args.keep_open {
        config.scenario.keep_scenario_open = true;
    }

    let series = if args.simulate {
        info!("Using the simulated application");
        let connector = SimConnector::new(StkVersion::FALLBACK_ORDER.to_vec());
        workflow::run(&connector, &config, &job)?
    } else {
        workflow::run(&config.connector(), &config, &job)?
    };

    info!(
        "{} samples, peak {:.1} W, {:.2} Wh",
        series.len(),
        series.peak_w(),
        series.energy_wh()
    );

    match &args.output {
        Some(path) => {
            info!("Writing output to {:?}", path);
            let file = File::create(path).with_context(|| format!("creating {:?}", path))?;
            write_series(&series, args.format, BufWriter::new(file))
        }
        None => write_series(&series, args.format, io::stdout().lock()),
    }
}

fn write_series<W: Write>(series: &PowerTimeSeries, format: OutputFormat, mut writer: W) -> Result<()> {
    match format {
        OutputFormat::Csv => series.write_csv(&mut writer)?,
        OutputFormat::Json => {
            series.write_json(&mut writer)?;
            writeln!(writer)?;
        }
    }
    writer.flush()?;
    Ok(())
}

fn job_from_args(args: &Args) -> Result<PowerJob> {
    if let Some(path) = &args.job {
        return PowerJob::from_file(path).with_context(|| format!("loading job {:?}", path));
    }

    let (Some(start), Some(stop), Some(model)) = (&args.start, &args.stop, &args.model) else {
        bail!("either --job or --start, --stop and --model are required");
    };
    let coes: [f64; 6] = match args.coes.as_slice().try_into() {
        Ok(coes) => coes,
        Err(_) => bail!("--coes takes exactly six values"),
    };

    let start: StkDate = start.parse()?;
    let orbit_epoch = match &args.orbit_epoch {
        Some(epoch) => epoch.parse()?,
        None => start,
    };
    let panel_groups = PanelGroups::new(args.groups.iter().cloned())?;

    Ok(PowerJob {
        start,
        stop: stop.parse()?,
        step_s: args.step,
        elements: ClassicalElements::from_array(coes),
        orbit_epoch,
        model_file: model.clone(),
        panel_count: panel_groups.len(),
        panel_groups,
        group_index: args.group_index,
    })
}
