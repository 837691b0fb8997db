use am_atmosphere::UsStandard1976;
use am_core::units::{ft, kg, m, mph, mps, sq_m, w};
use am_mission::{paths, segments, Analyses, Mission};
use am_physics::{ElectricRotor, LithiumIonPack, PolarAero};
use am_results::hash::RunFingerprint;
use am_results::{compute_run_id, RunManifest, RunStore, SegmentRecord};
use am_vehicle::{
    design, BatteryModule, Bus, Fuselage, Network, Propulsor, Vehicle, WeightMethod, Wing,
};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const SOLVER_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "am-cli")]
#[command(about = "aeromission CLI - aircraft mission analysis tool", long_about = None)]
struct Cli {
    /// Workspace directory holding the run store
    #[arg(long, default_value = ".")]
    workspace: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the built-in electric testbed mission (climb, cruise, descent)
    Fly {
        /// Control points per segment
        #[arg(long, default_value_t = 16)]
        points: usize,
        /// Skip cache and force re-run
        #[arg(long)]
        no_cache: bool,
    },
    /// List cached runs for a mission tag
    Runs { mission_tag: String },
    /// Show details of a cached run
    ShowRun { run_id: String },
    /// Export a condition column from one segment of a run as CSV
    ExportSeries {
        run_id: String,
        /// Segment tag
        segment: String,
        /// Dotted condition path, e.g. freestream.velocity
        variable: String,
        /// Output CSV file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let store = RunStore::for_workspace(&cli.workspace)?;

    match cli.command {
        Commands::Fly { points, no_cache } => cmd_fly(&store, points, !no_cache),
        Commands::Runs { mission_tag } => cmd_runs(&store, &mission_tag),
        Commands::ShowRun { run_id } => cmd_show_run(&store, &run_id),
        Commands::ExportSeries {
            run_id,
            segment,
            variable,
            output,
        } => cmd_export_series(&store, &run_id, &segment, &variable, output.as_deref()),
    }
}

/// The built-in study vehicle: a two-seat battery-electric testbed with
/// three identical cruise propulsors on one DC bus.
fn testbed_vehicle() -> Result<Vehicle, Box<dyn std::error::Error>> {
    let mut vehicle = Vehicle::new("electric_testbed");

    let mut wing = Wing::new("main_wing", sq_m(12.0), 8.0);
    wing.main_wing = true;
    vehicle.append_wing(wing)?;

    let mut fuselage = Fuselage::new("fuselage", m(6.0), m(1.2), m(1.3));
    fuselage.seats = 2;
    vehicle.append_fuselage(fuselage)?;

    let mut network = Network::new("electric");
    let mut bus = Bus::new("dc_bus", 400.0);
    bus.append_battery_module(BatteryModule::new("pack", 20_000.0, 400.0));
    for tag in ["center_propulsor", "port_propulsor", "starboard_propulsor"] {
        let mut propulsor = Propulsor::new(tag, m(1.2), w(12e3));
        propulsor.identity_tag = Some("cruise_rotor".into());
        bus.append_propulsor(propulsor);
    }
    network.append_bus(bus);
    vehicle.append_network(network)?;

    design(&mut vehicle, WeightMethod::Electric, kg(90.0))?;
    Ok(vehicle)
}

fn testbed_mission(points: usize) -> Result<Mission, Box<dyn std::error::Error>> {
    let vehicle = testbed_vehicle()?;
    let aspect_ratio = vehicle.main_wing()?.aspect_ratio;
    let analyses = Analyses {
        vehicle: Arc::new(vehicle),
        atmosphere: Arc::new(UsStandard1976::new()),
        aerodynamics: Arc::new(PolarAero::new(0.25, 5.7, 0.025, aspect_ratio, 0.8)),
        propulsion: Arc::new(ElectricRotor::new()),
        energy_storage: Arc::new(LithiumIonPack::new()),
    };

    let mut climb = segments::climb::constant_speed_constant_rate(
        "climb",
        analyses.clone(),
        Some(m(0.0)),
        ft(5000.0),
        mps(2.0),
        Some(mps(35.0)),
    )?;
    climb.state.numerics.number_of_control_points = points;

    let mut cruise = segments::cruise::constant_speed_constant_altitude(
        "cruise",
        analyses.clone(),
        None,
        Some(mph(90.0)),
        m(25_000.0),
    )?;
    cruise.state.numerics.number_of_control_points = points;

    let mut descent = segments::descent::constant_speed_constant_rate(
        "descent",
        analyses,
        None,
        m(300.0),
        mps(1.5),
        Some(mps(33.0)),
    )?;
    descent.state.numerics.number_of_control_points = points;

    let mut mission = Mission::new("testbed_mission");
    mission.append_segment(climb);
    mission.append_segment(cruise);
    mission.append_segment(descent);
    Ok(mission)
}

fn cmd_fly(
    store: &RunStore,
    points: usize,
    use_cache: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut mission = testbed_mission(points)?;

    let fingerprint = RunFingerprint {
        mission_tag: mission.tag.clone(),
        vehicle_tag: mission.segments[0].analyses.vehicle.tag.clone(),
        segments: mission
            .segments
            .iter()
            .map(|s| (s.tag.clone(), s.control_points()))
            .collect(),
    };
    let run_id = compute_run_id(&fingerprint, SOLVER_VERSION);

    if use_cache && store.has_run(&run_id) {
        println!("✓ Loaded from cache: {run_id}");
        return print_run_summary(store, &run_id);
    }

    println!("Flying '{}' with {points} points per segment", mission.tag);
    let results = mission.evaluate()?;

    let manifest = RunManifest::new(
        run_id.clone(),
        &mission.tag,
        &fingerprint.vehicle_tag,
        SOLVER_VERSION,
        &results,
    );
    let records: Vec<SegmentRecord> = results
        .segments
        .iter()
        .map(SegmentRecord::from_outcome)
        .collect();
    store.save_run(&manifest, &records)?;

    println!("✓ Mission completed: {run_id}");
    for outcome in &results.segments {
        let status = if outcome.converged { "converged" } else { "FAILED" };
        println!(
            "  {:<10} {status}  residual {:.3e}",
            outcome.tag,
            outcome.residual_norm.unwrap_or(0.0)
        );
    }

    let soc = results.merged_column(&["energy", "dc_bus", "pack", "state_of_charge"], 0)?;
    if let (Some(first), Some(last)) = (soc.first(), soc.last()) {
        println!(
            "  battery: {:.1}% → {:.1}% state of charge",
            first * 100.0,
            last * 100.0
        );
    }
    let time = results.merged_column(paths::TIME, 0)?;
    if let Some(total) = time.last() {
        println!("  total mission time: {:.0} s", total);
    }
    Ok(())
}

fn cmd_runs(store: &RunStore, mission_tag: &str) -> Result<(), Box<dyn std::error::Error>> {
    let runs = store.list_runs(mission_tag)?;
    if runs.is_empty() {
        println!("No cached runs found for mission: {mission_tag}");
    } else {
        println!("Cached runs for mission '{mission_tag}':");
        for manifest in runs {
            println!(
                "  {} ({}, {} segments, all converged: {})",
                manifest.run_id,
                manifest.timestamp,
                manifest.segments.len(),
                manifest.all_converged()
            );
        }
    }
    Ok(())
}

fn print_run_summary(store: &RunStore, run_id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let manifest = store.load_manifest(run_id)?;
    println!("Run {run_id}");
    println!("  mission: {}", manifest.mission_tag);
    println!("  vehicle: {}", manifest.vehicle_tag);
    println!("  stored:  {}", manifest.timestamp);
    for segment in &manifest.segments {
        let status = if segment.converged { "converged" } else { "FAILED" };
        println!(
            "  {:<10} {status}  residual {:.3e}",
            segment.tag,
            segment.residual_norm.unwrap_or(0.0)
        );
    }
    Ok(())
}

fn cmd_show_run(store: &RunStore, run_id: &str) -> Result<(), Box<dyn std::error::Error>> {
    print_run_summary(store, run_id)?;
    let records = store.load_segments(run_id)?;
    println!("  segment records: {}", records.len());
    Ok(())
}

fn cmd_export_series(
    store: &RunStore,
    run_id: &str,
    segment_tag: &str,
    variable: &str,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let records = store.load_segments(run_id)?;
    let record = records
        .iter()
        .find(|r| r.tag == segment_tag)
        .ok_or_else(|| format!("no segment '{segment_tag}' in run {run_id}"))?;

    let conditions = am_results::conditions_from_json(&record.conditions)?;
    let path: Vec<&str> = variable.split('.').collect();
    let time = conditions.column(paths::TIME, 0)?;
    let values = conditions.column(&path, 0)?;

    let mut csv = String::from("time_s,value\n");
    for (t, v) in time.iter().zip(values.iter()) {
        csv.push_str(&format!("{t},{v}\n"));
    }

    if let Some(path) = output {
        std::fs::write(path, csv)?;
        println!("✓ Exported {} points to {}", values.len(), path.display());
    } else {
        print!("{csv}");
    }
    Ok(())
}
