//! # Planner Executable
//!
//! Loads a planning scenario, plans a circle corridor through it and saves the resulting report
//! into the session directory.
//!
//! ```text
//! plan_exec <scenario.json> [--params <file>] [--max-iterations <n>]
//! ```

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::path::PathBuf;

use color_eyre::{eyre::WrapErr, Result};
use log::{debug, info, warn};
use serde::Deserialize;
use structopt::StructOpt;

use plan_lib::{scenario::Scenario, CirclePlanner, PlannerParams};
use util::{
    logger::{logger_init, LoggerParams},
    session::Session,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, StructOpt)]
#[structopt(
    name = "plan_exec",
    about = "Plan a corridor of overlapping circles through a scenario"
)]
struct Opt {
    /// Path to the scenario JSON file
    #[structopt(parse(from_os_str))]
    scenario: PathBuf,

    /// Path to a parameter file, defaults to `plan_exec.toml` in the params directory
    #[structopt(long, parse(from_os_str))]
    params: Option<PathBuf>,

    /// Limit the number of iterations of each search, overriding the parameter file
    #[structopt(long)]
    max_iterations: Option<usize>,
}

/// Contents of the executable's parameter file.
#[derive(Debug, Deserialize)]
struct PlanExecParams {
    planner: PlannerParams,

    #[serde(default)]
    logger: LoggerParams,
}

// ------------------------------------------------------------------------------------------------
// MAIN
// ------------------------------------------------------------------------------------------------

fn main() -> Result<()> {
    color_eyre::install()?;

    let opt = Opt::from_args();

    // ---- EARLY INITIALISATION ----

    let mut params: PlanExecParams = match opt.params {
        Some(ref path) => util::params::load_from_path::<PlanExecParams, _>(path),
        None => util::params::load::<PlanExecParams>("plan_exec.toml"),
    }
    .wrap_err("Could not load plan_exec params")?;

    if opt.max_iterations.is_some() {
        params.planner.max_search_iterations = opt.max_iterations;
    }

    params
        .planner
        .validate()
        .wrap_err("Invalid planner params")?;

    let session = Session::new("plan_exec", "sessions").wrap_err("Failed to create the session")?;

    if let Err(e) = logger_init(&params.logger, &session) {
        session.exit();
        return Err(e).wrap_err("Failed to initialise logging");
    }

    info!("Circle Corridor Planner\n");
    info!("Session directory: {:?}\n", session.session_root);
    debug!("Planner params: {:#?}", params.planner);

    // ---- LOAD SCENARIO ----

    info!("Loading scenario from {:?}", opt.scenario);

    let scenario = match Scenario::load(&opt.scenario) {
        Ok(s) => s,
        Err(e) => {
            session.exit();
            return Err(e).wrap_err("Failed to load scenario");
        }
    };

    info!(
        "Scenario has {} route poses, {} circular obstacles and {} walls",
        scenario.route.len(),
        scenario.field.circles.len(),
        scenario.field.walls.len()
    );

    session.save("plan/scenario.json", scenario.clone());

    // ---- PLAN ----

    let planner = CirclePlanner::new(params.planner, scenario.vehicle, &scenario.field);

    let result = planner
        .plan(&scenario.start_m, &scenario.goal_m, &scenario.route)
        .wrap_err("Planning failed");

    let report = match result {
        Ok(r) => r,
        Err(e) => {
            session.exit();
            return Err(e);
        }
    };

    info!(
        "Corridor: {} circles ({} from the route), {} gap(s) repaired",
        report.corridor.len(),
        report.num_initial_circles,
        report.num_repaired
    );
    info!(
        "Search: {} iterations, {} expanded, {} pruned, {} created",
        report.search_stats.iterations,
        report.search_stats.expanded,
        report.search_stats.pruned,
        report.search_stats.created
    );

    for gap in report.unresolved.iter() {
        warn!(
            "Unresolved gap after circle {}: ({:.2}, {:.2}) -> ({:.2}, {:.2})",
            gap.index, gap.from.centre_m.x, gap.from.centre_m.y, gap.to.centre_m.x, gap.to.centre_m.y
        );
    }

    util::session::save_with_timestamp("plan/report.json", report);

    session.exit();

    Ok(())
}
