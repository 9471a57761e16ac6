use anyhow::{Context, Result};
use std::path::PathBuf;

use dawnr::args::{CliAction, ParsedArgs, RunOptions, display_help, display_version_info};
use dawnr::clock::{Clock, RoutineContext, SystemClock};
use dawnr::config::Config;
use dawnr::constants::EXIT_FAILURE;
use dawnr::device::{LifxDiscovery, discover_until_found};
use dawnr::geo::{SunriseCalculator, log_solar_debug_info};
use dawnr::lock::InstanceLock;
use dawnr::logger::Log;
use dawnr::routine::{DayPlan, build_schedule, plan_day};
use dawnr::scheduler::{TaskDisposition, format_timeline};
use dawnr::signals::setup_signal_handler;

fn main() -> Result<()> {
    let parsed_args = ParsedArgs::from_env();

    match parsed_args.action {
        CliAction::ShowVersion => {
            display_version_info();
            Ok(())
        }
        CliAction::ShowHelp => {
            display_help();
            Ok(())
        }
        CliAction::ShowHelpDueToError => {
            display_help();
            std::process::exit(EXIT_FAILURE);
        }
        CliAction::ShowTimeline(options) => exit_on_error(show_timeline(&options)),
        CliAction::Run(options) => exit_on_error(run_daemon(&options)),
    }
}

fn exit_on_error(result: Result<()>) -> Result<()> {
    if let Err(e) = result {
        Log::log_critical(&format!("{e:#}"));
        std::process::exit(EXIT_FAILURE);
    }
    Ok(())
}

fn show_timeline(options: &RunOptions) -> Result<()> {
    let (_config, plan) = prepare(options)?;
    log_timeline(&plan);
    Log::log_end();
    Ok(())
}

/// Load the configuration and derive the night's anchors.
fn prepare(options: &RunOptions) -> Result<(Config, DayPlan)> {
    Log::set_debug(options.debug_enabled);
    Log::log_version();

    let (config, config_path) = match &options.config_path {
        Some(path) => (Config::load_from_path(path)?, path.clone()),
        None => (Config::load()?, Config::get_config_path()?),
    };
    config.log_config(&config_path);

    let today = SystemClock.now().date_naive();
    let plan = plan_day(&config, &SunriseCalculator, today)?;

    let schedule = config.user_schedule();
    log_solar_debug_info(schedule.latitude, schedule.longitude, &plan.today, &plan.tomorrow);

    Ok((config, plan))
}

fn log_timeline(plan: &DayPlan) {
    Log::log_block_start("Timeline:");
    for line in format_timeline(&plan.anchors.timeline()) {
        Log::log_indented(&line);
    }
}

fn run_daemon(options: &RunOptions) -> Result<()> {
    let (config, plan) = prepare(options)?;
    log_timeline(&plan);

    let lock_path: PathBuf = InstanceLock::default_path();
    let Some(lock) = InstanceLock::acquire(&lock_path)? else {
        let holder = InstanceLock::holder_pid(&lock_path)
            .map(|pid| format!(" (PID {pid})"))
            .unwrap_or_default();
        Log::log_error(&format!(
            "Another instance of dawnr is already running{holder}.\n\
            • Kill dawnr before restarting."
        ));
        std::process::exit(EXIT_FAILURE);
    };

    let result = run_routine(&config, &plan);

    Log::log_block_start("Shutting down dawnr...");
    lock.release();
    Log::log_end();

    result
}

fn run_routine(config: &Config, plan: &DayPlan) -> Result<()> {
    let running = setup_signal_handler().context("Failed to install signal handlers")?;
    let clock = SystemClock;

    Log::log_block_start("Looking for lights...");
    let discovery = LifxDiscovery::new(config.broadcast());
    let Some(light) = discover_until_found(&discovery, &clock, &running) else {
        // Shutdown requested before any light answered
        return Ok(());
    };
    Log::log_debug(&format!(
        "Using light {:016x} at {}",
        light.target(),
        light.addr()
    ));

    let schedule = build_schedule(config, &plan.anchors)?;
    let ctx = RoutineContext::new(&clock, &light, &running);

    for (label, disposition) in schedule.run(&ctx) {
        let summary = match disposition {
            TaskDisposition::Ran => "done",
            TaskDisposition::RanLate => "done late",
            TaskDisposition::Missed => "missed",
            TaskDisposition::Failed => "failed",
            TaskDisposition::Cancelled => "cancelled",
            TaskDisposition::Interrupted => "interrupted",
        };
        Log::log_debug(&format!("{label}: {summary}"));
    }

    Ok(())
}
