use anyhow::Result;
use chrono::{DateTime, Duration, Local, NaiveDate, TimeZone};
use serial_test::serial;
use std::fs;
use std::sync::atomic::AtomicBool;
use tempfile::tempdir;

use dawnr::color::ColorState;
use dawnr::device::PowerState;
use dawnr::geo::{SolarEventSource, SolarEvents};
use dawnr::routine::{build_schedule, plan_day};
use dawnr::scheduler::format_timeline;
use dawnr::testing::{DeviceCommand, FakeClock, RecordingDevice};
use dawnr::{Clock, Config, Log, RoutineContext, TaskDisposition};

/// Same sunrise and sunset every day: 05:10 and 20:40.
struct FixedSun;

impl SolarEventSource for FixedSun {
    fn events_for(&self, date: NaiveDate, _latitude: f64, _longitude: f64) -> Result<SolarEvents> {
        let sunrise = at(date, 5, 10);
        let sunset = at(date, 20, 40);
        Ok(SolarEvents {
            sunrise,
            sunset,
            solar_noon: at(date, 12, 55),
            golden_hour: at(date, 20, 5),
        })
    }
}

fn at(date: NaiveDate, h: u32, m: u32) -> DateTime<Local> {
    Local
        .from_local_datetime(&date.and_hms_opt(h, m, 0).unwrap())
        .unwrap()
}

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 20).unwrap()
}

fn next_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 21).unwrap()
}

const CONFIG: &str = r#"
latitude = 45.508889
longitude = -73.561667
sleep_duration = 7.0
eating_period = 6.75
broadcast = false
evening_color = { hue = 0.0, saturation = 0.0, brightness = 0.8, kelvin = 2500 }

pranayama_base_interval = 6.0
pranayama_cap_interval = 15.7
pranayama_max_ratio = 1.08
pranayama_duration = 14
pranayama_pre_delay = 60

sunrise_kelvin = 6000
sunrise_red_part = 0.3
sunrise_duration = 20
sunrise_anticipation = 60
"#;

fn load_config(content: &str) -> (tempfile::TempDir, Result<Config>) {
    // A whole night of breath and ramp commands is thousands of lines
    Log::set_enabled(false);
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("dawnr").join("dawnr.toml");
    fs::create_dir_all(config_path.parent().unwrap()).unwrap();
    fs::write(&config_path, content).unwrap();

    let config = Config::load_from_path(&config_path);
    (temp_dir, config)
}

fn evening_color() -> ColorState {
    ColorState {
        hue: 0.0,
        saturation: 0.0,
        brightness: 0.8,
        kelvin: 2500,
    }
}

#[test]
#[serial]
fn test_integration_anchors_from_config() {
    let (_temp_dir, config) = load_config(CONFIG);
    let config = config.unwrap();
    let plan = plan_day(&config, &FixedSun, day()).unwrap();
    let anchors = &plan.anchors;

    assert_eq!(anchors.wake, at(next_day(), 4, 10));
    assert_eq!(anchors.sleep, at(day(), 21, 10));
    assert_eq!(anchors.shower, at(day(), 19, 10));
    assert_eq!(anchors.evening_color, at(day(), 19, 10));
    assert_eq!(anchors.pranayama_start, at(day(), 20, 56));
    assert_eq!(anchors.sunrise_start, at(next_day(), 3, 50));
    assert_eq!(anchors.meals[0], at(next_day(), 5, 10));
    assert_eq!(anchors.meals[3], at(next_day(), 11, 55));

    let lines = format_timeline(&anchors.timeline());
    assert_eq!(lines.len(), 12);
    assert!(lines.iter().any(|l| l.starts_with("Wake ") && l.ends_with(" 4:10:00 AM")));
    assert!(lines.iter().any(|l| l.starts_with("Sunset ") && l.ends_with(" 8:40:00 PM")));
}

#[test]
#[serial]
fn test_integration_late_wake_is_capped() {
    // Sunrise at 07:30 minus an hour would be 06:30; the civil limit wins
    struct LateSun;
    impl SolarEventSource for LateSun {
        fn events_for(&self, date: NaiveDate, _: f64, _: f64) -> Result<SolarEvents> {
            Ok(SolarEvents {
                sunrise: at(date, 7, 30),
                sunset: at(date, 16, 30),
                solar_noon: at(date, 12, 0),
                golden_hour: at(date, 16, 0),
            })
        }
    }

    let (_temp_dir, config) = load_config(CONFIG);
    let plan = plan_day(&config.unwrap(), &LateSun, day()).unwrap();
    assert_eq!(plan.anchors.wake, at(next_day(), 6, 0));
    assert_eq!(plan.anchors.sleep, at(day(), 23, 0));
}

#[test]
#[serial]
fn test_integration_full_night() {
    let (_temp_dir, config) = load_config(CONFIG);
    let config = config.unwrap();
    let plan = plan_day(&config, &FixedSun, day()).unwrap();

    let clock = FakeClock::new(at(day(), 18, 0));
    let device = RecordingDevice::new();
    let running = AtomicBool::new(true);
    let ctx = RoutineContext::new(&clock, &device, &running);

    let report = build_schedule(&config, &plan.anchors).unwrap().run(&ctx);
    assert_eq!(
        report,
        vec![
            ("Evening color".to_string(), TaskDisposition::Ran),
            ("Pranayama".to_string(), TaskDisposition::Ran),
            ("Sunrise".to_string(), TaskDisposition::Ran),
        ]
    );

    let commands = device.commands();
    assert_eq!(
        commands[0],
        DeviceCommand::SetColor(evening_color(), std::time::Duration::ZERO)
    );
    assert_eq!(commands[1], DeviceCommand::GetPower);

    let powers: Vec<bool> = commands
        .iter()
        .filter_map(|c| match c {
            DeviceCommand::SetPower(on) => Some(*on),
            _ => None,
        })
        .collect();
    assert_eq!(powers, vec![true, false, true]);

    // The sunrise ends exactly at wake time, on the target color
    let (last_color, last_transition) = *device.colors().last().unwrap();
    assert_eq!(last_color.kelvin, 6000);
    assert_eq!(last_color.brightness, 1.0);
    assert_eq!(last_transition, std::time::Duration::from_millis(20_370));
    assert_eq!(clock.now(), plan.anchors.wake);
}

#[test]
#[serial]
fn test_integration_started_after_pranayama() {
    let (_temp_dir, config) = load_config(CONFIG);
    let config = config.unwrap();
    let plan = plan_day(&config, &FixedSun, day()).unwrap();

    let clock = FakeClock::new(at(day(), 21, 0));
    let device = RecordingDevice::new();
    let running = AtomicBool::new(true);
    let ctx = RoutineContext::new(&clock, &device, &running);

    let report = build_schedule(&config, &plan.anchors).unwrap().run(&ctx);
    assert_eq!(
        report,
        vec![
            ("Evening color".to_string(), TaskDisposition::RanLate),
            ("Pranayama".to_string(), TaskDisposition::Missed),
            ("Sunrise".to_string(), TaskDisposition::Ran),
        ]
    );
    assert!(!device.commands().contains(&DeviceCommand::GetPower));
}

#[test]
#[serial]
fn test_integration_light_off_skips_pranayama_only() {
    let (_temp_dir, config) = load_config(CONFIG);
    let config = config.unwrap();
    let plan = plan_day(&config, &FixedSun, day()).unwrap();

    let clock = FakeClock::new(at(day(), 18, 0));
    let device = RecordingDevice::with_power(Some(PowerState::Off));
    let running = AtomicBool::new(true);
    let ctx = RoutineContext::new(&clock, &device, &running);

    build_schedule(&config, &plan.anchors).unwrap().run(&ctx);

    let commands = device.commands();
    // Evening color, the power query, then straight to the sunrise
    assert_eq!(commands[1], DeviceCommand::GetPower);
    assert!(matches!(commands[2], DeviceCommand::SetColor(c, _) if c.brightness == 0.0));
    assert_eq!(commands[3], DeviceCommand::SetPower(true));
    assert_eq!(clock.now(), plan.anchors.wake);
}

#[test]
#[serial]
fn test_integration_shutdown_before_sunrise() {
    let (_temp_dir, config) = load_config(CONFIG);
    let config = config.unwrap();
    let plan = plan_day(&config, &FixedSun, day()).unwrap();

    let clock = FakeClock::new(at(day(), 18, 0)).with_shutdown_at(at(day(), 23, 0));
    let device = RecordingDevice::new();
    let running = AtomicBool::new(true);
    let ctx = RoutineContext::new(&clock, &device, &running);

    let report = build_schedule(&config, &plan.anchors).unwrap().run(&ctx);
    assert_eq!(report[2], ("Sunrise".to_string(), TaskDisposition::Interrupted));
    assert_eq!(clock.now(), at(day(), 23, 0));
    assert!(
        device
            .colors()
            .iter()
            .all(|(c, _)| c.kelvin != 6000 || c.brightness < 1.0)
    );
}

#[test]
#[serial]
fn test_integration_conflicting_growth_settings() {
    let content = format!("{CONFIG}pranayama_steps = 12\n");
    let (_temp_dir, config) = load_config(&content);
    assert!(config.is_err());
}

#[test]
#[serial]
fn test_integration_unknown_key_rejected() {
    let content = format!("{CONFIG}night_temp = 3300\n");
    let (_temp_dir, config) = load_config(&content);
    assert!(config.is_err());
}

#[test]
#[serial]
fn test_integration_empty_config_uses_defaults() {
    let (_temp_dir, config) = load_config("");
    let config = config.unwrap();
    assert_eq!(config.sunrise_kelvin(), 6000);
    assert_eq!(config.sunrise_duration(), Duration::minutes(20));
    assert!(config.breath_settings().is_ok());
}
