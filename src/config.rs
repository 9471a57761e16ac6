//! Configuration system for dawnr with validation and default file generation.
//!
//! This module handles the TOML configuration file: locating it, creating a
//! commented default on first run, applying defaults for omitted settings and
//! validating every value before the routine is built from it.
//!
//! ## Configuration Sources
//!
//! The configuration lives at **XDG_CONFIG_HOME**/dawnr/dawnr.toml. An optional
//! `geo.toml` next to it overrides the coordinates, so the main file can be
//! shared or version controlled without revealing a location.
//!
//! ## Configuration Structure
//!
//! ```toml
//! # Location
//! latitude = 45.508889
//! longitude = -73.561667
//!
//! # Daily rhythm
//! sleep_duration = 7.0                # Hours of sleep before waking
//! eating_period = 6.75                # Hours from the first to the last meal
//!
//! # Lights
//! broadcast = true                    # Send commands to every light on the network
//! evening_color = { hue = 0.0, saturation = 0.0, brightness = 0.8, kelvin = 2500 }
//!
//! # Pranayama
//! pranayama_base_interval = 6.0       # Seconds per breath at the start
//! pranayama_cap_interval = 15.789     # Seconds per breath once fully slowed down
//! pranayama_max_ratio = 1.08          # Or pranayama_steps = 12, not both
//! pranayama_duration = 14             # Minutes, ends at sleep time
//! pranayama_pre_delay = 60            # Seconds resting before the first breath
//! pranayama_inhale = 3.0              # Phase proportions
//! pranayama_hold = 4.0
//! pranayama_exhale = 5.0
//! pranayama_empty = 2.0
//!
//! # Sunrise
//! sunrise_kelvin = 6000               # Color temperature at the end of the ramp
//! sunrise_red_part = 0.3              # Share of the ramp spent fading out of red
//! sunrise_duration = 20               # Minutes, ends at wake time
//! sunrise_anticipation = 60           # Minutes to wake before astronomical sunrise
//! ```
//!
//! ## Validation and Error Handling
//!
//! Every numeric setting has a `MINIMUM_*`/`MAXIMUM_*` range in
//! [`crate::constants`]. Colors must have HSB components in [0, 1] and a
//! supported color temperature. Errors name the offending value.

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::anchors::UserSchedule;
use crate::color::ColorState;
use crate::constants::*;
use crate::intervals::{GrowthPolicy, RampParameters};
use crate::logger::Log;
use crate::pranayama::{BreathSettings, PhaseProportions};

/// Coordinates kept in a separate `geo.toml`.
#[derive(Debug, Deserialize, Clone)]
struct GeoConfig {
    latitude: Option<f64>,
    longitude: Option<f64>,
}

/// The dawnr configuration file.
///
/// Every field is optional in the file; after loading, defaults from
/// [`crate::constants`] have been filled in for all of them except the two
/// growth settings, which are mutually exclusive.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub sleep_duration: Option<f64>, // hours
    pub eating_period: Option<f64>,  // hours

    /// Whether commands go to every light on the network or only to the
    /// discovered one. Power queries always go to the discovered light.
    pub broadcast: Option<bool>,
    pub evening_color: Option<ColorState>,

    pub pranayama_base_interval: Option<f64>, // seconds
    pub pranayama_cap_interval: Option<f64>,  // seconds
    pub pranayama_steps: Option<u32>,
    pub pranayama_max_ratio: Option<f64>,
    pub pranayama_duration: Option<u64>,  // minutes
    pub pranayama_pre_delay: Option<u64>, // seconds
    pub pranayama_inhale: Option<f64>,
    pub pranayama_hold: Option<f64>,
    pub pranayama_exhale: Option<f64>,
    pub pranayama_empty: Option<f64>,
    pub pranayama_inhale_color: Option<ColorState>,
    pub pranayama_exhale_color: Option<ColorState>,
    pub pranayama_after_color: Option<ColorState>,

    pub sunrise_kelvin: Option<u16>,
    pub sunrise_red_part: Option<f64>,
    pub sunrise_duration: Option<u64>,     // minutes
    pub sunrise_anticipation: Option<u64>, // minutes
}

impl Config {
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Could not determine config directory")?;
        Ok(config_dir.join("dawnr").join("dawnr.toml"))
    }

    /// Get the path to the geo.toml file (in the same directory as dawnr.toml)
    pub fn get_geo_path() -> Result<PathBuf> {
        let config_path = Self::get_config_path()?;
        match config_path.parent() {
            Some(parent) => Ok(parent.join("geo.toml")),
            None => bail!("Could not determine geo.toml path from config path"),
        }
    }

    /// Write a commented default configuration to `path`.
    pub fn create_default_config(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let config_content = ConfigBuilder::new()
            .add_section("Location")
            .add_setting(
                "latitude",
                &format!("{:.6}", DEFAULT_LATITUDE),
                "Degrees, positive north",
            )
            .add_setting(
                "longitude",
                &format!("{:.6}", DEFAULT_LONGITUDE),
                "Degrees, positive east",
            )
            .add_section("Daily rhythm")
            .add_setting(
                "sleep_duration",
                &format!("{:.2}", DEFAULT_SLEEP_DURATION),
                &format!(
                    "Hours of sleep before waking ({}-{})",
                    MINIMUM_SLEEP_DURATION, MAXIMUM_SLEEP_DURATION
                ),
            )
            .add_setting(
                "eating_period",
                &format!("{:.2}", DEFAULT_EATING_PERIOD),
                &format!(
                    "Hours from the first to the last meal ({}-{})",
                    MINIMUM_EATING_PERIOD, MAXIMUM_EATING_PERIOD
                ),
            )
            .add_section("Lights")
            .add_setting(
                "broadcast",
                &DEFAULT_BROADCAST.to_string(),
                "Send commands to every light on the network",
            )
            .add_setting(
                "evening_color",
                &format_color(&DEFAULT_EVENING_COLOR),
                "Applied two hours before sleep",
            )
            .add_section("Pranayama")
            .add_setting(
                "pranayama_base_interval",
                &format!("{:.3}", DEFAULT_PRANAYAMA_BASE_INTERVAL),
                "Seconds per breath at the start",
            )
            .add_setting(
                "pranayama_cap_interval",
                &format!("{:.3}", DEFAULT_PRANAYAMA_CAP_INTERVAL),
                "Seconds per breath once fully slowed down",
            )
            .add_setting(
                "pranayama_max_ratio",
                &format!("{:.2}", DEFAULT_PRANAYAMA_MAX_RATIO),
                "Largest growth between two breaths (or set pranayama_steps instead)",
            )
            .add_setting(
                "pranayama_duration",
                &DEFAULT_PRANAYAMA_DURATION.to_string(),
                "Minutes, the session ends at sleep time",
            )
            .add_setting(
                "pranayama_pre_delay",
                &DEFAULT_PRANAYAMA_PRE_DELAY.to_string(),
                "Seconds resting on the exhale color before the first breath",
            )
            .add_setting(
                "pranayama_inhale",
                &format!("{:.1}", DEFAULT_PRANAYAMA_INHALE),
                "Relative length of the inhale",
            )
            .add_setting(
                "pranayama_hold",
                &format!("{:.1}", DEFAULT_PRANAYAMA_HOLD),
                "Relative length of holding the breath",
            )
            .add_setting(
                "pranayama_exhale",
                &format!("{:.1}", DEFAULT_PRANAYAMA_EXHALE),
                "Relative length of the exhale",
            )
            .add_setting(
                "pranayama_empty",
                &format!("{:.1}", DEFAULT_PRANAYAMA_EMPTY),
                "Relative length of resting with empty lungs",
            )
            .add_setting(
                "pranayama_inhale_color",
                &format_color(&DEFAULT_PRANAYAMA_INHALE_COLOR),
                "Color at the top of each breath",
            )
            .add_setting(
                "pranayama_exhale_color",
                &format_color(&DEFAULT_PRANAYAMA_EXHALE_COLOR),
                "Color at the bottom of each breath",
            )
            .add_setting(
                "pranayama_after_color",
                &format_color(&DEFAULT_PRANAYAMA_AFTER_COLOR),
                "Color the light keeps for its next power-on",
            )
            .add_section("Sunrise")
            .add_setting(
                "sunrise_kelvin",
                &DEFAULT_SUNRISE_KELVIN.to_string(),
                &format!(
                    "Color temperature at the end of the ramp ({}-{})",
                    MINIMUM_TEMP, MAXIMUM_TEMP
                ),
            )
            .add_setting(
                "sunrise_red_part",
                &format!("{:.2}", DEFAULT_SUNRISE_RED_PART),
                "Share of the ramp spent fading out of red (0-1, exclusive)",
            )
            .add_setting(
                "sunrise_duration",
                &DEFAULT_SUNRISE_DURATION.to_string(),
                "Minutes, the ramp ends at wake time",
            )
            .add_setting(
                "sunrise_anticipation",
                &DEFAULT_SUNRISE_ANTICIPATION.to_string(),
                "Minutes to wake before sunrise (never later than 06:00)",
            )
            .build();

        fs::write(path, config_content)
            .with_context(|| format!("Failed to write default config to {}", path.display()))?;

        Log::log_indented(&format!(
            "Created default configuration at {}",
            crate::utils::path_for_display(path)
        ));
        Ok(())
    }

    fn apply_defaults_and_validate_fields(config: &mut Config) -> Result<()> {
        // Location
        let latitude = *config.latitude.get_or_insert(DEFAULT_LATITUDE);
        if !(-90.0..=90.0).contains(&latitude) {
            bail!("Latitude must be between -90 and 90 degrees (got {})", latitude);
        }
        let longitude = *config.longitude.get_or_insert(DEFAULT_LONGITUDE);
        if !(-180.0..=180.0).contains(&longitude) {
            bail!("Longitude must be between -180 and 180 degrees (got {})", longitude);
        }

        // Daily rhythm
        let sleep = *config.sleep_duration.get_or_insert(DEFAULT_SLEEP_DURATION);
        if !(MINIMUM_SLEEP_DURATION..=MAXIMUM_SLEEP_DURATION).contains(&sleep) {
            bail!(
                "Sleep duration ({} hours) must be between {} and {} hours",
                sleep,
                MINIMUM_SLEEP_DURATION,
                MAXIMUM_SLEEP_DURATION
            );
        }
        let eating = *config.eating_period.get_or_insert(DEFAULT_EATING_PERIOD);
        if !(MINIMUM_EATING_PERIOD..=MAXIMUM_EATING_PERIOD).contains(&eating) {
            bail!(
                "Eating period ({} hours) must be between {} and {} hours",
                eating,
                MINIMUM_EATING_PERIOD,
                MAXIMUM_EATING_PERIOD
            );
        }

        // Lights
        config.broadcast.get_or_insert(DEFAULT_BROADCAST);
        validate_color(
            "evening_color",
            config.evening_color.get_or_insert(DEFAULT_EVENING_COLOR),
        )?;

        // Pranayama
        for (name, field, default) in [
            (
                "Pranayama base interval",
                &mut config.pranayama_base_interval,
                DEFAULT_PRANAYAMA_BASE_INTERVAL,
            ),
            (
                "Pranayama cap interval",
                &mut config.pranayama_cap_interval,
                DEFAULT_PRANAYAMA_CAP_INTERVAL,
            ),
        ] {
            let value = *field.get_or_insert(default);
            if !(MINIMUM_BREATH_INTERVAL..=MAXIMUM_BREATH_INTERVAL).contains(&value) {
                bail!(
                    "{} ({} seconds) must be between {} and {} seconds",
                    name,
                    value,
                    MINIMUM_BREATH_INTERVAL,
                    MAXIMUM_BREATH_INTERVAL
                );
            }
        }

        if let Some(steps) = config.pranayama_steps {
            if !(1..=MAXIMUM_GROWTH_STEPS).contains(&steps) {
                bail!(
                    "Pranayama steps ({}) must be between 1 and {}",
                    steps,
                    MAXIMUM_GROWTH_STEPS
                );
            }
        }
        if let Some(ratio) = config.pranayama_max_ratio {
            if !(ratio > 1.0 && ratio <= MAXIMUM_GROWTH_RATIO) {
                bail!(
                    "Pranayama max ratio ({}) must be greater than 1 and at most {}",
                    ratio,
                    MAXIMUM_GROWTH_RATIO
                );
            }
        }

        let duration = *config
            .pranayama_duration
            .get_or_insert(DEFAULT_PRANAYAMA_DURATION);
        if !(MINIMUM_PRANAYAMA_DURATION..=MAXIMUM_PRANAYAMA_DURATION).contains(&duration) {
            bail!(
                "Pranayama duration ({} minutes) must be between {} and {} minutes",
                duration,
                MINIMUM_PRANAYAMA_DURATION,
                MAXIMUM_PRANAYAMA_DURATION
            );
        }
        let pre_delay = *config
            .pranayama_pre_delay
            .get_or_insert(DEFAULT_PRANAYAMA_PRE_DELAY);
        if pre_delay > MAXIMUM_PRANAYAMA_PRE_DELAY {
            bail!(
                "Pranayama pre-delay ({} seconds) must be at most {} seconds",
                pre_delay,
                MAXIMUM_PRANAYAMA_PRE_DELAY
            );
        }

        config.pranayama_inhale.get_or_insert(DEFAULT_PRANAYAMA_INHALE);
        config.pranayama_hold.get_or_insert(DEFAULT_PRANAYAMA_HOLD);
        config.pranayama_exhale.get_or_insert(DEFAULT_PRANAYAMA_EXHALE);
        config.pranayama_empty.get_or_insert(DEFAULT_PRANAYAMA_EMPTY);

        validate_color(
            "pranayama_inhale_color",
            config
                .pranayama_inhale_color
                .get_or_insert(DEFAULT_PRANAYAMA_INHALE_COLOR),
        )?;
        validate_color(
            "pranayama_exhale_color",
            config
                .pranayama_exhale_color
                .get_or_insert(DEFAULT_PRANAYAMA_EXHALE_COLOR),
        )?;
        validate_color(
            "pranayama_after_color",
            config
                .pranayama_after_color
                .get_or_insert(DEFAULT_PRANAYAMA_AFTER_COLOR),
        )?;

        // Sunrise
        let kelvin = *config.sunrise_kelvin.get_or_insert(DEFAULT_SUNRISE_KELVIN);
        if !(MINIMUM_TEMP..=MAXIMUM_TEMP).contains(&kelvin) {
            bail!(
                "Sunrise temperature ({}K) must be between {} and {} Kelvin",
                kelvin,
                MINIMUM_TEMP,
                MAXIMUM_TEMP
            );
        }
        let red_part = *config
            .sunrise_red_part
            .get_or_insert(DEFAULT_SUNRISE_RED_PART);
        if !(red_part > 0.0 && red_part < 1.0) {
            bail!(
                "Sunrise red part ({}) must be strictly between 0 and 1",
                red_part
            );
        }
        let sunrise_duration = *config
            .sunrise_duration
            .get_or_insert(DEFAULT_SUNRISE_DURATION);
        if !(MINIMUM_SUNRISE_DURATION..=MAXIMUM_SUNRISE_DURATION).contains(&sunrise_duration) {
            bail!(
                "Sunrise duration ({} minutes) must be between {} and {} minutes",
                sunrise_duration,
                MINIMUM_SUNRISE_DURATION,
                MAXIMUM_SUNRISE_DURATION
            );
        }
        let anticipation = *config
            .sunrise_anticipation
            .get_or_insert(DEFAULT_SUNRISE_ANTICIPATION);
        if anticipation > MAXIMUM_SUNRISE_ANTICIPATION {
            bail!(
                "Sunrise anticipation ({} minutes) must be at most {} minutes",
                anticipation,
                MAXIMUM_SUNRISE_ANTICIPATION
            );
        }

        Ok(())
    }

    /// Load from a specific path. Does NOT create a default config if the
    /// path doesn't exist.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            bail!(
                "Configuration file not found at specified path: {}",
                path.display()
            );
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        Self::load_geo_override_from_path(&mut config, path);
        Self::apply_defaults_and_validate_fields(&mut config)?;
        validate_config(&config)?;

        Ok(config)
    }

    /// Apply coordinates from a geo.toml next to `config_path`, if present.
    ///
    /// A malformed or unreadable geo.toml is reported and ignored.
    fn load_geo_override_from_path(config: &mut Config, config_path: &Path) {
        let Some(geo_path) = config_path.parent().map(|p| p.join("geo.toml")) else {
            return;
        };
        if !geo_path.exists() {
            return;
        }

        match fs::read_to_string(&geo_path) {
            Ok(content) => match toml::from_str::<GeoConfig>(&content) {
                Ok(geo_config) => {
                    if let Some(lat) = geo_config.latitude {
                        config.latitude = Some(lat);
                    }
                    if let Some(lon) = geo_config.longitude {
                        config.longitude = Some(lon);
                    }
                    Log::log_indented(&format!(
                        "Loaded geographic overrides from {}",
                        crate::utils::path_for_display(&geo_path)
                    ));
                }
                Err(e) => {
                    Log::log_warning(&format!(
                        "Failed to parse geo.toml: {}. Using coordinates from main config.",
                        e
                    ));
                }
            },
            Err(e) => {
                Log::log_warning(&format!(
                    "Failed to read geo.toml: {}. Using coordinates from main config.",
                    e
                ));
            }
        }
    }

    /// Load the configuration from its standard location, creating a default
    /// file there first if none exists.
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)
                .context("Failed to create default config during load")?;
        }

        Self::load_from_path(&config_path).with_context(|| {
            format!(
                "Failed to load configuration from {}",
                config_path.display()
            )
        })
    }

    // ═══ Domain views of the validated configuration ═══

    pub fn growth_policy(&self) -> GrowthPolicy {
        match (self.pranayama_steps, self.pranayama_max_ratio) {
            (Some(steps), _) => GrowthPolicy::FixedSteps(steps),
            (None, Some(ratio)) => GrowthPolicy::BoundedRatio(ratio),
            (None, None) => GrowthPolicy::BoundedRatio(DEFAULT_PRANAYAMA_MAX_RATIO),
        }
    }

    pub fn user_schedule(&self) -> UserSchedule {
        UserSchedule {
            sleep_duration: hours(self.sleep_duration.unwrap_or(DEFAULT_SLEEP_DURATION)),
            eating_period: hours(self.eating_period.unwrap_or(DEFAULT_EATING_PERIOD)),
            latitude: self.latitude.unwrap_or(DEFAULT_LATITUDE),
            longitude: self.longitude.unwrap_or(DEFAULT_LONGITUDE),
            sunrise_anticipation: chrono::Duration::minutes(
                self.sunrise_anticipation
                    .unwrap_or(DEFAULT_SUNRISE_ANTICIPATION) as i64,
            ),
        }
    }

    pub fn pranayama_duration(&self) -> chrono::Duration {
        chrono::Duration::minutes(
            self.pranayama_duration
                .unwrap_or(DEFAULT_PRANAYAMA_DURATION) as i64,
        )
    }

    pub fn sunrise_duration(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.sunrise_duration.unwrap_or(DEFAULT_SUNRISE_DURATION) as i64)
    }

    pub fn sunrise_kelvin(&self) -> u16 {
        self.sunrise_kelvin.unwrap_or(DEFAULT_SUNRISE_KELVIN)
    }

    pub fn sunrise_red_part(&self) -> f64 {
        self.sunrise_red_part.unwrap_or(DEFAULT_SUNRISE_RED_PART)
    }

    pub fn broadcast(&self) -> bool {
        self.broadcast.unwrap_or(DEFAULT_BROADCAST)
    }

    pub fn evening_color(&self) -> ColorState {
        self.evening_color.unwrap_or(DEFAULT_EVENING_COLOR)
    }

    /// Breathing ramp and colors of the pranayama session.
    pub fn breath_settings(&self) -> Result<BreathSettings> {
        let ramp = RampParameters::new(
            self.pranayama_base_interval
                .unwrap_or(DEFAULT_PRANAYAMA_BASE_INTERVAL)
                * 1000.0,
            self.pranayama_cap_interval
                .unwrap_or(DEFAULT_PRANAYAMA_CAP_INTERVAL)
                * 1000.0,
            self.growth_policy(),
            self.pranayama_duration().num_milliseconds() as f64,
            self.pranayama_pre_delay
                .unwrap_or(DEFAULT_PRANAYAMA_PRE_DELAY) as f64
                * 1000.0,
        )
        .context("Invalid pranayama settings")?;

        let phases = PhaseProportions::new(
            self.pranayama_inhale.unwrap_or(DEFAULT_PRANAYAMA_INHALE),
            self.pranayama_hold.unwrap_or(DEFAULT_PRANAYAMA_HOLD),
            self.pranayama_exhale.unwrap_or(DEFAULT_PRANAYAMA_EXHALE),
            self.pranayama_empty.unwrap_or(DEFAULT_PRANAYAMA_EMPTY),
        )
        .context("Invalid pranayama phases")?;

        Ok(BreathSettings {
            ramp,
            phases,
            inhale_color: self
                .pranayama_inhale_color
                .unwrap_or(DEFAULT_PRANAYAMA_INHALE_COLOR),
            exhale_color: self
                .pranayama_exhale_color
                .unwrap_or(DEFAULT_PRANAYAMA_EXHALE_COLOR),
            after_color: self
                .pranayama_after_color
                .unwrap_or(DEFAULT_PRANAYAMA_AFTER_COLOR),
        })
    }

    pub fn log_config(&self, config_path: &Path) {
        Log::log_block_start(&format!(
            "Loaded configuration from {}",
            crate::utils::path_for_display(config_path)
        ));

        let schedule = self.user_schedule();
        let lat_dir = if schedule.latitude >= 0.0 { "N" } else { "S" };
        let lon_dir = if schedule.longitude >= 0.0 { "E" } else { "W" };
        Log::log_indented(&format!(
            "Location: {:.4}°{}, {:.4}°{}",
            schedule.latitude.abs(),
            lat_dir,
            schedule.longitude.abs(),
            lon_dir
        ));
        Log::log_indented(&format!(
            "Sleep duration: {} hours",
            self.sleep_duration.unwrap_or(DEFAULT_SLEEP_DURATION)
        ));
        Log::log_indented(&format!(
            "Eating period: {} hours",
            self.eating_period.unwrap_or(DEFAULT_EATING_PERIOD)
        ));
        Log::log_indented(&format!(
            "Commands: {}",
            if self.broadcast() {
                "broadcast to all lights"
            } else {
                "discovered light only"
            }
        ));

        let growth = match self.growth_policy() {
            GrowthPolicy::FixedSteps(n) => format!("{} steps", n),
            GrowthPolicy::BoundedRatio(r) => format!("ratio at most {}", r),
        };
        Log::log_indented(&format!(
            "Pranayama: {} minutes, {:.1}s to {:.1}s breaths, {}",
            self.pranayama_duration
                .unwrap_or(DEFAULT_PRANAYAMA_DURATION),
            self.pranayama_base_interval
                .unwrap_or(DEFAULT_PRANAYAMA_BASE_INTERVAL),
            self.pranayama_cap_interval
                .unwrap_or(DEFAULT_PRANAYAMA_CAP_INTERVAL),
            growth
        ));
        Log::log_indented(&format!(
            "Sunrise: {} minutes to {}K, {} minutes before sunrise",
            self.sunrise_duration.unwrap_or(DEFAULT_SUNRISE_DURATION),
            self.sunrise_kelvin(),
            self.sunrise_anticipation
                .unwrap_or(DEFAULT_SUNRISE_ANTICIPATION)
        ));
    }
}

/// Cross-field validation of a configuration whose fields were checked.
pub fn validate_config(config: &Config) -> Result<()> {
    if config.pranayama_steps.is_some() && config.pranayama_max_ratio.is_some() {
        bail!(
            "Set either pranayama_steps or pranayama_max_ratio, not both (got {} and {})",
            config.pranayama_steps.unwrap_or_default(),
            config.pranayama_max_ratio.unwrap_or_default()
        );
    }

    // Builds the ramp and phases, which carry their own checks
    config.breath_settings()?;
    Ok(())
}

fn validate_color(name: &str, color: &ColorState) -> Result<()> {
    if !color.is_normalized() {
        bail!(
            "{}: hue, saturation and brightness must be between 0 and 1 (got {}, {}, {})",
            name,
            color.hue,
            color.saturation,
            color.brightness
        );
    }
    if !(MINIMUM_TEMP..=MAXIMUM_TEMP).contains(&color.kelvin) {
        bail!(
            "{}: temperature ({}K) must be between {} and {} Kelvin",
            name,
            color.kelvin,
            MINIMUM_TEMP,
            MAXIMUM_TEMP
        );
    }
    Ok(())
}

fn hours(value: f64) -> chrono::Duration {
    chrono::Duration::milliseconds((value * 3_600_000.0).round() as i64)
}

fn format_color(color: &ColorState) -> String {
    format!(
        "{{ hue = {:.2}, saturation = {:.2}, brightness = {:.2}, kelvin = {} }}",
        color.hue, color.saturation, color.brightness, color.kelvin
    )
}

struct ConfigBuilder {
    entries: Vec<ConfigEntry>,
}

enum ConfigEntry {
    Section(String),
    Setting { line: String, comment: String },
}

impl ConfigBuilder {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn add_section(mut self, title: &str) -> Self {
        self.entries.push(ConfigEntry::Section(format!("#[{}]", title)));
        self
    }

    fn add_setting(mut self, key: &str, value: &str, comment: &str) -> Self {
        self.entries.push(ConfigEntry::Setting {
            line: format!("{} = {}", key, value),
            comment: format!("# {}", comment),
        });
        self
    }

    fn build(self) -> String {
        // Align comments one space after the longest setting line
        let max_width = self
            .entries
            .iter()
            .filter_map(|entry| match entry {
                ConfigEntry::Setting { line, .. } => Some(line.len()),
                ConfigEntry::Section(_) => None,
            })
            .max()
            .unwrap_or(0)
            + 1;

        let mut result = Vec::new();
        let mut first_section = true;

        for entry in self.entries {
            match entry {
                ConfigEntry::Section(title) => {
                    if !first_section {
                        result.push(String::new());
                    }
                    result.push(title);
                    first_section = false;
                }
                ConfigEntry::Setting { line, comment } => {
                    let padding = " ".repeat(max_width - line.len());
                    result.push(format!("{}{}{}", line, padding, comment));
                }
            }
        }

        result.push(String::new());
        result.join("\n")
    }
}
