//! Solar event calculations for the configured location.
//!
//! Sunrise, sunset and civil dusk come from the `sunrise` crate. Solar noon is
//! taken as the midpoint between sunrise and sunset, and the start of the
//! evening golden hour mirrors civil twilight across sunset: it begins as long
//! before sunset as civil dusk falls after it.

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Local, NaiveDate, Utc};
use sunrise::{Coordinates, DawnType, SolarDay, SolarEvent};

/// Solar events of one calendar date, as absolute local instants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolarEvents {
    pub sunrise: DateTime<Local>,
    pub sunset: DateTime<Local>,
    pub solar_noon: DateTime<Local>,
    pub golden_hour: DateTime<Local>,
}

/// Anything able to produce the solar events of a date at a location.
///
/// The daemon uses [`SunriseCalculator`]; tests substitute fixed events.
pub trait SolarEventSource {
    fn events_for(&self, date: NaiveDate, latitude: f64, longitude: f64) -> Result<SolarEvents>;
}

/// Solar events computed with the `sunrise` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct SunriseCalculator;

impl SolarEventSource for SunriseCalculator {
    fn events_for(&self, date: NaiveDate, latitude: f64, longitude: f64) -> Result<SolarEvents> {
        if !(-90.0..=90.0).contains(&latitude) {
            bail!("Invalid latitude: {latitude}. Must be between -90 and 90 degrees");
        }
        if !(-180.0..=180.0).contains(&longitude) {
            bail!("Invalid longitude: {longitude}. Must be between -180 and 180 degrees");
        }

        let coord = Coordinates::new(latitude, longitude).with_context(|| {
            format!("Failed to create coordinates for {latitude:.4}°, {longitude:.4}°")
        })?;
        let solar_day = SolarDay::new(coord, date);

        let sunrise = solar_day.event_time(SolarEvent::Sunrise);
        let sunset = solar_day.event_time(SolarEvent::Sunset);
        let civil_dusk = solar_day.event_time(SolarEvent::Dusk(DawnType::Civil));

        validate_solar_day(date, sunrise, sunset, civil_dusk).with_context(|| {
            format!("No usable sunrise/sunset on {date} at {latitude:.4}°, {longitude:.4}°")
        })?;

        let solar_noon = sunrise + (sunset - sunrise) / 2;
        let golden_hour = sunset - (civil_dusk - sunset);

        Ok(SolarEvents {
            sunrise: sunrise.with_timezone(&Local),
            sunset: sunset.with_timezone(&Local),
            solar_noon: solar_noon.with_timezone(&Local),
            golden_hour: golden_hour.with_timezone(&Local),
        })
    }
}

/// Reject solar output that cannot describe a normal day.
///
/// Polar days and nights make the underlying equations degenerate; the events
/// then land far from the requested date or in the wrong order.
fn validate_solar_day(
    date: NaiveDate,
    sunrise: DateTime<Utc>,
    sunset: DateTime<Utc>,
    civil_dusk: DateTime<Utc>,
) -> Result<()> {
    for (name, event) in [("sunrise", sunrise), ("sunset", sunset)] {
        let offset_days = (event.date_naive() - date).num_days();
        if offset_days.abs() > 1 {
            bail!("Calculated {name} ({event}) is outside the requested date {date}");
        }
    }
    if sunrise >= sunset {
        bail!("Calculated sunrise ({sunrise}) is not before sunset ({sunset})");
    }
    if sunset - sunrise >= chrono::Duration::hours(24) {
        bail!("Calculated day length exceeds 24 hours");
    }
    if civil_dusk <= sunset {
        bail!("Calculated civil dusk ({civil_dusk}) is not after sunset ({sunset})");
    }
    Ok(())
}
