//! Daily anchor times derived from solar events.
//!
//! Waking follows tomorrow's sunrise (minus an anticipation), but never later
//! than 06:00. Everything else hangs off the wake time: sleep before it, meals
//! after it, and the effect start times before the moments they lead up to.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Local, TimeZone};

use crate::constants::{
    CIVIL_WAKE_LIMIT_HOURS, EVENING_COLOR_LEAD_HOURS, FIRST_MEAL_DELAY_HOURS, MEAL_SPACING_HOURS,
    SHOWER_LEAD_HOURS,
};
use crate::geo::SolarEvents;
use crate::scheduler::ScheduledEvent;

/// The user's daily rhythm.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UserSchedule {
    pub sleep_duration: Duration,
    /// Time from the first to the last meal.
    pub eating_period: Duration,
    pub latitude: f64,
    pub longitude: f64,
    /// How long before astronomical sunrise to wake up.
    pub sunrise_anticipation: Duration,
}

/// Every instant of the routine for the coming night and day.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyAnchors {
    pub shower: DateTime<Local>,
    pub evening_color: DateTime<Local>,
    pub pranayama_start: DateTime<Local>,
    pub sleep: DateTime<Local>,
    pub sunrise_start: DateTime<Local>,
    pub wake: DateTime<Local>,
    pub meals: [DateTime<Local>; 4],
    /// Raw solar events, carried for the timeline only.
    pub sunset_today: DateTime<Local>,
    pub sunrise_tomorrow: DateTime<Local>,
    pub solar_noon_tomorrow: DateTime<Local>,
    pub golden_hour_tomorrow: DateTime<Local>,
}

impl DailyAnchors {
    /// Derive the anchors from today's and tomorrow's solar events.
    pub fn compute(
        today: &SolarEvents,
        tomorrow: &SolarEvents,
        schedule: &UserSchedule,
        pranayama_duration: Duration,
        sunrise_duration: Duration,
    ) -> Result<Self> {
        let wake = wake_time(tomorrow.sunrise, schedule.sunrise_anticipation)?;
        let sleep = wake - schedule.sleep_duration;

        let (a, b) = meal_spacing(schedule.eating_period);
        let meal0 = wake + Duration::hours(FIRST_MEAL_DELAY_HOURS);
        let meal1 = meal0 + a;
        let meal2 = meal1 + b;
        let meal3 = meal0 + schedule.eating_period;

        Ok(Self {
            shower: sleep - Duration::hours(SHOWER_LEAD_HOURS),
            evening_color: sleep - Duration::hours(EVENING_COLOR_LEAD_HOURS),
            pranayama_start: sleep - pranayama_duration,
            sleep,
            sunrise_start: wake - sunrise_duration,
            wake,
            meals: [meal0, meal1, meal2, meal3],
            sunset_today: today.sunset,
            sunrise_tomorrow: tomorrow.sunrise,
            solar_noon_tomorrow: tomorrow.solar_noon,
            golden_hour_tomorrow: tomorrow.golden_hour,
        })
    }

    /// Labelled instants for the human-readable timeline, unsorted.
    pub fn timeline(&self) -> Vec<ScheduledEvent> {
        let mut events = vec![
            ScheduledEvent::new("Shower", self.shower),
            ScheduledEvent::new("Pranayama", self.pranayama_start),
            ScheduledEvent::new("Sleep", self.sleep),
            ScheduledEvent::new("Wake", self.wake),
        ];
        events.extend(
            self.meals
                .iter()
                .enumerate()
                .map(|(i, at)| ScheduledEvent::new(format!("Meal {i}"), *at)),
        );
        events.extend([
            ScheduledEvent::new("Sunset", self.sunset_today),
            ScheduledEvent::new("Sunrise", self.sunrise_tomorrow),
            ScheduledEvent::new("Solar noon", self.solar_noon_tomorrow),
            ScheduledEvent::new("Golden hour", self.golden_hour_tomorrow),
        ]);
        events
    }
}

/// Wake time for a given sunrise: `anticipation` before it, at the latest
/// 06:00 on the sunrise's calendar day.
pub fn wake_time(sunrise: DateTime<Local>, anticipation: Duration) -> Result<DateTime<Local>> {
    let midnight = sunrise
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .context("Failed to build local midnight")?;
    // DST changes at midnight make it ambiguous or missing in a few zones
    let midnight = Local
        .from_local_datetime(&midnight)
        .earliest()
        .with_context(|| format!("Local midnight of {} does not exist", sunrise.date_naive()))?;

    let civil_limit = midnight + Duration::hours(CIVIL_WAKE_LIMIT_HOURS);
    Ok((sunrise - anticipation).min(civil_limit))
}

/// Gaps between the first three meals.
///
/// The first gap is fixed; the second solves the spacing so that the gaps grow
/// across the eating window: `b = (sqrt(a(4E - 3a)) - a) / 2`.
pub fn meal_spacing(eating_period: Duration) -> (Duration, Duration) {
    let a_ms = MEAL_SPACING_HOURS * 3_600_000.0;
    let e_ms = eating_period.num_milliseconds() as f64;

    let b_ms = ((a_ms * (4.0 * e_ms - 3.0 * a_ms)).sqrt() - a_ms) / 2.0;
    let b_ms = if b_ms.is_finite() { b_ms.max(0.0) } else { 0.0 };

    (
        Duration::milliseconds(a_ms.round() as i64),
        Duration::milliseconds(b_ms.round() as i64),
    )
}
