//! The nightly routine: anchors for the coming night and the schedule that
//! runs the light effects at them.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::time::Duration;

use crate::anchors::DailyAnchors;
use crate::config::Config;
use crate::geo::{SolarEventSource, SolarEvents};
use crate::logger::Log;
use crate::pranayama::run_pranayama;
use crate::scheduler::{MissedPolicy, Schedule};
use crate::sunrise_effect::run_sunrise;

/// Anchors derived for a process started on `today`, with the solar events
/// they came from.
#[derive(Debug, Clone)]
pub struct DayPlan {
    pub today: SolarEvents,
    pub tomorrow: SolarEvents,
    pub anchors: DailyAnchors,
}

/// Compute today's and tomorrow's solar events and the anchors from them.
///
/// Solar failures are fatal: there is no sensible fallback time to wake at.
pub fn plan_day(config: &Config, source: &dyn SolarEventSource, today: NaiveDate) -> Result<DayPlan> {
    let schedule = config.user_schedule();
    let tomorrow_date = today
        .succ_opt()
        .with_context(|| format!("No calendar day after {today}"))?;

    let today_events = source
        .events_for(today, schedule.latitude, schedule.longitude)
        .context("Failed to compute today's solar events")?;
    let tomorrow_events = source
        .events_for(tomorrow_date, schedule.latitude, schedule.longitude)
        .context("Failed to compute tomorrow's solar events")?;

    let anchors = DailyAnchors::compute(
        &today_events,
        &tomorrow_events,
        &schedule,
        config.pranayama_duration(),
        config.sunrise_duration(),
    )?;

    Ok(DayPlan {
        today: today_events,
        tomorrow: tomorrow_events,
        anchors,
    })
}

/// Schedule the evening color, the pranayama session and the sunrise.
pub fn build_schedule(config: &Config, anchors: &DailyAnchors) -> Result<Schedule<'static>> {
    let mut schedule = Schedule::new();

    let evening_color = config.evening_color();
    schedule.add(
        "Evening color",
        anchors.evening_color,
        MissedPolicy::RunImmediately,
        move |ctx| {
            Log::log_block_start("Applying evening color.");
            ctx.device
                .set_color(&evening_color, Duration::ZERO)
                .context("Failed to apply evening color")
        },
    );

    let breath = config.breath_settings()?;
    schedule.add(
        "Pranayama",
        anchors.pranayama_start,
        MissedPolicy::Skip,
        move |ctx| {
            run_pranayama(ctx, &breath);
            Ok(())
        },
    );

    let kelvin = config.sunrise_kelvin();
    let red_part = config.sunrise_red_part();
    let duration = config
        .sunrise_duration()
        .to_std()
        .context("Sunrise duration must not be negative")?;
    schedule.add("Sunrise", anchors.sunrise_start, MissedPolicy::Skip, move |ctx| {
        run_sunrise(ctx, kelvin, red_part, duration);
        Ok(())
    });

    Ok(schedule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::ScheduledEvent;
    use chrono::{DateTime, Local, TimeZone};

    struct FixedSun;

    impl SolarEventSource for FixedSun {
        fn events_for(&self, date: NaiveDate, _: f64, _: f64) -> Result<SolarEvents> {
            let at = |h, m| {
                Local
                    .from_local_datetime(&date.and_hms_opt(h, m, 0).unwrap())
                    .unwrap()
            };
            Ok(SolarEvents {
                sunrise: at(5, 0),
                sunset: at(21, 0),
                solar_noon: at(13, 0),
                golden_hour: at(20, 20),
            })
        }
    }

    fn local(day: u32, h: u32, m: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 6, day, h, m, 0).unwrap()
    }

    #[test]
    fn test_plan_day_uses_tomorrows_sunrise() {
        let plan = plan_day(
            &Config::default(),
            &FixedSun,
            NaiveDate::from_ymd_opt(2024, 6, 20).unwrap(),
        )
        .unwrap();

        assert_eq!(plan.today.sunset, local(20, 21, 0));
        assert_eq!(plan.tomorrow.sunrise, local(21, 5, 0));
        assert_eq!(plan.anchors.wake, local(21, 4, 0));
        assert_eq!(plan.anchors.sleep, local(20, 21, 0));
    }

    #[test]
    fn test_schedule_holds_three_actions() {
        let plan = plan_day(
            &Config::default(),
            &FixedSun,
            NaiveDate::from_ymd_opt(2024, 6, 20).unwrap(),
        )
        .unwrap();
        let schedule = build_schedule(&Config::default(), &plan.anchors).unwrap();

        assert_eq!(
            schedule.events(),
            vec![
                ScheduledEvent::new("Evening color", local(20, 19, 0)),
                ScheduledEvent::new("Pranayama", local(20, 20, 46)),
                ScheduledEvent::new("Sunrise", local(21, 3, 40)),
            ]
        );
    }
}
