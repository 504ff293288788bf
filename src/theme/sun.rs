//! Approximate sunrise/sunset window.
//!
//! Not solar astronomy: sunrise sits at 06:00 and sunset at 18:00, each
//! shifted by up to two hours along a yearly sinusoid,
//! `s = sin(day_of_year / 365 * 2pi)`, sunrise = 06:00 - 2h*s,
//! sunset = 18:00 + 2h*s. Latitude is ignored.

use std::f64::consts::TAU;

use serde::Serialize;
use time::{Date, Duration, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};

use super::ResolvedTheme;

const BASE_SUNRISE_MINUTES: f64 = 6.0 * 60.0;
const BASE_SUNSET_MINUTES: f64 = 18.0 * 60.0;
const SEASONAL_SWING_MINUTES: f64 = 120.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SunWindow {
    #[serde(with = "time::serde::rfc3339")]
    pub sunrise: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub sunset: OffsetDateTime,
}

impl SunWindow {
    /// Seasonal window for `date` on a clock at `offset`.
    #[must_use]
    pub fn seasonal(date: Date, offset: UtcOffset) -> Self {
        let s = seasonal_factor(date.ordinal());
        let sunrise = whole_minutes(BASE_SUNRISE_MINUTES - SEASONAL_SWING_MINUTES * s);
        let sunset = whole_minutes(BASE_SUNSET_MINUTES + SEASONAL_SWING_MINUTES * s);
        Self { sunrise: at_minutes(date, offset, sunrise), sunset: at_minutes(date, offset, sunset) }
    }

    /// Fixed 06:00–18:00 window, used when geolocation is unavailable.
    #[must_use]
    pub fn fixed(date: Date, offset: UtcOffset) -> Self {
        Self { sunrise: at_minutes(date, offset, 6 * 60), sunset: at_minutes(date, offset, 18 * 60) }
    }

    /// Inclusive at both ends.
    #[must_use]
    pub fn contains(&self, now: OffsetDateTime) -> bool {
        self.sunrise <= now && now <= self.sunset
    }

    #[must_use]
    pub fn resolve(&self, now: OffsetDateTime) -> ResolvedTheme {
        if self.contains(now) { ResolvedTheme::Day } else { ResolvedTheme::Night }
    }
}

fn seasonal_factor(day_of_year: u16) -> f64 {
    (f64::from(day_of_year) / 365.0 * TAU).sin()
}

// Inputs are bounded to 240..=1200 minutes.
#[allow(clippy::cast_possible_truncation)]
fn whole_minutes(minutes: f64) -> i64 {
    minutes.round() as i64
}

fn at_minutes(date: Date, offset: UtcOffset, minutes: i64) -> OffsetDateTime {
    let time = Time::MIDNIGHT + Duration::minutes(minutes);
    PrimitiveDateTime::new(date, time).assume_offset(offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime, offset};

    #[test]
    fn fixed_window_boundaries() {
        let window = SunWindow::fixed(date!(2024 - 03 - 10), UtcOffset::UTC);
        assert_eq!(window.resolve(datetime!(2024-03-10 17:59 UTC)), ResolvedTheme::Day);
        assert_eq!(window.resolve(datetime!(2024-03-10 18:01 UTC)), ResolvedTheme::Night);
        assert_eq!(window.resolve(datetime!(2024-03-10 05:59 UTC)), ResolvedTheme::Night);
        assert_eq!(window.resolve(datetime!(2024-03-10 06:00 UTC)), ResolvedTheme::Day);
        assert_eq!(window.resolve(datetime!(2024-03-10 18:00 UTC)), ResolvedTheme::Day);
    }

    #[test]
    fn fixed_window_respects_offset() {
        let window = SunWindow::fixed(date!(2024 - 03 - 10), offset!(+1));
        // 17:30 UTC is 18:30 local.
        assert_eq!(window.resolve(datetime!(2024-03-10 17:30 UTC)), ResolvedTheme::Night);
        assert_eq!(window.resolve(datetime!(2024-03-10 16:30 UTC)), ResolvedTheme::Day);
    }

    #[test]
    fn seasonal_window_peaks_near_day_91() {
        // sin(91/365 * 2pi) is ~1: longest window.
        let window = SunWindow::seasonal(date!(2024 - 03 - 31), UtcOffset::UTC);
        assert_eq!(window.sunrise.time(), Time::from_hms(4, 0, 0).unwrap());
        assert_eq!(window.sunset.time(), Time::from_hms(20, 0, 0).unwrap());
    }

    #[test]
    fn seasonal_window_troughs_near_day_274() {
        let window = SunWindow::seasonal(date!(2024 - 09 - 30), UtcOffset::UTC);
        assert_eq!(window.sunrise.time(), Time::from_hms(8, 0, 0).unwrap());
        assert_eq!(window.sunset.time(), Time::from_hms(16, 0, 0).unwrap());
    }

    #[test]
    fn seasonal_window_stays_within_two_hours_all_year() {
        let mut day = date!(2023 - 01 - 01);
        while day.year() == 2023 {
            let window = SunWindow::seasonal(day, UtcOffset::UTC);
            let rise = window.sunrise.time();
            let set = window.sunset.time();
            assert!(rise >= Time::from_hms(4, 0, 0).unwrap() && rise <= Time::from_hms(8, 0, 0).unwrap());
            assert!(set >= Time::from_hms(16, 0, 0).unwrap() && set <= Time::from_hms(20, 0, 0).unwrap());
            assert!(window.sunrise < window.sunset);
            assert_eq!(window.sunrise.date(), day);
            day = day.next_day().unwrap();
        }
    }
}
