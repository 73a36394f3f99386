use chrono::NaiveTime;
use serde::Serialize;

use crate::models::Observation;
use crate::utils::timestamp::parse_time_of_day;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SunPosition {
    pub sunrise: NaiveTime,
    pub sunset: NaiveTime,
    pub is_day: bool,
    /// Fraction of daylight elapsed, 0 before sunrise and 1 after sunset.
    pub progress: f64,
}

/// Where the sun is at the row's own `last_updated` time.
///
/// Sunrise, sunset and the timestamp are all local times of the location.
pub fn sun_position(row: &Observation) -> Option<SunPosition> {
    let at = row.last_updated?.time();
    let sunrise = parse_time_of_day(row.sunrise.as_deref()?)?;
    let sunset = parse_time_of_day(row.sunset.as_deref()?)?;

    let is_day = at >= sunrise && at <= sunset;
    let total = (sunset - sunrise).num_seconds();
    let progress = if total <= 0 {
        0.0
    } else {
        let elapsed = (at - sunrise).num_seconds() as f64;
        (elapsed / total as f64).clamp(0.0, 1.0)
    };

    Some(SunPosition {
        sunrise,
        sunset,
        is_day,
        progress,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MoonIllumination {
    pub illuminated: f64,
    pub dark: f64,
}

/// Illuminated and dark share of the moon in percent; missing data counts as fully dark.
pub fn moon_illumination(row: &Observation) -> MoonIllumination {
    let illuminated = row.moon_illumination.unwrap_or(0.0).clamp(0.0, 100.0);
    MoonIllumination {
        illuminated,
        dark: 100.0 - illuminated,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MoonTimes {
    pub moonrise: Option<NaiveTime>,
    pub moonset: Option<NaiveTime>,
}

pub fn moon_times(row: &Observation) -> MoonTimes {
    MoonTimes {
        moonrise: row.moonrise.as_deref().and_then(parse_time_of_day),
        moonset: row.moonset.as_deref().and_then(parse_time_of_day),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row_at(hour: u32, minute: u32) -> Observation {
        Observation::builder()
            .country("Greece")
            .location_name("Athens")
            .last_updated(
                NaiveDate::from_ymd_opt(2024, 6, 21)
                    .unwrap()
                    .and_hms_opt(hour, minute, 0)
                    .unwrap(),
            )
            .sun("06:00 AM", "06:00 PM")
            .moon("10:15 PM", "No moonset")
            .moon_illumination(37.0)
            .build()
            .unwrap()
    }

    #[test]
    fn test_sun_progress_during_day() {
        let position = sun_position(&row_at(12, 0)).unwrap();
        assert!(position.is_day);
        assert!((position.progress - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_sun_progress_at_night() {
        let before = sun_position(&row_at(4, 30)).unwrap();
        assert!(!before.is_day);
        assert_eq!(before.progress, 0.0);

        let after = sun_position(&row_at(22, 0)).unwrap();
        assert!(!after.is_day);
        assert_eq!(after.progress, 1.0);
    }

    #[test]
    fn test_sun_position_needs_all_inputs() {
        let row = Observation::builder()
            .country("Greece")
            .location_name("Athens")
            .sun("06:00 AM", "06:00 PM")
            .build()
            .unwrap();
        assert!(sun_position(&row).is_none());
    }

    #[test]
    fn test_moon() {
        let row = row_at(12, 0);
        assert_eq!(
            moon_illumination(&row),
            MoonIllumination { illuminated: 37.0, dark: 63.0 }
        );

        let times = moon_times(&row);
        assert!(times.moonrise.is_some());
        assert!(times.moonset.is_none());

        let dark = Observation::builder()
            .country("Greece")
            .location_name("Athens")
            .build()
            .unwrap();
        assert_eq!(moon_illumination(&dark).dark, 100.0);
    }
}
