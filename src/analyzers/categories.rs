use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ProcessingError;

/// US EPA air quality index category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AqiCategory {
    Good,
    Moderate,
    UnhealthyForSensitiveGroups,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
    Unknown,
}

impl AqiCategory {
    pub const ALL: [AqiCategory; 7] = [
        AqiCategory::Good,
        AqiCategory::Moderate,
        AqiCategory::UnhealthyForSensitiveGroups,
        AqiCategory::Unhealthy,
        AqiCategory::VeryUnhealthy,
        AqiCategory::Hazardous,
        AqiCategory::Unknown,
    ];

    /// Anything outside 1..=6, or a missing index, is `Unknown`.
    pub fn from_index(index: Option<i32>) -> Self {
        match index {
            Some(1) => AqiCategory::Good,
            Some(2) => AqiCategory::Moderate,
            Some(3) => AqiCategory::UnhealthyForSensitiveGroups,
            Some(4) => AqiCategory::Unhealthy,
            Some(5) => AqiCategory::VeryUnhealthy,
            Some(6) => AqiCategory::Hazardous,
            _ => AqiCategory::Unknown,
        }
    }

    pub fn index(&self) -> Option<i32> {
        match self {
            AqiCategory::Good => Some(1),
            AqiCategory::Moderate => Some(2),
            AqiCategory::UnhealthyForSensitiveGroups => Some(3),
            AqiCategory::Unhealthy => Some(4),
            AqiCategory::VeryUnhealthy => Some(5),
            AqiCategory::Hazardous => Some(6),
            AqiCategory::Unknown => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AqiCategory::Good => "Good",
            AqiCategory::Moderate => "Moderate",
            AqiCategory::UnhealthyForSensitiveGroups => "Unhealthy for Sensitive Groups",
            AqiCategory::Unhealthy => "Unhealthy",
            AqiCategory::VeryUnhealthy => "Very Unhealthy",
            AqiCategory::Hazardous => "Hazardous",
            AqiCategory::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for AqiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index() {
            Some(index) => write!(f, "{} ({})", self.label(), index),
            None => f.write_str(self.label()),
        }
    }
}

/// Particulate severity on the Indian NAQI scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ParticulateCategory {
    Good,
    Satisfactory,
    ModeratelyPolluted,
    Poor,
    VeryPoor,
    Severe,
    Unknown,
}

/// Upper edges (inclusive) of the five bounded bands; above the last is `Severe`.
const PM2_5_BANDS: [f64; 5] = [30.0, 60.0, 90.0, 120.0, 250.0];
const PM10_BANDS: [f64; 5] = [50.0, 100.0, 250.0, 350.0, 430.0];

const BANDED: [ParticulateCategory; 6] = [
    ParticulateCategory::Good,
    ParticulateCategory::Satisfactory,
    ParticulateCategory::ModeratelyPolluted,
    ParticulateCategory::Poor,
    ParticulateCategory::VeryPoor,
    ParticulateCategory::Severe,
];

fn classify(value: f64, upper_edges: &[f64; 5]) -> ParticulateCategory {
    if !value.is_finite() || value < 0.0 {
        return ParticulateCategory::Unknown;
    }
    let band = upper_edges
        .iter()
        .position(|edge| value <= *edge)
        .unwrap_or(upper_edges.len());
    BANDED[band]
}

impl ParticulateCategory {
    pub const ALL: [ParticulateCategory; 7] = [
        ParticulateCategory::Good,
        ParticulateCategory::Satisfactory,
        ParticulateCategory::ModeratelyPolluted,
        ParticulateCategory::Poor,
        ParticulateCategory::VeryPoor,
        ParticulateCategory::Severe,
        ParticulateCategory::Unknown,
    ];

    pub fn classify_pm2_5(value: f64) -> Self {
        classify(value, &PM2_5_BANDS)
    }

    pub fn classify_pm10(value: f64) -> Self {
        classify(value, &PM10_BANDS)
    }

    /// Category for a location from its mean PM2.5 and PM10.
    ///
    /// Bands are checked from mildest to most severe and the first band either
    /// pollutant falls in wins.
    pub fn combined(pm2_5: Option<f64>, pm10: Option<f64>) -> Self {
        let by_pm2_5 = pm2_5.map(Self::classify_pm2_5);
        let by_pm10 = pm10.map(Self::classify_pm10);

        [by_pm2_5, by_pm10]
            .into_iter()
            .flatten()
            .filter(|c| *c != ParticulateCategory::Unknown)
            .min()
            .unwrap_or(ParticulateCategory::Unknown)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ParticulateCategory::Good => "Good",
            ParticulateCategory::Satisfactory => "Satisfactory",
            ParticulateCategory::ModeratelyPolluted => "Moderately Polluted",
            ParticulateCategory::Poor => "Poor",
            ParticulateCategory::VeryPoor => "Very Poor",
            ParticulateCategory::Severe => "Severe",
            ParticulateCategory::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for ParticulateCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ParticulateCategory {
    type Err = ProcessingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s.chars().filter(|c| !matches!(c, ' ' | '_' | '-')).collect();
        ParticulateCategory::ALL
            .into_iter()
            .find(|c| c.label().replace(' ', "").eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| {
                ProcessingError::InvalidFilter(format!("unknown pollution category '{}'", s))
            })
    }
}

/// Coarse weather-condition family used for condition timelines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ConditionGroup {
    SunnyClear,
    PartlyCloudy,
    CloudyOvercast,
    Rainy,
    Thunderstorm,
    MistFog,
    SnowSleet,
    Other,
}

const SUNNY_CLEAR: &[&str] = &["sunny", "clear"];
const PARTLY_CLOUDY: &[&str] = &["partly cloudy", "patchy clouds"];
const CLOUDY_OVERCAST: &[&str] = &["overcast", "cloudy"];
const RAINY: &[&str] = &[
    "light rain",
    "moderate rain",
    "heavy rain",
    "drizzle",
    "patchy rain",
    "patchy light rain",
    "moderate or heavy rain shower",
];
const THUNDERSTORM: &[&str] = &[
    "thundery outbreaks possible",
    "moderate or heavy rain with thunder",
    "patchy light rain with thunder",
    "patchy light rain in area with thunder",
];
const MIST_FOG: &[&str] = &["fog", "mist", "freezing fog", "haze"];
const SNOW_SLEET: &[&str] = &[
    "moderate or heavy snow showers",
    "light sleet",
    "blizzard",
    "moderate snow",
    "light snow",
    "light sleet showers",
    "light freezing rain",
    "heavy snow",
    "blowing snow",
    "patchy heavy snow",
    "light snow showers",
    "moderate or heavy sleet",
    "patchy light snow",
    "patchy moderate snow",
    "freezing drizzle",
    "moderate or heavy snow in area with thunder",
    "patchy snow nearby",
    "patchy snow possible",
    "patchy light snow in area with thunder",
];

impl ConditionGroup {
    pub const ALL: [ConditionGroup; 8] = [
        ConditionGroup::SunnyClear,
        ConditionGroup::PartlyCloudy,
        ConditionGroup::CloudyOvercast,
        ConditionGroup::Rainy,
        ConditionGroup::Thunderstorm,
        ConditionGroup::MistFog,
        ConditionGroup::SnowSleet,
        ConditionGroup::Other,
    ];

    fn vocabulary(&self) -> &'static [&'static str] {
        match self {
            ConditionGroup::SunnyClear => SUNNY_CLEAR,
            ConditionGroup::PartlyCloudy => PARTLY_CLOUDY,
            ConditionGroup::CloudyOvercast => CLOUDY_OVERCAST,
            ConditionGroup::Rainy => RAINY,
            ConditionGroup::Thunderstorm => THUNDERSTORM,
            ConditionGroup::MistFog => MIST_FOG,
            ConditionGroup::SnowSleet => SNOW_SLEET,
            ConditionGroup::Other => &[],
        }
    }

    /// Exact, case-insensitive match of the trimmed text against each vocabulary.
    pub fn from_condition(text: Option<&str>) -> Self {
        let Some(text) = text else {
            return ConditionGroup::Other;
        };
        let wanted = text.trim().to_lowercase();
        ConditionGroup::ALL
            .into_iter()
            .find(|group| group.vocabulary().contains(&wanted.as_str()))
            .unwrap_or(ConditionGroup::Other)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ConditionGroup::SunnyClear => "Sunny/Clear",
            ConditionGroup::PartlyCloudy => "Partly Cloudy",
            ConditionGroup::CloudyOvercast => "Cloudy/Overcast",
            ConditionGroup::Rainy => "Rainy",
            ConditionGroup::Thunderstorm => "Thunderstorm",
            ConditionGroup::MistFog => "Mist/Fog",
            ConditionGroup::SnowSleet => "Snow/Sleet",
            ConditionGroup::Other => "Other",
        }
    }
}

impl fmt::Display for ConditionGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aqi_categories() {
        assert_eq!(AqiCategory::from_index(Some(1)), AqiCategory::Good);
        assert_eq!(AqiCategory::from_index(Some(3)), AqiCategory::UnhealthyForSensitiveGroups);
        assert_eq!(AqiCategory::from_index(Some(6)), AqiCategory::Hazardous);
        assert_eq!(AqiCategory::from_index(Some(0)), AqiCategory::Unknown);
        assert_eq!(AqiCategory::from_index(Some(7)), AqiCategory::Unknown);
        assert_eq!(AqiCategory::from_index(None), AqiCategory::Unknown);
        assert_eq!(AqiCategory::Moderate.to_string(), "Moderate (2)");
        assert_eq!(AqiCategory::Unknown.to_string(), "Unknown");
    }

    #[test]
    fn test_pm2_5_band_edges_are_inclusive() {
        assert_eq!(ParticulateCategory::classify_pm2_5(0.0), ParticulateCategory::Good);
        assert_eq!(ParticulateCategory::classify_pm2_5(30.0), ParticulateCategory::Good);
        assert_eq!(ParticulateCategory::classify_pm2_5(31.0), ParticulateCategory::Satisfactory);
        assert_eq!(ParticulateCategory::classify_pm2_5(30.5), ParticulateCategory::Satisfactory);
        assert_eq!(ParticulateCategory::classify_pm2_5(90.0), ParticulateCategory::ModeratelyPolluted);
        assert_eq!(ParticulateCategory::classify_pm2_5(250.0), ParticulateCategory::VeryPoor);
        assert_eq!(ParticulateCategory::classify_pm2_5(250.1), ParticulateCategory::Severe);
        assert_eq!(ParticulateCategory::classify_pm2_5(1.0e6), ParticulateCategory::Severe);
    }

    #[test]
    fn test_pm10_bands() {
        assert_eq!(ParticulateCategory::classify_pm10(50.0), ParticulateCategory::Good);
        assert_eq!(ParticulateCategory::classify_pm10(100.0), ParticulateCategory::Satisfactory);
        assert_eq!(ParticulateCategory::classify_pm10(300.0), ParticulateCategory::Poor);
        assert_eq!(ParticulateCategory::classify_pm10(431.0), ParticulateCategory::Severe);
    }

    #[test]
    fn test_invalid_particulates_are_unknown() {
        assert_eq!(ParticulateCategory::classify_pm2_5(-1.0), ParticulateCategory::Unknown);
        assert_eq!(ParticulateCategory::classify_pm10(f64::NAN), ParticulateCategory::Unknown);
        assert_eq!(ParticulateCategory::classify_pm10(f64::INFINITY), ParticulateCategory::Unknown);
    }

    #[test]
    fn test_combined_takes_first_matching_band() {
        // PM2.5 says Poor, PM10 says Good: the milder band is checked first.
        assert_eq!(
            ParticulateCategory::combined(Some(100.0), Some(20.0)),
            ParticulateCategory::Good
        );
        assert_eq!(
            ParticulateCategory::combined(Some(100.0), None),
            ParticulateCategory::Poor
        );
        assert_eq!(
            ParticulateCategory::combined(Some(-5.0), Some(500.0)),
            ParticulateCategory::Severe
        );
        assert_eq!(ParticulateCategory::combined(None, None), ParticulateCategory::Unknown);
    }

    #[test]
    fn test_particulate_category_parse() {
        assert_eq!(
            "moderately polluted".parse::<ParticulateCategory>().unwrap(),
            ParticulateCategory::ModeratelyPolluted
        );
        assert_eq!(
            "very-poor".parse::<ParticulateCategory>().unwrap(),
            ParticulateCategory::VeryPoor
        );
        assert!("terrible".parse::<ParticulateCategory>().is_err());
    }

    #[test]
    fn test_condition_groups() {
        assert_eq!(ConditionGroup::from_condition(Some("Sunny")), ConditionGroup::SunnyClear);
        assert_eq!(ConditionGroup::from_condition(Some("Partly cloudy ")), ConditionGroup::PartlyCloudy);
        assert_eq!(ConditionGroup::from_condition(Some("Light rain")), ConditionGroup::Rainy);
        assert_eq!(
            ConditionGroup::from_condition(Some("Moderate or heavy rain with thunder")),
            ConditionGroup::Thunderstorm
        );
        assert_eq!(ConditionGroup::from_condition(Some("Haze")), ConditionGroup::MistFog);
        assert_eq!(ConditionGroup::from_condition(Some("Blizzard")), ConditionGroup::SnowSleet);
        assert_eq!(ConditionGroup::from_condition(Some("Light rain shower")), ConditionGroup::Other);
        assert_eq!(ConditionGroup::from_condition(None), ConditionGroup::Other);
    }
}
