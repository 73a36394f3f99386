use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::HashSet;

use crate::analyzers::ranking::{top_n, Direction};
use crate::analyzers::statistics::describe;
use crate::models::{Measure, Observation};
use crate::processors::FilteredView;

const NO_DATA: &str = "No valid measurements";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Extreme {
    pub value: f64,
    pub location: String,
    pub country: String,
}

impl Extreme {
    fn of(row: &Observation, measure: Measure) -> Option<Self> {
        Some(Self {
            value: measure.value(row)?,
            location: row.location_name.clone(),
            country: row.country.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeographicBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

/// Headline figures for a filtered view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherSummary {
    pub total_records: usize,
    pub unique_countries: usize,
    pub unique_locations: usize,
    pub date_range: Option<(NaiveDateTime, NaiveDateTime)>,
    pub mean_temperature: Option<f64>,
    pub mean_feels_like_delta: Option<f64>,
    pub hottest: Option<Extreme>,
    pub coldest: Option<Extreme>,
    pub max_wind: Option<Extreme>,
    pub mean_wind: Option<f64>,
    pub mean_humidity: Option<f64>,
    pub total_precipitation: Option<f64>,
    pub mean_aqi: Option<f64>,
    pub geographic_bounds: Option<GeographicBounds>,
}

pub struct WeatherAnalyzer;

impl WeatherAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// `None` for an empty view; there is nothing to summarize.
    pub fn summarize(&self, view: &FilteredView<'_>) -> Option<WeatherSummary> {
        if view.is_empty() {
            return None;
        }

        let unique_countries: HashSet<&str> = view.iter().map(|o| o.country.as_str()).collect();
        let unique_locations: HashSet<(&str, &str)> = view
            .iter()
            .map(|o| (o.country.as_str(), o.location_name.as_str()))
            .collect();

        let timestamps = view.iter().filter_map(|o| o.last_updated);
        let date_range = timestamps.fold(None, |range: Option<(NaiveDateTime, NaiveDateTime)>, ts| {
            Some(match range {
                Some((min, max)) => (min.min(ts), max.max(ts)),
                None => (ts, ts),
            })
        });

        let deltas: Vec<f64> = view.iter().filter_map(|o| o.feels_like_delta()).collect();
        let mean_feels_like_delta =
            (!deltas.is_empty()).then(|| deltas.iter().sum::<f64>() / deltas.len() as f64);

        let extreme = |measure: Measure, direction: Direction| {
            top_n(view, measure, 1, direction)
                .first()
                .and_then(|row| Extreme::of(row, measure))
        };
        let mean = |measure: Measure| describe(view, measure).map(|s| s.mean);

        let total_precipitation = describe(view, Measure::PrecipMm).map(|s| s.mean * s.count as f64);

        Some(WeatherSummary {
            total_records: view.len(),
            unique_countries: unique_countries.len(),
            unique_locations: unique_locations.len(),
            date_range,
            mean_temperature: mean(Measure::Temperature),
            mean_feels_like_delta,
            hottest: extreme(Measure::Temperature, Direction::Largest),
            coldest: extreme(Measure::Temperature, Direction::Smallest),
            max_wind: extreme(Measure::WindMph, Direction::Largest),
            mean_wind: mean(Measure::WindMph),
            mean_humidity: mean(Measure::Humidity),
            total_precipitation,
            mean_aqi: mean(Measure::UsEpaIndex),
            geographic_bounds: geographic_bounds(view),
        })
    }
}

impl Default for WeatherAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

fn geographic_bounds(view: &FilteredView<'_>) -> Option<GeographicBounds> {
    view.iter()
        .filter_map(|o| o.coordinates())
        .fold(None, |bounds, (lat, lon)| {
            Some(match bounds {
                Some(GeographicBounds {
                    min_lat,
                    max_lat,
                    min_lon,
                    max_lon,
                }) => GeographicBounds {
                    min_lat: min_lat.min(lat),
                    max_lat: max_lat.max(lat),
                    min_lon: min_lon.min(lon),
                    max_lon: max_lon.max(lon),
                },
                None => GeographicBounds {
                    min_lat: lat,
                    max_lat: lat,
                    min_lon: lon,
                    max_lon: lon,
                },
            })
        })
}

fn or_no_data(value: Option<f64>, units: &str) -> String {
    match value {
        Some(v) => format!("{:.1}{}", v, units),
        None => NO_DATA.to_string(),
    }
}

fn describe_extreme(extreme: &Option<Extreme>, units: &str) -> String {
    match extreme {
        Some(e) => format!("{:.1}{} at {} ({})", e.value, units, e.location, e.country),
        None => NO_DATA.to_string(),
    }
}

impl WeatherSummary {
    pub fn summary(&self) -> String {
        let date_range = match self.date_range {
            Some((first, last)) => format!("{} to {}", first, last),
            None => "No timestamps".to_string(),
        };

        format!(
            "Records: {} total\n\
            Countries: {}\n\
            Locations: {}\n\
            Last Updated: {}\n\
            Average Temperature: {}\n\
            Average Humidity: {}\n\
            Average AQI (US EPA): {}",
            self.total_records,
            self.unique_countries,
            self.unique_locations,
            date_range,
            or_no_data(self.mean_temperature, "°C"),
            or_no_data(self.mean_humidity, "%"),
            or_no_data(self.mean_aqi, ""),
        )
    }

    pub fn detailed_summary(&self) -> String {
        let coverage = match &self.geographic_bounds {
            Some(b) => format!(
                "{:.1}° to {:.1}° lat, {:.1}° to {:.1}° lon",
                b.min_lat, b.max_lat, b.min_lon, b.max_lon
            ),
            None => "No coordinates".to_string(),
        };

        format!(
            "{}\n\n\
            Extremes:\n\
            - Hottest: {}\n\
            - Coldest: {}\n\
            - Windiest: {}\n\n\
            Conditions:\n\
            - Feels-like difference: {}\n\
            - Average wind: {}\n\
            - Total precipitation: {}\n\
            - Coverage: {}",
            self.summary(),
            describe_extreme(&self.hottest, "°C"),
            describe_extreme(&self.coldest, "°C"),
            describe_extreme(&self.max_wind, " mph"),
            or_no_data(self.mean_feels_like_delta, "°C"),
            or_no_data(self.mean_wind, " mph"),
            or_no_data(self.total_precipitation, " mm"),
            coverage,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Dataset;

    fn dataset() -> Dataset {
        Dataset::from_observations(
            "memory",
            vec![
                Observation::builder()
                    .country("India")
                    .location_name("Chennai")
                    .coordinates(13.08, 80.27)
                    .temperature(34.0)
                    .feels_like(38.0)
                    .wind_mph(11.0)
                    .humidity(70.0)
                    .precip_mm(1.2)
                    .us_epa_index(2)
                    .build()
                    .unwrap(),
                Observation::builder()
                    .country("Iceland")
                    .location_name("Reykjavik")
                    .coordinates(64.15, -21.94)
                    .temperature(6.0)
                    .feels_like(2.0)
                    .wind_mph(19.0)
                    .humidity(80.0)
                    .precip_mm(0.8)
                    .us_epa_index(1)
                    .build()
                    .unwrap(),
            ],
        )
    }

    #[test]
    fn test_summarize() {
        let data = dataset();
        let summary = WeatherAnalyzer::new().summarize(&FilteredView::all(&data)).unwrap();

        assert_eq!(summary.total_records, 2);
        assert_eq!(summary.unique_countries, 2);
        assert_eq!(summary.mean_temperature, Some(20.0));
        assert_eq!(summary.mean_feels_like_delta, Some(0.0));
        assert_eq!(summary.hottest.as_ref().unwrap().location, "Chennai");
        assert_eq!(summary.coldest.as_ref().unwrap().location, "Reykjavik");
        assert_eq!(summary.max_wind.as_ref().unwrap().value, 19.0);
        assert!((summary.total_precipitation.unwrap() - 2.0).abs() < 1e-9);
        assert_eq!(summary.mean_aqi, Some(1.5));
        assert!(summary.date_range.is_none());

        let bounds = summary.geographic_bounds.as_ref().unwrap();
        assert_eq!(bounds.min_lat, 13.08);
        assert_eq!(bounds.max_lon, 80.27);
    }

    #[test]
    fn test_empty_view_has_no_summary() {
        let view = FilteredView::from_rows(Vec::new());
        assert!(WeatherAnalyzer::new().summarize(&view).is_none());
    }

    #[test]
    fn test_summary_text() {
        let data = dataset();
        let summary = WeatherAnalyzer::new().summarize(&FilteredView::all(&data)).unwrap();

        let text = summary.detailed_summary();
        assert!(text.contains("Records: 2 total"));
        assert!(text.contains("Hottest: 34.0°C at Chennai (India)"));
        assert!(text.contains("Last Updated: No timestamps"));
    }
}
