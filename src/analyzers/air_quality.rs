use serde::Serialize;
use std::collections::BTreeMap;

use crate::analyzers::categories::ParticulateCategory;
use crate::models::{Continent, Observation};
use crate::processors::FilteredView;
use crate::utils::constants::{SCORE_WEIGHT_AQI, SCORE_WEIGHT_PM10, SCORE_WEIGHT_PM2_5};

#[derive(Debug, Default, Clone, Copy)]
struct Mean {
    sum: f64,
    count: usize,
}

impl Mean {
    fn add(&mut self, value: Option<f64>) {
        if let Some(v) = value {
            self.sum += v;
            self.count += 1;
        }
    }

    fn value(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

#[derive(Debug, Default)]
struct LocationAccumulator {
    continent: Option<Continent>,
    rows: usize,
    aqi: Mean,
    pm2_5: Mean,
    pm10: Mean,
    humidity: Mean,
    latitude: Mean,
    longitude: Mean,
}

/// Mean air-quality readings for one location.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationAirQuality {
    pub country: String,
    pub location: String,
    pub continent: Continent,
    pub observations: usize,
    pub aqi: Option<f64>,
    pub pm2_5: Option<f64>,
    pub pm10: Option<f64>,
    pub humidity: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub category: ParticulateCategory,
}

impl LocationAirQuality {
    /// `0.5 * AQI + 0.3 * PM2.5 + 0.2 * PM10`; only for ranking extremes.
    pub fn pollution_score(&self) -> Option<f64> {
        Some(
            SCORE_WEIGHT_AQI * self.aqi?
                + SCORE_WEIGHT_PM2_5 * self.pm2_5?
                + SCORE_WEIGHT_PM10 * self.pm10?,
        )
    }
}

/// Per-location table ordered by country then location, optionally limited to one category.
pub fn location_table(
    view: &FilteredView<'_>,
    category: Option<ParticulateCategory>,
) -> Vec<LocationAirQuality> {
    let mut locations: BTreeMap<(&str, &str), LocationAccumulator> = BTreeMap::new();

    for row in view.iter() {
        let acc = locations
            .entry((row.country.as_str(), row.location_name.as_str()))
            .or_default();
        accumulate(acc, row);
    }

    locations
        .into_iter()
        .map(|((country, location), acc)| {
            let pm2_5 = acc.pm2_5.value();
            let pm10 = acc.pm10.value();
            LocationAirQuality {
                country: country.to_string(),
                location: location.to_string(),
                continent: acc.continent.unwrap_or(Continent::Unknown),
                observations: acc.rows,
                aqi: acc.aqi.value(),
                pm2_5,
                pm10,
                humidity: acc.humidity.value(),
                latitude: acc.latitude.value(),
                longitude: acc.longitude.value(),
                category: ParticulateCategory::combined(pm2_5, pm10),
            }
        })
        .filter(|entry| category.map_or(true, |wanted| entry.category == wanted))
        .collect()
}

fn accumulate(acc: &mut LocationAccumulator, row: &Observation) {
    acc.continent.get_or_insert(row.continent);
    acc.rows += 1;
    acc.aqi.add(row.us_epa_index.map(f64::from));
    acc.pm2_5.add(row.pm2_5);
    acc.pm10.add(row.pm10);
    acc.humidity.add(row.humidity);
    acc.latitude.add(row.latitude);
    acc.longitude.add(row.longitude);
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredLocation {
    pub country: String,
    pub location: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PollutionExtremes {
    pub most_polluted: ScoredLocation,
    pub least_polluted: ScoredLocation,
}

/// Most and least polluted locations by composite score.
///
/// Locations missing any of AQI, PM2.5 or PM10 are not scored. Ties go to
/// the location listed first in the table.
pub fn pollution_extremes(table: &[LocationAirQuality]) -> Option<PollutionExtremes> {
    let mut scored = table
        .iter()
        .filter_map(|entry| entry.pollution_score().map(|score| (entry, score)));

    let first = scored.next()?;
    let (mut most, mut least) = (first, first);
    for candidate in scored {
        if candidate.1 > most.1 {
            most = candidate;
        }
        if candidate.1 < least.1 {
            least = candidate;
        }
    }

    let to_scored = |(entry, score): (&LocationAirQuality, f64)| ScoredLocation {
        country: entry.country.clone(),
        location: entry.location.clone(),
        score,
    };

    Some(PollutionExtremes {
        most_polluted: to_scored(most),
        least_polluted: to_scored(least),
    })
}
