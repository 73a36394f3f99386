use std::borrow::Borrow;
use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ProcessingError, Result};
use crate::geolocation::DefaultSelection;
use crate::models::{Continent, Dataset, Measure, Observation};
use crate::utils::constants::{MAX_AQI, MIN_AQI};

/// Choice at one hierarchy level: everything, or an explicit set.
///
/// `Only` with an empty set is a deliberate "nothing selected" and passes no rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Selection<T: Ord> {
    All,
    Only(BTreeSet<T>),
}

impl<T: Ord> Default for Selection<T> {
    fn default() -> Self {
        Selection::All
    }
}

impl<T: Ord> Selection<T> {
    pub fn only<I: IntoIterator<Item = T>>(items: I) -> Self {
        Selection::Only(items.into_iter().collect())
    }

    pub fn none() -> Self {
        Selection::Only(BTreeSet::new())
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }

    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        match self {
            Selection::All => true,
            Selection::Only(set) => set.contains(value),
        }
    }
}

/// Inclusive `[min, max]` bound on one measure. Null values never fall inside.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericRange {
    pub min: f64,
    pub max: f64,
}

impl NumericRange {
    pub fn new(min: f64, max: f64) -> Result<Self> {
        let range = Self { min, max };
        range.check()?;
        Ok(range)
    }

    pub fn contains(&self, value: Option<f64>) -> bool {
        matches!(value, Some(v) if v >= self.min && v <= self.max)
    }

    fn check(&self) -> Result<()> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(ProcessingError::InvalidFilter(format!(
                "range bounds must be finite, got {}..{}",
                self.min, self.max
            )));
        }
        if self.min > self.max {
            return Err(ProcessingError::InvalidFilter(format!(
                "range minimum {} exceeds maximum {}",
                self.min, self.max
            )));
        }
        Ok(())
    }
}

/// Year, month and day components of `last_updated`. An empty set does not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateFilter {
    pub years: BTreeSet<i32>,
    pub months: BTreeSet<u32>,
    pub days: BTreeSet<u32>,
}

impl DateFilter {
    pub fn is_active(&self) -> bool {
        !(self.years.is_empty() && self.months.is_empty() && self.days.is_empty())
    }

    pub fn matches(&self, timestamp: Option<NaiveDateTime>) -> bool {
        if !self.is_active() {
            return true;
        }
        match timestamp {
            Some(ts) => {
                self.matches_years(ts) && self.matches_months(ts) && component(&self.days, ts.day())
            }
            None => false,
        }
    }

    fn matches_years(&self, ts: NaiveDateTime) -> bool {
        component(&self.years, ts.year())
    }

    fn matches_months(&self, ts: NaiveDateTime) -> bool {
        component(&self.months, ts.month())
    }
}

fn component<T: Ord>(set: &BTreeSet<T>, value: T) -> bool {
    set.is_empty() || set.contains(&value)
}

/// User-chosen constraints, combined by conjunction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub continents: Selection<Continent>,
    pub countries: Selection<String>,
    pub locations: Selection<String>,
    pub ranges: BTreeMap<Measure, NumericRange>,
    pub max_aqi: Option<u8>,
    pub dates: DateFilter,
    /// Case-insensitive substring of location name or country.
    pub search: Option<String>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_continents<I: IntoIterator<Item = Continent>>(mut self, continents: I) -> Self {
        self.continents = Selection::only(continents);
        self
    }

    pub fn with_countries<I, S>(mut self, countries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.countries = Selection::only(countries.into_iter().map(Into::into));
        self
    }

    pub fn with_locations<I, S>(mut self, locations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.locations = Selection::only(locations.into_iter().map(Into::into));
        self
    }

    pub fn with_range(mut self, measure: Measure, min: f64, max: f64) -> Self {
        self.ranges.insert(measure, NumericRange { min, max });
        self
    }

    pub fn with_max_aqi(mut self, max_aqi: u8) -> Self {
        self.max_aqi = Some(max_aqi);
        self
    }

    pub fn with_search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        for (measure, range) in &self.ranges {
            range.check().map_err(|e| match e {
                ProcessingError::InvalidFilter(msg) => {
                    ProcessingError::InvalidFilter(format!("{}: {}", measure, msg))
                }
                other => other,
            })?;
        }

        if let Some(max_aqi) = self.max_aqi {
            if !(MIN_AQI..=MAX_AQI).contains(&max_aqi) {
                return Err(ProcessingError::InvalidFilter(format!(
                    "max AQI must be between {} and {}, got {}",
                    MIN_AQI, MAX_AQI, max_aqi
                )));
            }
        }

        if let Some(month) = self.dates.months.iter().find(|m| !(1..=12).contains(*m)) {
            return Err(ProcessingError::InvalidFilter(format!("invalid month {}", month)));
        }
        if let Some(day) = self.dates.days.iter().find(|d| !(1..=31).contains(*d)) {
            return Err(ProcessingError::InvalidFilter(format!("invalid day {}", day)));
        }

        Ok(())
    }

    fn passes_continent(&self, row: &Observation) -> bool {
        self.continents.contains(&row.continent)
    }

    fn passes_country(&self, row: &Observation) -> bool {
        self.countries.contains(row.country.as_str())
    }

    fn passes_location(&self, row: &Observation) -> bool {
        self.locations.contains(row.location_name.as_str())
    }

    fn passes_hierarchy(&self, row: &Observation) -> bool {
        self.passes_continent(row) && self.passes_country(row) && self.passes_location(row)
    }

    fn passes_measures(&self, row: &Observation) -> bool {
        let in_ranges = self
            .ranges
            .iter()
            .all(|(measure, range)| range.contains(measure.value(row)));

        let under_aqi = match self.max_aqi {
            Some(max) => matches!(row.us_epa_index, Some(index) if index <= i32::from(max)),
            None => true,
        };

        in_ranges && under_aqi
    }
}

/// Lower-cased search needle, `None` when the search is blank.
fn search_needle(search: Option<&str>) -> Option<String> {
    search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
}

fn matches_search(row: &Observation, needle: Option<&str>) -> bool {
    match needle {
        Some(needle) => {
            row.location_name.to_lowercase().contains(needle)
                || row.country.to_lowercase().contains(needle)
        }
        None => true,
    }
}

/// Rows of a dataset that passed a filter, borrowed in original order.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredView<'a> {
    rows: Vec<&'a Observation>,
}

impl<'a> FilteredView<'a> {
    pub fn all(dataset: &'a Dataset) -> Self {
        Self {
            rows: dataset.observations().iter().collect(),
        }
    }

    pub fn from_rows(rows: Vec<&'a Observation>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[&'a Observation] {
        &self.rows
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Observation> + '_ {
        self.rows.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows that can be placed on a map.
    pub fn with_coordinates(&self) -> FilteredView<'a> {
        FilteredView {
            rows: self.iter().filter(|o| o.has_coordinates()).collect(),
        }
    }
}

/// Result of applying a [`FilterSpec`]. Zero matches is a value, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterOutcome<'a> {
    Matched(FilteredView<'a>),
    NoMatches,
}

impl<'a> FilterOutcome<'a> {
    pub fn is_empty(&self) -> bool {
        matches!(self, FilterOutcome::NoMatches)
    }

    pub fn len(&self) -> usize {
        match self {
            FilterOutcome::Matched(view) => view.len(),
            FilterOutcome::NoMatches => 0,
        }
    }

    pub fn view(&self) -> Option<&FilteredView<'a>> {
        match self {
            FilterOutcome::Matched(view) => Some(view),
            FilterOutcome::NoMatches => None,
        }
    }

    pub fn into_view(self) -> Option<FilteredView<'a>> {
        match self {
            FilterOutcome::Matched(view) => Some(view),
            FilterOutcome::NoMatches => None,
        }
    }
}

/// Selectable values per level, each derived from rows passing only the coarser levels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CascadeOptions {
    pub continents: Vec<Continent>,
    pub countries: Vec<String>,
    pub locations: Vec<String>,
    pub years: Vec<i32>,
    pub months: Vec<u32>,
    pub days: Vec<u32>,
}

pub struct FilterEngine<'a> {
    dataset: &'a Dataset,
}

impl<'a> FilterEngine<'a> {
    pub fn new(dataset: &'a Dataset) -> Self {
        Self { dataset }
    }

    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    fn rows(&self) -> impl Iterator<Item = &'a Observation> + 'a {
        self.dataset.observations().iter()
    }

    /// Produce the subset of rows satisfying every active predicate.
    pub fn apply(&self, spec: &FilterSpec) -> Result<FilterOutcome<'a>> {
        spec.validate()?;
        let needle = search_needle(spec.search.as_deref());

        let rows: Vec<&'a Observation> = self
            .rows()
            .filter(|row| {
                spec.passes_hierarchy(row)
                    && spec.passes_measures(row)
                    && spec.dates.matches(row.last_updated)
                    && matches_search(row, needle.as_deref())
            })
            .collect();

        debug!(
            "Filter kept {} of {} rows",
            rows.len(),
            self.dataset.len()
        );

        if rows.is_empty() {
            Ok(FilterOutcome::NoMatches)
        } else {
            Ok(FilterOutcome::Matched(FilteredView { rows }))
        }
    }

    /// Options for every level given the coarser selections in `spec`.
    pub fn options(&self, spec: &FilterSpec) -> CascadeOptions {
        let continents: BTreeSet<Continent> = self.rows().map(|o| o.continent).collect();

        let countries: BTreeSet<&str> = self
            .rows()
            .filter(|o| spec.passes_continent(o))
            .map(|o| o.country.as_str())
            .collect();

        let locations: BTreeSet<&str> = self
            .rows()
            .filter(|o| spec.passes_continent(o) && spec.passes_country(o))
            .map(|o| o.location_name.as_str())
            .collect();

        let dated: Vec<NaiveDateTime> = self
            .rows()
            .filter(|o| spec.passes_hierarchy(o))
            .filter_map(|o| o.last_updated)
            .collect();

        let years: BTreeSet<i32> = dated.iter().map(|ts| ts.year()).collect();
        let months: BTreeSet<u32> = dated
            .iter()
            .filter(|ts| spec.dates.matches_years(**ts))
            .map(|ts| ts.month())
            .collect();
        let days: BTreeSet<u32> = dated
            .iter()
            .filter(|ts| spec.dates.matches_years(**ts) && spec.dates.matches_months(**ts))
            .map(|ts| ts.day())
            .collect();

        CascadeOptions {
            continents: continents.into_iter().collect(),
            countries: countries.into_iter().map(str::to_string).collect(),
            locations: locations.into_iter().map(str::to_string).collect(),
            years: years.into_iter().collect(),
            months: months.into_iter().collect(),
            days: days.into_iter().collect(),
        }
    }

    /// Min and max of the non-null values of `measure` across the whole dataset.
    pub fn observed_range(&self, measure: Measure) -> Option<NumericRange> {
        self.rows()
            .filter_map(|o| measure.value(o))
            .fold(None, |acc: Option<NumericRange>, v| match acc {
                Some(r) => Some(NumericRange {
                    min: r.min.min(v),
                    max: r.max.max(v),
                }),
                None => Some(NumericRange { min: v, max: v }),
            })
    }

    /// Narrow the continent and country levels of `spec` to a default.
    ///
    /// Levels the user already chose are left alone. A default missing from
    /// the selectable options falls back to the first option.
    pub fn with_default_selection(&self, mut spec: FilterSpec, defaults: &DefaultSelection) -> FilterSpec {
        if spec.continents.is_all() {
            let options = self.options(&spec);
            let continent = options
                .continents
                .iter()
                .find(|c| **c == defaults.continent)
                .or_else(|| options.continents.first());
            if let Some(continent) = continent {
                spec.continents = Selection::only([*continent]);
            }
        }

        if spec.countries.is_all() {
            let options = self.options(&spec);
            let country = options
                .countries
                .iter()
                .find(|c| c.eq_ignore_ascii_case(&defaults.country))
                .or_else(|| options.countries.first());
            if let Some(country) = country {
                spec.countries = Selection::only([country.clone()]);
            }
        }

        debug!(
            "Default selection continents={:?} countries={:?}",
            spec.continents, spec.countries
        );
        spec
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(year: i32, month: u32, day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn row(country: &str, location: &str, temp: Option<f64>, aqi: Option<i32>) -> Observation {
        let mut builder = Observation::builder()
            .country(country)
            .location_name(location)
            .humidity(50.0);
        if let Some(t) = temp {
            builder = builder.temperature(t);
        }
        if let Some(a) = aqi {
            builder = builder.us_epa_index(a);
        }
        builder.build().unwrap()
    }

    fn dataset() -> Dataset {
        let mut rows = vec![
            row("India", "Mumbai", Some(31.0), Some(3)),
            row("India", "Chennai", Some(33.0), Some(2)),
            row("Japan", "Tokyo", Some(21.0), Some(1)),
            row("France", "Paris", Some(18.0), Some(2)),
            row("France", "Lyon", None, None),
            row("Kenya", "Nairobi", Some(22.0), Some(4)),
            row("Atlantis", "Poseidonia", Some(25.0), Some(1)),
        ];
        rows[0].last_updated = Some(at(2024, 5, 16));
        rows[1].last_updated = Some(at(2024, 6, 1));
        rows[2].last_updated = Some(at(2023, 6, 2));
        rows[3].last_updated = Some(at(2024, 5, 17));
        rows[0].latitude = Some(19.07);
        rows[0].longitude = Some(72.87);
        Dataset::from_observations("memory", rows)
    }

    fn locations(outcome: &FilterOutcome<'_>) -> Vec<String> {
        outcome
            .view()
            .map(|v| v.iter().map(|o| o.location_name.clone()).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_default_spec_keeps_everything() {
        let data = dataset();
        let outcome = FilterEngine::new(&data).apply(&FilterSpec::default()).unwrap();
        assert_eq!(outcome.len(), data.len());
    }

    #[test]
    fn test_continent_filter() {
        let data = dataset();
        let spec = FilterSpec::new().with_continents([Continent::Asia]);
        let outcome = FilterEngine::new(&data).apply(&spec).unwrap();

        assert_eq!(locations(&outcome), vec!["Mumbai", "Chennai", "Tokyo"]);
    }

    #[test]
    fn test_empty_selection_passes_nothing() {
        let data = dataset();
        let spec = FilterSpec {
            continents: Selection::none(),
            ..FilterSpec::default()
        };
        let engine = FilterEngine::new(&data);

        assert_eq!(engine.apply(&spec).unwrap(), FilterOutcome::NoMatches);
        assert!(engine.options(&spec).countries.is_empty());
    }

    #[test]
    fn test_continent_without_rows_yields_no_matches() {
        let data = dataset();
        let spec = FilterSpec::new().with_continents([Continent::Antarctica]);
        let engine = FilterEngine::new(&data);

        let outcome = engine.apply(&spec).unwrap();
        assert!(outcome.is_empty());
        assert!(outcome.view().is_none());

        let options = engine.options(&spec);
        assert!(options.countries.is_empty());
        assert!(options.locations.is_empty());
    }

    #[test]
    fn test_range_is_inclusive_and_excludes_nulls() {
        let data = dataset();
        let engine = FilterEngine::new(&data);

        let spec = FilterSpec::new().with_range(Measure::Temperature, 18.0, 22.0);
        assert_eq!(
            locations(&engine.apply(&spec).unwrap()),
            vec!["Tokyo", "Paris", "Nairobi"]
        );

        // Even the full observed range drops the null-temperature row.
        let full = engine.observed_range(Measure::Temperature).unwrap();
        assert_eq!(full, NumericRange { min: 18.0, max: 33.0 });
        let spec = FilterSpec::new().with_range(Measure::Temperature, full.min, full.max);
        let outcome = engine.apply(&spec).unwrap();
        assert_eq!(outcome.len(), data.len() - 1);
        assert!(!locations(&outcome).contains(&"Lyon".to_string()));
    }

    #[test]
    fn test_max_aqi_excludes_nulls() {
        let data = dataset();
        let spec = FilterSpec::new().with_max_aqi(2);
        let outcome = FilterEngine::new(&data).apply(&spec).unwrap();

        assert_eq!(locations(&outcome), vec!["Chennai", "Tokyo", "Paris", "Poseidonia"]);
        for row in outcome.view().unwrap().iter() {
            assert!(row.us_epa_index.unwrap() <= 2);
        }
    }

    #[test]
    fn test_invalid_specs_rejected() {
        let data = dataset();
        let engine = FilterEngine::new(&data);

        let inverted = FilterSpec::new().with_range(Measure::Humidity, 80.0, 20.0);
        assert!(matches!(engine.apply(&inverted), Err(ProcessingError::InvalidFilter(_))));

        let nan = FilterSpec::new().with_range(Measure::Humidity, f64::NAN, 20.0);
        assert!(engine.apply(&nan).is_err());

        assert!(engine.apply(&FilterSpec::new().with_max_aqi(0)).is_err());
        assert!(engine.apply(&FilterSpec::new().with_max_aqi(7)).is_err());

        let mut bad_month = FilterSpec::new();
        bad_month.dates.months.insert(13);
        assert!(engine.apply(&bad_month).is_err());
    }

    #[test]
    fn test_cascade_options_follow_coarser_levels() {
        let data = dataset();
        let engine = FilterEngine::new(&data);

        let all = engine.options(&FilterSpec::default());
        assert_eq!(all.continents.len(), 4);
        assert!(all.continents.contains(&Continent::Unknown));

        let spec = FilterSpec::new()
            .with_continents([Continent::Asia])
            .with_countries(["India"]);
        let options = engine.options(&spec);

        // The level itself does not narrow its own options.
        assert_eq!(options.continents, all.continents);
        assert_eq!(options.countries, vec!["India", "Japan"]);
        assert_eq!(options.locations, vec!["Chennai", "Mumbai"]);
        for country in &options.countries {
            assert_eq!(data.continent_of(country), Some(Continent::Asia));
        }
    }

    #[test]
    fn test_date_options_cascade() {
        let data = dataset();
        let engine = FilterEngine::new(&data);

        let mut spec = FilterSpec::default();
        let options = engine.options(&spec);
        assert_eq!(options.years, vec![2023, 2024]);
        assert_eq!(options.months, vec![5, 6]);

        spec.dates.years.insert(2024);
        spec.dates.months.insert(5);
        let options = engine.options(&spec);
        assert_eq!(options.months, vec![5, 6]);
        assert_eq!(options.days, vec![16, 17]);

        let outcome = engine.apply(&spec).unwrap();
        assert_eq!(locations(&outcome), vec!["Mumbai", "Paris"]);
    }

    #[test]
    fn test_null_timestamp_fails_active_date_filter() {
        let data = dataset();
        let mut spec = FilterSpec::default();
        spec.dates.days.insert(2);

        let outcome = FilterEngine::new(&data).apply(&spec).unwrap();
        assert_eq!(locations(&outcome), vec!["Tokyo"]);
    }

    #[test]
    fn test_search_matches_location_or_country() {
        let data = dataset();
        let engine = FilterEngine::new(&data);

        let by_location = engine.apply(&FilterSpec::new().with_search("pari")).unwrap();
        assert_eq!(locations(&by_location), vec!["Paris"]);

        let by_country = engine.apply(&FilterSpec::new().with_search("FRANCE")).unwrap();
        assert_eq!(locations(&by_country), vec!["Paris", "Lyon"]);

        let blank = engine.apply(&FilterSpec::new().with_search("   ")).unwrap();
        assert_eq!(blank.len(), data.len());
    }

    #[test]
    fn test_every_row_satisfies_every_predicate() {
        let data = dataset();
        let spec = FilterSpec::new()
            .with_continents([Continent::Asia, Continent::Europe])
            .with_range(Measure::Temperature, 15.0, 32.0)
            .with_max_aqi(3);
        let outcome = FilterEngine::new(&data).apply(&spec).unwrap();

        for row in outcome.view().unwrap().iter() {
            assert!(spec.continents.contains(&row.continent));
            assert!(spec.ranges[&Measure::Temperature].contains(row.temperature_celsius));
            assert!(row.us_epa_index.unwrap() <= 3);
            assert!(data.observations().contains(row));
        }
    }

    #[test]
    fn test_with_coordinates_view() {
        let data = dataset();
        let view = FilteredView::all(&data);
        let mapped = view.with_coordinates();

        assert_eq!(mapped.len(), 1);
        assert_eq!(mapped.rows()[0].location_name, "Mumbai");
        assert_eq!(view.len(), data.len());
    }

    #[test]
    fn test_default_selection() {
        let data = dataset();
        let engine = FilterEngine::new(&data);

        let defaults = DefaultSelection::new("India", Continent::Asia);
        let spec = engine.with_default_selection(FilterSpec::default(), &defaults);
        assert_eq!(spec.continents, Selection::only([Continent::Asia]));
        assert_eq!(spec.countries, Selection::only(["India".to_string()]));
        assert!(spec.locations.is_all());

        // Unknown default falls back to the first option at each level.
        let defaults = DefaultSelection::new("Brazil", Continent::SouthAmerica);
        let spec = engine.with_default_selection(FilterSpec::default(), &defaults);
        assert_eq!(spec.continents, Selection::only([Continent::Africa]));
        assert_eq!(spec.countries, Selection::only(["Kenya".to_string()]));

        // Explicit choices are kept.
        let chosen = FilterSpec::new().with_continents([Continent::Europe]);
        let spec = engine.with_default_selection(chosen, &defaults);
        assert_eq!(spec.continents, Selection::only([Continent::Europe]));
        assert_eq!(spec.countries, Selection::only(["France".to_string()]));
    }
}
