use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::models::{Continent, Observation};

/// The loaded snapshot. Immutable after construction; every filter produces a
/// borrowed view instead of touching the rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    source: PathBuf,
    observations: Vec<Observation>,
    synthesized_columns: Vec<String>,
    skipped_records: usize,
}

impl Dataset {
    pub fn new(
        source: impl Into<PathBuf>,
        observations: Vec<Observation>,
        synthesized_columns: Vec<String>,
        skipped_records: usize,
    ) -> Self {
        Self {
            source: source.into(),
            observations,
            synthesized_columns,
            skipped_records,
        }
    }

    pub fn from_observations(source: impl Into<PathBuf>, observations: Vec<Observation>) -> Self {
        Self::new(source, observations, Vec::new(), 0)
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Optional columns that were absent from the source and filled with nulls.
    pub fn synthesized_columns(&self) -> &[String] {
        &self.synthesized_columns
    }

    pub fn has_column(&self, column: &str) -> bool {
        !self.synthesized_columns.iter().any(|c| c == column)
    }

    /// Records the reader could not parse at all and dropped.
    pub fn skipped_records(&self) -> usize {
        self.skipped_records
    }

    pub fn countries(&self) -> BTreeSet<&str> {
        self.observations.iter().map(|o| o.country.as_str()).collect()
    }

    pub fn continents(&self) -> BTreeSet<Continent> {
        self.observations.iter().map(|o| o.continent).collect()
    }

    pub fn continent_of(&self, country: &str) -> Option<Continent> {
        self.observations
            .iter()
            .find(|o| o.country == country)
            .map(|o| o.continent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observation(country: &str, location: &str) -> Observation {
        Observation::builder()
            .country(country)
            .location_name(location)
            .build()
            .unwrap()
    }

    #[test]
    fn test_dataset_distinct_values() {
        let dataset = Dataset::from_observations(
            "memory",
            vec![
                observation("India", "Mumbai"),
                observation("India", "Chennai"),
                observation("Kenya", "Nairobi"),
            ],
        );

        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.countries().into_iter().collect::<Vec<_>>(), vec!["India", "Kenya"]);
        assert_eq!(
            dataset.continents().into_iter().collect::<Vec<_>>(),
            vec![Continent::Africa, Continent::Asia]
        );
        assert_eq!(dataset.continent_of("Kenya"), Some(Continent::Africa));
        assert_eq!(dataset.continent_of("Peru"), None);
    }

    #[test]
    fn test_synthesized_columns_reported() {
        let dataset = Dataset::new("memory", Vec::new(), vec!["uv_index".to_string()], 2);

        assert!(dataset.is_empty());
        assert!(!dataset.has_column("uv_index"));
        assert!(dataset.has_column("humidity"));
        assert_eq!(dataset.skipped_records(), 2);
    }
}
