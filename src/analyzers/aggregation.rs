use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use crate::analyzers::categories::{AqiCategory, ConditionGroup};
use crate::error::ProcessingError;
use crate::models::{Aggregation, Measure, Observation};
use crate::processors::FilteredView;

/// Attribute rows are grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum GroupKey {
    Continent,
    Country,
    Location,
    AqiCategory,
    Condition,
    ConditionGroup,
    MoonPhase,
}

impl GroupKey {
    /// Group label for a row; `None` when the attribute is missing.
    ///
    /// AQI categories and condition groups are total, so they never skip a row.
    pub fn label(&self, row: &Observation) -> Option<String> {
        match self {
            GroupKey::Continent => Some(row.continent.to_string()),
            GroupKey::Country => Some(row.country.clone()),
            GroupKey::Location => Some(row.location_name.clone()),
            GroupKey::AqiCategory => Some(AqiCategory::from_index(row.us_epa_index).to_string()),
            GroupKey::Condition => row.condition_text.as_deref().map(|c| c.trim().to_string()),
            GroupKey::ConditionGroup => Some(
                ConditionGroup::from_condition(row.condition_text.as_deref()).to_string(),
            ),
            GroupKey::MoonPhase => row.moon_phase.clone(),
        }
    }
}

impl FromStr for GroupKey {
    type Err = ProcessingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "continent" => Ok(GroupKey::Continent),
            "country" => Ok(GroupKey::Country),
            "location" | "location-name" => Ok(GroupKey::Location),
            "aqi-category" | "aqi" => Ok(GroupKey::AqiCategory),
            "condition" | "condition-text" => Ok(GroupKey::Condition),
            "condition-group" => Ok(GroupKey::ConditionGroup),
            "moon-phase" => Ok(GroupKey::MoonPhase),
            _ => Err(ProcessingError::UnknownGroupKey(s.to_string())),
        }
    }
}

/// Calendar bucket paired with a group key for time series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeBucket {
    Day,
    Month,
    Year,
}

impl TimeBucket {
    /// Rows without a timestamp have no bucket.
    pub fn label(&self, row: &Observation) -> Option<String> {
        let format = match self {
            TimeBucket::Day => "%Y-%m-%d",
            TimeBucket::Month => "%Y-%m",
            TimeBucket::Year => "%Y",
        };
        row.last_updated.map(|ts| ts.format(format).to_string())
    }
}

impl FromStr for TimeBucket {
    type Err = ProcessingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" | "date" => Ok(TimeBucket::Day),
            "month" => Ok(TimeBucket::Month),
            "year" => Ok(TimeBucket::Year),
            _ => Err(ProcessingError::UnknownGroupKey(format!("time bucket '{}'", s))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grouping {
    pub key: GroupKey,
    pub bucket: Option<TimeBucket>,
}

impl Grouping {
    pub fn by(key: GroupKey) -> Self {
        Self { key, bucket: None }
    }

    pub fn bucketed(key: GroupKey, bucket: TimeBucket) -> Self {
        Self {
            key,
            bucket: Some(bucket),
        }
    }

    fn group_of(&self, row: &Observation) -> Option<GroupId> {
        let key = self.key.label(row)?;
        let bucket = match self.bucket {
            Some(bucket) => Some(bucket.label(row)?),
            None => None,
        };
        Some(GroupId { bucket, key })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct GroupId {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,
    pub key: String,
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.bucket {
            Some(bucket) => write!(f, "{} / {}", bucket, self.key),
            None => f.write_str(&self.key),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRow {
    pub group: GroupId,
    pub measure: Measure,
    pub aggregation: Aggregation,
    pub value: f64,
    /// Non-null values that went into `value`.
    pub count: usize,
}

/// Per-group mean (sum for precipitation) of each measure, ignoring nulls.
///
/// Output is ordered by group, then by measure. A group with no non-null
/// value for a measure produces no row for that measure.
pub fn group_aggregate(view: &FilteredView<'_>, grouping: Grouping, measures: &[Measure]) -> Vec<AggregateRow> {
    let mut totals: BTreeMap<(GroupId, Measure), (f64, usize)> = BTreeMap::new();

    for row in view.iter() {
        let Some(group) = grouping.group_of(row) else {
            continue;
        };
        for measure in measures {
            if let Some(value) = measure.value(row) {
                let entry = totals.entry((group.clone(), *measure)).or_insert((0.0, 0));
                entry.0 += value;
                entry.1 += 1;
            }
        }
    }

    totals
        .into_iter()
        .map(|((group, measure), (sum, count))| {
            let aggregation = measure.default_aggregation();
            let value = match aggregation {
                Aggregation::Sum => sum,
                Aggregation::Mean => sum / count as f64,
            };
            AggregateRow {
                group,
                measure,
                aggregation,
                value,
                count,
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,
    pub label: String,
    pub count: usize,
}

/// Row counts per group.
///
/// Ordered by time bucket, then most frequent first (ties by label). With a
/// bucket, undated rows are not counted.
pub fn count_by(view: &FilteredView<'_>, grouping: Grouping) -> Vec<CategoryCount> {
    let mut counts: HashMap<GroupId, usize> = HashMap::new();
    for group in view.iter().filter_map(|row| grouping.group_of(row)) {
        *counts.entry(group).or_insert(0) += 1;
    }

    let mut counts: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(group, count)| CategoryCount {
            bucket: group.bucket,
            label: group.key,
            count,
        })
        .collect();
    counts.sort_by(|a, b| {
        a.bucket
            .cmp(&b.bucket)
            .then_with(|| b.count.cmp(&a.count))
            .then_with(|| a.label.cmp(&b.label))
    });
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Dataset;
    use chrono::NaiveDate;

    fn dataset() -> Dataset {
        let day = |d: u32| {
            NaiveDate::from_ymd_opt(2024, 5, d)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap()
        };
        let rows = vec![
            Observation::builder()
                .country("India")
                .location_name("Mumbai")
                .temperature(30.0)
                .precip_mm(2.0)
                .us_epa_index(2)
                .condition("Sunny")
                .last_updated(day(1))
                .build()
                .unwrap(),
            Observation::builder()
                .country("India")
                .location_name("Delhi")
                .temperature(36.0)
                .precip_mm(1.5)
                .us_epa_index(4)
                .condition("Mist")
                .last_updated(day(2))
                .build()
                .unwrap(),
            Observation::builder()
                .country("France")
                .location_name("Paris")
                .precip_mm(0.5)
                .condition("Sunny")
                .build()
                .unwrap(),
        ];
        Dataset::from_observations("memory", rows)
    }

    #[test]
    fn test_mean_and_sum_per_group() {
        let data = dataset();
        let view = FilteredView::all(&data);
        let rows = group_aggregate(
            &view,
            Grouping::by(GroupKey::Continent),
            &[Measure::Temperature, Measure::PrecipMm],
        );

        let asia_temp = rows
            .iter()
            .find(|r| r.group.key == "Asia" && r.measure == Measure::Temperature)
            .unwrap();
        assert_eq!(asia_temp.value, 33.0);
        assert_eq!(asia_temp.count, 2);
        assert_eq!(asia_temp.aggregation, Aggregation::Mean);

        let asia_precip = rows
            .iter()
            .find(|r| r.group.key == "Asia" && r.measure == Measure::PrecipMm)
            .unwrap();
        assert_eq!(asia_precip.value, 3.5);
        assert_eq!(asia_precip.aggregation, Aggregation::Sum);
    }

    #[test]
    fn test_groups_without_values_are_omitted() {
        let data = dataset();
        let view = FilteredView::all(&data);
        let rows = group_aggregate(&view, Grouping::by(GroupKey::Country), &[Measure::Temperature]);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].group.key, "India");
        assert!(rows.iter().all(|r| !r.value.is_nan()));
    }

    #[test]
    fn test_time_bucketed_grouping_skips_undated_rows() {
        let data = dataset();
        let view = FilteredView::all(&data);
        let rows = group_aggregate(
            &view,
            Grouping::bucketed(GroupKey::Location, TimeBucket::Day),
            &[Measure::PrecipMm],
        );

        let groups: Vec<String> = rows.iter().map(|r| r.group.to_string()).collect();
        assert_eq!(groups, vec!["2024-05-01 / Mumbai", "2024-05-02 / Delhi"]);
    }

    #[test]
    fn test_empty_view_aggregates_to_nothing() {
        let view = FilteredView::from_rows(Vec::new());
        assert!(group_aggregate(&view, Grouping::by(GroupKey::Country), &Measure::ALL).is_empty());
        assert!(count_by(&view, Grouping::by(GroupKey::Condition)).is_empty());
    }

    #[test]
    fn test_count_by_category() {
        let data = dataset();
        let view = FilteredView::all(&data);

        let conditions = count_by(&view, Grouping::by(GroupKey::Condition));
        assert_eq!(
            conditions,
            vec![
                CategoryCount { bucket: None, label: "Sunny".to_string(), count: 2 },
                CategoryCount { bucket: None, label: "Mist".to_string(), count: 1 },
            ]
        );

        let aqi = count_by(&view, Grouping::by(GroupKey::AqiCategory));
        assert_eq!(aqi.len(), 3);
        assert!(aqi.iter().any(|c| c.label == "Unknown"));
    }

    #[test]
    fn test_condition_counts_per_month_skip_undated_rows() {
        let data = dataset();
        let view = FilteredView::all(&data);

        let timeline = count_by(&view, Grouping::bucketed(GroupKey::Condition, TimeBucket::Month));
        assert_eq!(
            timeline,
            vec![
                CategoryCount { bucket: Some("2024-05".to_string()), label: "Mist".to_string(), count: 1 },
                CategoryCount { bucket: Some("2024-05".to_string()), label: "Sunny".to_string(), count: 1 },
            ]
        );

        let groups = count_by(&view, Grouping::bucketed(GroupKey::ConditionGroup, TimeBucket::Day));
        let labels: Vec<(Option<&str>, &str)> = groups
            .iter()
            .map(|c| (c.bucket.as_deref(), c.label.as_str()))
            .collect();
        assert_eq!(
            labels,
            vec![(Some("2024-05-01"), "Sunny/Clear"), (Some("2024-05-02"), "Mist/Fog")]
        );
    }

    #[test]
    fn test_group_key_parse() {
        assert_eq!("aqi-category".parse::<GroupKey>().unwrap(), GroupKey::AqiCategory);
        assert_eq!("condition_group".parse::<GroupKey>().unwrap(), GroupKey::ConditionGroup);
        assert_eq!("Moon-Phase".parse::<GroupKey>().unwrap(), GroupKey::MoonPhase);
        assert!(matches!(
            "station".parse::<GroupKey>(),
            Err(ProcessingError::UnknownGroupKey(_))
        ));
        assert_eq!("month".parse::<TimeBucket>().unwrap(), TimeBucket::Month);
    }
}
