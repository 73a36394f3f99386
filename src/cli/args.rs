use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::analyzers::{GroupKey, ParticulateCategory, TimeBucket};
use crate::error::{ProcessingError, Result};
use crate::models::{Continent, Measure};
use crate::processors::{FilterSpec, NumericRange, Selection};
use crate::utils::constants::DEFAULT_TOP_N;

#[derive(Parser)]
#[command(name = "weather-insights")]
#[command(about = "Filter, rank and aggregate global weather and air-quality snapshots")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, help = "Settings file [default: ./weather-insights.toml if present]")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Snapshot CSV, overrides the configured dataset path")]
    pub dataset: Option<PathBuf>,

    #[arg(short, long, global = true, action = ArgAction::Count, help = "More logging (-v debug, -vv trace)")]
    pub verbose: u8,

    #[arg(short, long, global = true, conflicts_with = "verbose", help = "Only log errors and hide the spinner")]
    pub quiet: bool,

    #[arg(long, global = true, help = "Print results as JSON")]
    pub json: bool,

    #[command(flatten)]
    pub filters: FilterArgs,
}

impl Cli {
    /// Log level implied by `-v`/`--quiet`, if any.
    pub fn log_level_override(&self) -> Option<&'static str> {
        if self.quiet {
            return Some("error");
        }
        match self.verbose {
            0 => None,
            1 => Some("debug"),
            _ => Some("trace"),
        }
    }
}

/// Filter flags shared by every command.
#[derive(Args, Debug, Default)]
pub struct FilterArgs {
    #[arg(long = "continent", global = true)]
    pub continents: Vec<Continent>,

    #[arg(long = "country", global = true)]
    pub countries: Vec<String>,

    #[arg(long = "location", global = true)]
    pub locations: Vec<String>,

    #[arg(
        long = "range",
        global = true,
        value_name = "MEASURE=MIN:MAX",
        value_parser = parse_range
    )]
    pub ranges: Vec<(Measure, NumericRange)>,

    #[arg(long, global = true, help = "Keep rows whose US EPA index is at most N (1-6)")]
    pub max_aqi: Option<u8>,

    #[arg(long = "year", global = true)]
    pub years: Vec<i32>,

    #[arg(long = "month", global = true)]
    pub months: Vec<u32>,

    #[arg(long = "day", global = true)]
    pub days: Vec<u32>,

    #[arg(long, global = true, help = "Case-insensitive match on location or country")]
    pub search: Option<String>,

    #[arg(long, global = true, help = "Pre-select the detected or configured continent and country")]
    pub use_defaults: bool,
}

impl FilterArgs {
    /// Build a validated [`FilterSpec`]; levels with no flags select everything.
    pub fn to_filter_spec(&self) -> Result<FilterSpec> {
        let mut spec = FilterSpec::new();

        if !self.continents.is_empty() {
            spec.continents = Selection::only(self.continents.iter().copied());
        }
        if !self.countries.is_empty() {
            spec = spec.with_countries(self.countries.iter().cloned());
        }
        if !self.locations.is_empty() {
            spec = spec.with_locations(self.locations.iter().cloned());
        }
        for (measure, range) in &self.ranges {
            spec.ranges.insert(*measure, *range);
        }
        spec.max_aqi = self.max_aqi;
        spec.dates.years.extend(self.years.iter().copied());
        spec.dates.months.extend(self.months.iter().copied());
        spec.dates.days.extend(self.days.iter().copied());
        spec.search = self.search.clone().filter(|s| !s.trim().is_empty());

        spec.validate()?;
        Ok(spec)
    }
}

/// Parse `measure=min:max`, e.g. `temperature_celsius=10:25` or `PM2.5=0:60`.
fn parse_range(raw: &str) -> Result<(Measure, NumericRange)> {
    let (measure, bounds) = raw
        .split_once('=')
        .ok_or_else(|| ProcessingError::InvalidFilter(format!("expected MEASURE=MIN:MAX, got '{}'", raw)))?;
    let (min, max) = bounds
        .split_once(':')
        .ok_or_else(|| ProcessingError::InvalidFilter(format!("expected MIN:MAX, got '{}'", bounds)))?;

    let bound = |text: &str| {
        text.trim()
            .parse::<f64>()
            .map_err(|_| ProcessingError::InvalidFilter(format!("'{}' is not a number", text)))
    };

    Ok((measure.parse()?, NumericRange::new(bound(min)?, bound(max)?)?))
}

#[derive(Subcommand)]
pub enum Commands {
    /// Headline figures and per-measure statistics for the filtered rows
    Summary,

    /// Selectable values at each filter level for the current selection
    Options,

    /// Write the filtered rows to a CSV file
    Export {
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Rows with the largest (or smallest) values of a measure
    Top {
        #[arg(short, long)]
        measure: Measure,

        #[arg(short, default_value_t = DEFAULT_TOP_N)]
        n: usize,

        #[arg(long)]
        smallest: bool,
    },

    /// Mean or sum of measures per group
    Aggregate {
        #[arg(long, help = "continent, country, location, aqi-category, condition, condition-group or moon-phase")]
        by: GroupKey,

        #[arg(long, help = "Also split groups by day, month or year")]
        bucket: Option<TimeBucket>,

        #[arg(long = "measure", default_values_t = [Measure::Temperature])]
        measures: Vec<Measure>,
    },

    /// Per-location pollution table, extremes and category counts
    AirQuality {
        #[arg(long, help = "Only locations in this particulate category, e.g. moderately-polluted")]
        category: Option<ParticulateCategory>,
    },

    /// Weather condition frequencies and groups, optionally over time
    Conditions {
        #[arg(long, help = "Count per day, month or year")]
        bucket: Option<TimeBucket>,
    },

    /// Pearson correlation between measures
    Correlate {
        #[arg(long = "measure")]
        measures: Vec<Measure>,
    },

    /// Day/night position of the sun and moon illumination per observation
    Astronomy {
        #[arg(short, default_value_t = DEFAULT_TOP_N)]
        n: usize,
    },
}
