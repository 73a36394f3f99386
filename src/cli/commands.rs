use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analyzers::{
    correlation_matrix, count_by, describe, group_aggregate, location_table, moon_illumination, moon_times,
    pollution_extremes, sun_position, top_n, AggregateRow, CategoryCount, CorrelationMatrix,
    Direction, GroupKey, Grouping, LocationAirQuality, MeasureStats, MoonIllumination, MoonTimes,
    PollutionExtremes, SunPosition, WeatherAnalyzer, WeatherSummary,
};
use crate::cli::args::{Cli, Commands};
use crate::geolocation::{detect_default_selection, IpInfoLocator};
use crate::models::{Measure, Observation};
use crate::processors::{CascadeOptions, FilterEngine, FilterOutcome, FilteredView};
use crate::readers::{DatasetCache, ObservationReader};
use crate::settings::Settings;
use crate::writers::CsvWriter;

const NO_MATCHES: &str = "No observations match the current filters; broaden your filters.";

const CORRELATION_MEASURES: [Measure; 8] = [
    Measure::Temperature,
    Measure::FeelsLike,
    Measure::Humidity,
    Measure::WindMph,
    Measure::PressureMb,
    Measure::PrecipMm,
    Measure::UvIndex,
    Measure::UsEpaIndex,
];

pub fn run(cli: Cli) -> Result<()> {
    let settings = Settings::load(cli.config.as_deref(), cli.dataset.as_deref())
        .context("Failed to load settings")?;
    setup_logging(cli.log_level_override().unwrap_or(settings.logging.level.as_str()));

    let mut spec = cli
        .filters
        .to_filter_spec()
        .context("Invalid filter arguments")?;

    let path = settings.dataset_path();
    let mut cache = DatasetCache::with_reader(ObservationReader::with_progress(!cli.quiet && !cli.json));
    let dataset = cache
        .get_or_load(&path)
        .with_context(|| format!("Failed to load dataset '{}'", path.display()))?;
    let engine = FilterEngine::new(&dataset);

    if cli.filters.use_defaults {
        let fallback = settings.default_selection();
        let defaults = if settings.geolocation.enabled {
            let locator =
                IpInfoLocator::new(settings.geolocation.endpoint.clone(), settings.geolocation_timeout());
            detect_default_selection(&locator, &fallback)
        } else {
            fallback
        };
        debug!("Applying default selection {} / {}", defaults.country, defaults.continent);
        spec = engine.with_default_selection(spec, &defaults);
    }

    let json = cli.json;

    if let Commands::Options = cli.command {
        return emit(json, &engine.options(&spec), render_options);
    }

    let view = match engine.apply(&spec).context("Invalid filter arguments")? {
        FilterOutcome::Matched(view) => view,
        FilterOutcome::NoMatches => {
            println!("{}", no_matches_notice(json)?);
            return Ok(());
        }
    };
    info!("{} of {} observations selected", view.len(), dataset.len());

    match cli.command {
        Commands::Options => Ok(()),

        Commands::Summary => {
            let summary = WeatherAnalyzer::new()
                .summarize(&view)
                .context("No observations to summarize")?;
            let statistics = measure_statistics(&view, &Measure::ALL);
            emit(json, &SummaryReport { summary, statistics }, render_summary)
        }

        Commands::Export { output } => {
            if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create '{}'", parent.display()))?;
            }
            let written = CsvWriter::new()
                .write_observations(view.iter(), &output)
                .with_context(|| format!("Failed to export to '{}'", output.display()))?;
            println!("Exported {} observations to {}", written, output.display());
            Ok(())
        }

        Commands::Top { measure, n, smallest } => {
            let direction = if smallest { Direction::Smallest } else { Direction::Largest };
            let ranked = top_n(&view, measure, n, direction);
            emit(json, &ranked, |rows| render_ranking(rows, measure))
        }

        Commands::Aggregate { by, bucket, measures } => {
            let grouping = match bucket {
                Some(bucket) => Grouping::bucketed(by, bucket),
                None => Grouping::by(by),
            };
            let rows = group_aggregate(&view, grouping, &measures);
            emit(json, &rows, |rows| render_aggregates(rows))
        }

        Commands::AirQuality { category } => {
            let locations = location_table(&view, category);
            let report = AirQualityReport {
                extremes: pollution_extremes(&locations),
                aqi_categories: count_by(&view, Grouping::by(GroupKey::AqiCategory)),
                pollutants: measure_statistics(&view, &Measure::POLLUTANTS),
                locations,
            };
            emit(json, &report, render_air_quality)
        }

        Commands::Conditions { bucket } => {
            let grouping = |key| match bucket {
                Some(bucket) => Grouping::bucketed(key, bucket),
                None => Grouping::by(key),
            };
            let report = ConditionsReport {
                conditions: count_by(&view, grouping(GroupKey::Condition)),
                groups: count_by(&view, grouping(GroupKey::ConditionGroup)),
                moon_phases: count_by(&view, grouping(GroupKey::MoonPhase)),
            };
            emit(json, &report, render_conditions)
        }

        Commands::Correlate { measures } => {
            let measures = if measures.is_empty() {
                CORRELATION_MEASURES.to_vec()
            } else {
                measures
            };
            emit(json, &correlation_matrix(&view, &measures), render_correlation)
        }

        Commands::Astronomy { n } => {
            let rows: Vec<AstronomyRow> = view.iter().take(n).map(AstronomyRow::of).collect();
            emit(json, &rows, |rows| render_astronomy(rows))
        }
    }
}

/// Install the stderr subscriber; `RUST_LOG` takes precedence over `level`.
pub fn setup_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("weather_insights={}", level)));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .try_init();
}

#[derive(Serialize)]
struct NoMatches {
    status: &'static str,
    message: &'static str,
}

/// Notice for an empty filter result; JSON output stays machine-readable.
fn no_matches_notice(json: bool) -> Result<String> {
    if json {
        Ok(serde_json::to_string(&NoMatches {
            status: "no_matches",
            message: NO_MATCHES,
        })?)
    } else {
        Ok(NO_MATCHES.to_string())
    }
}

fn emit<T: Serialize + ?Sized>(json: bool, value: &T, render: impl FnOnce(&T) -> String) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", render(value));
    }
    Ok(())
}

#[derive(Serialize)]
struct SummaryReport {
    summary: WeatherSummary,
    statistics: Vec<MeasureStats>,
}

#[derive(Serialize)]
struct AirQualityReport {
    locations: Vec<LocationAirQuality>,
    extremes: Option<PollutionExtremes>,
    aqi_categories: Vec<CategoryCount>,
    pollutants: Vec<MeasureStats>,
}

#[derive(Serialize)]
struct ConditionsReport {
    conditions: Vec<CategoryCount>,
    groups: Vec<CategoryCount>,
    moon_phases: Vec<CategoryCount>,
}

#[derive(Serialize)]
struct AstronomyRow {
    country: String,
    location: String,
    sun: Option<SunPosition>,
    moon: MoonIllumination,
    moon_times: MoonTimes,
}

impl AstronomyRow {
    fn of(row: &Observation) -> Self {
        Self {
            country: row.country.clone(),
            location: row.location_name.clone(),
            sun: sun_position(row),
            moon: moon_illumination(row),
            moon_times: moon_times(row),
        }
    }
}

fn measure_statistics(view: &FilteredView<'_>, measures: &[Measure]) -> Vec<MeasureStats> {
    measures.iter().filter_map(|m| describe(view, *m)).collect()
}

fn value_or_dash(value: Option<f64>, precision: usize) -> String {
    value
        .map(|v| format!("{:.*}", precision, v))
        .unwrap_or_else(|| "-".to_string())
}

fn join<T: ToString>(items: &[T]) -> String {
    if items.is_empty() {
        return "(none)".to_string();
    }
    items.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

fn render_options(options: &CascadeOptions) -> String {
    format!(
        "Continents: {}\nCountries: {}\nLocations: {}\nYears: {}\nMonths: {}\nDays: {}",
        join(&options.continents),
        join(&options.countries),
        join(&options.locations),
        join(&options.years),
        join(&options.months),
        join(&options.days),
    )
}

fn render_summary(report: &SummaryReport) -> String {
    let mut out = report.summary.detailed_summary();
    out.push_str("\n\n");
    out.push_str(&render_statistics("Statistics", &report.statistics));
    out
}

fn render_statistics(title: &str, statistics: &[MeasureStats]) -> String {
    let mut out = format!("{}:", title);
    for stats in statistics {
        out.push_str(&format!(
            "\n- {}: n={} mean={:.2} sd={} min={:.2} max={:.2} {}",
            stats.measure.display_name(),
            stats.count,
            stats.mean,
            value_or_dash(stats.std_dev, 2),
            stats.min,
            stats.max,
            stats.measure.units(),
        ));
    }
    out
}

fn render_ranking(rows: &[&Observation], measure: Measure) -> String {
    let mut lines = vec![format!("Top {} by {}:", rows.len(), measure.display_name())];
    lines.extend(rows.iter().enumerate().map(|(i, row)| {
        format!(
            "{}. {} ({}): {} {}",
            i + 1,
            row.location_name,
            row.country,
            value_or_dash(measure.value(row), 1),
            measure.units(),
        )
    }));
    lines.join("\n")
}

fn render_aggregates(rows: &[AggregateRow]) -> String {
    if rows.is_empty() {
        return "No group has a value for the requested measures".to_string();
    }
    rows.iter()
        .map(|row| {
            format!(
                "{}: {} {} = {:.2} (n={})",
                row.group,
                row.aggregation,
                row.measure.display_name(),
                row.value,
                row.count
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_counts(title: &str, counts: &[CategoryCount]) -> String {
    let mut out = format!("{}:", title);
    for count in counts {
        match &count.bucket {
            Some(bucket) => out.push_str(&format!("\n- {} / {}: {}", bucket, count.label, count.count)),
            None => out.push_str(&format!("\n- {}: {}", count.label, count.count)),
        }
    }
    out
}

fn render_air_quality(report: &AirQualityReport) -> String {
    let mut out = String::from("Locations:");
    for entry in &report.locations {
        out.push_str(&format!(
            "\n- {} ({}): AQI {} PM2.5 {} PM10 {} [{}]",
            entry.location,
            entry.country,
            value_or_dash(entry.aqi, 1),
            value_or_dash(entry.pm2_5, 1),
            value_or_dash(entry.pm10, 1),
            entry.category,
        ));
    }

    if let Some(extremes) = &report.extremes {
        out.push_str(&format!(
            "\n\nMost polluted: {} ({}) score {:.2}\nLeast polluted: {} ({}) score {:.2}",
            extremes.most_polluted.location,
            extremes.most_polluted.country,
            extremes.most_polluted.score,
            extremes.least_polluted.location,
            extremes.least_polluted.country,
            extremes.least_polluted.score,
        ));
    }

    out.push_str("\n\n");
    out.push_str(&render_counts("AQI categories", &report.aqi_categories));
    out.push_str("\n\n");
    out.push_str(&render_statistics("Pollutants", &report.pollutants));
    out
}

fn render_conditions(report: &ConditionsReport) -> String {
    [
        render_counts("Conditions", &report.conditions),
        render_counts("Condition groups", &report.groups),
        render_counts("Moon phases", &report.moon_phases),
    ]
    .join("\n\n")
}

fn render_correlation(matrix: &CorrelationMatrix) -> String {
    let mut out = String::new();
    for (i, x) in matrix.measures.iter().enumerate() {
        let cells: Vec<String> = matrix.values[i]
            .iter()
            .map(|v| format!("{:>6}", value_or_dash(*v, 2)))
            .collect();
        out.push_str(&format!("{:<28}{}\n", x.display_name(), cells.join(" ")));
    }
    out.trim_end().to_string()
}

fn render_astronomy(rows: &[AstronomyRow]) -> String {
    rows.iter()
        .map(|row| {
            let sun = match &row.sun {
                Some(sun) if sun.is_day => format!("day, {:.0}% of daylight elapsed", sun.progress * 100.0),
                Some(_) => "night".to_string(),
                None => "sun times unavailable".to_string(),
            };
            format!(
                "{} ({}): {}; moon {:.0}% illuminated",
                row.location, row.country, sun, row.moon.illuminated
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
