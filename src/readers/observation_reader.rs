use std::borrow::Cow;
use std::collections::HashMap;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord};
use encoding_rs::WINDOWS_1252;
use tracing::{debug, info, warn};

use crate::error::{ProcessingError, Result};
use crate::models::{Dataset, Measure, Observation};
use crate::utils::constants::*;
use crate::utils::coordinates::{coerce_latitude, coerce_longitude, coerce_number};
use crate::utils::geography::ContinentResolver;
use crate::utils::progress::ProgressReporter;
use crate::utils::timestamp::parse_last_updated;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Optional text columns; numeric optional columns come from [`Measure`].
const OPTIONAL_TEXT_COLUMNS: [&str; 9] = [
    COL_TIMEZONE,
    COL_LAST_UPDATED,
    COL_WIND_DIRECTION,
    COL_SUNRISE,
    COL_SUNSET,
    COL_MOONRISE,
    COL_MOONSET,
    COL_MOON_PHASE,
    COL_CONDITION,
];

/// Reads the weather snapshot CSV into a [`Dataset`].
pub struct ObservationReader {
    show_progress: bool,
}

impl ObservationReader {
    pub fn new() -> Self {
        Self {
            show_progress: false,
        }
    }

    pub fn with_progress(show_progress: bool) -> Self {
        Self { show_progress }
    }

    /// Load a snapshot from disk.
    ///
    /// Fails only when the file cannot be read or lacks a required column;
    /// every per-field problem degrades to a null value.
    pub fn read_dataset(&self, path: &Path) -> Result<Dataset> {
        let bytes = fs::read(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ProcessingError::data_load(
                path,
                "file not found; run the download/preprocessing step or pass --dataset",
            ),
            _ => ProcessingError::data_load(path, e.to_string()),
        })?;

        self.parse_bytes(&bytes, path)
    }

    /// Load a snapshot from any reader; `label` is recorded as the source.
    pub fn read_from_reader<R: Read>(&self, mut reader: R, label: impl Into<PathBuf>) -> Result<Dataset> {
        let label = label.into();
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .map_err(|e| ProcessingError::data_load(&label, e.to_string()))?;

        self.parse_bytes(&bytes, &label)
    }

    fn parse_bytes(&self, bytes: &[u8], source: &Path) -> Result<Dataset> {
        let text = decode(bytes, source);
        let mut csv_reader = ReaderBuilder::new()
            .flexible(true)
            .from_reader(text.as_bytes());

        let headers = csv_reader
            .headers()
            .map_err(|e| ProcessingError::data_load(source, e.to_string()))?
            .clone();
        let columns = ColumnIndex::new(&headers);

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|c| columns.find(c).is_none())
            .map(|c| c.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ProcessingError::MissingColumns {
                path: source.to_path_buf(),
                columns: missing,
            });
        }

        let synthesized = columns.absent_optional_columns();
        let layout = RowLayout::new(&columns);

        let progress =
            ProgressReporter::new_spinner(&format!("Reading {}", source.display()), !self.show_progress);
        let mut resolver = ContinentResolver::new();
        let mut observations = Vec::new();
        let mut skipped = 0usize;

        for record in csv_reader.records() {
            match record {
                Ok(record) => match layout.observation(&record, &mut resolver) {
                    Ok(observation) => observations.push(observation),
                    Err(e) => {
                        debug!("Dropping record: {}", e);
                        skipped += 1;
                    }
                },
                Err(e) => {
                    debug!("Unreadable CSV record: {}", e);
                    skipped += 1;
                }
            }
            progress.increment(1);
        }
        progress.finish_with_message(&format!(
            "Read {} rows from {}",
            observations.len(),
            source.display()
        ));

        if skipped > 0 {
            warn!(
                "Skipped {} malformed record(s) while reading {}",
                skipped,
                source.display()
            );
        }
        let unresolved: Vec<&str> = resolver.unresolved().collect();
        if !unresolved.is_empty() {
            debug!(
                "{} country name(s) mapped to Unknown continent: {:?}",
                unresolved.len(),
                unresolved
            );
        }
        info!(
            path = %source.display(),
            rows = observations.len(),
            countries = resolver.distinct_countries(),
            synthesized = ?synthesized,
            "Loaded dataset"
        );

        Ok(Dataset::new(source, observations, synthesized, skipped))
    }
}

impl Default for ObservationReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Strip a UTF-8 BOM and decode.
///
/// Input with stray invalid bytes among valid multi-byte characters is read
/// as UTF-8 with the bad bytes replaced; otherwise invalid input is read as
/// Windows-1252.
fn decode<'a>(bytes: &'a [u8], source: &Path) -> Cow<'a, str> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    if let Ok(text) = std::str::from_utf8(bytes) {
        return Cow::Borrowed(text);
    }

    let (multibyte, invalid) = utf8_census(bytes);
    if multibyte >= invalid {
        warn!(
            "{} has {} invalid UTF-8 sequence(s); replacing them with U+FFFD",
            source.display(),
            invalid
        );
        String::from_utf8_lossy(bytes)
    } else {
        warn!("{} is not valid UTF-8, decoding as Windows-1252", source.display());
        let (text, _) = WINDOWS_1252.decode_without_bom_handling(bytes);
        text
    }
}

/// Count valid non-ASCII characters and invalid sequences.
fn utf8_census(mut bytes: &[u8]) -> (usize, usize) {
    let non_ascii = |valid: &[u8]| {
        std::str::from_utf8(valid)
            .map(|text| text.chars().filter(|c| !c.is_ascii()).count())
            .unwrap_or(0)
    };

    let (mut multibyte, mut invalid) = (0, 0);
    loop {
        match std::str::from_utf8(bytes) {
            Ok(_) => return (multibyte + non_ascii(bytes), invalid),
            Err(e) => {
                let (valid, rest) = bytes.split_at(e.valid_up_to());
                multibyte += non_ascii(valid);
                invalid += 1;
                match e.error_len() {
                    Some(len) => bytes = &rest[len..],
                    None => return (multibyte, invalid),
                }
            }
        }
    }
}

/// Header positions keyed by trimmed column name.
struct ColumnIndex {
    positions: HashMap<String, usize>,
}

impl ColumnIndex {
    fn new(headers: &StringRecord) -> Self {
        let mut positions = HashMap::with_capacity(headers.len());
        for (i, name) in headers.iter().enumerate() {
            positions.entry(name.trim().to_string()).or_insert(i);
        }
        Self { positions }
    }

    /// Exact (case-sensitive) lookup; pollutant columns also answer to their
    /// bare name without the `air_quality_` prefix.
    fn find(&self, column: &str) -> Option<usize> {
        self.positions.get(column).copied().or_else(|| {
            column
                .strip_prefix("air_quality_")
                .and_then(|bare| self.positions.get(bare).copied())
        })
    }

    fn absent_optional_columns(&self) -> Vec<String> {
        let numeric = Measure::ALL
            .iter()
            .map(|m| m.column_name())
            .filter(|c| !REQUIRED_COLUMNS.contains(c));

        OPTIONAL_TEXT_COLUMNS
            .iter()
            .copied()
            .chain(numeric)
            .filter(|c| self.find(c).is_none())
            .map(str::to_string)
            .collect()
    }
}

/// Resolved column positions for one load.
struct RowLayout {
    country: Option<usize>,
    location: Option<usize>,
    latitude: Option<usize>,
    longitude: Option<usize>,
    timezone: Option<usize>,
    last_updated: Option<usize>,
    wind_direction: Option<usize>,
    sunrise: Option<usize>,
    sunset: Option<usize>,
    moonrise: Option<usize>,
    moonset: Option<usize>,
    moon_phase: Option<usize>,
    condition: Option<usize>,
    measures: Vec<(Measure, Option<usize>)>,
}

impl RowLayout {
    fn new(columns: &ColumnIndex) -> Self {
        Self {
            country: columns.find(COL_COUNTRY),
            location: columns.find(COL_LOCATION),
            latitude: columns.find(COL_LATITUDE),
            longitude: columns.find(COL_LONGITUDE),
            timezone: columns.find(COL_TIMEZONE),
            last_updated: columns.find(COL_LAST_UPDATED),
            wind_direction: columns.find(COL_WIND_DIRECTION),
            sunrise: columns.find(COL_SUNRISE),
            sunset: columns.find(COL_SUNSET),
            moonrise: columns.find(COL_MOONRISE),
            moonset: columns.find(COL_MOONSET),
            moon_phase: columns.find(COL_MOON_PHASE),
            condition: columns.find(COL_CONDITION),
            measures: Measure::ALL
                .iter()
                .map(|m| (*m, columns.find(m.column_name())))
                .collect(),
        }
    }

    fn observation(&self, record: &StringRecord, resolver: &mut ContinentResolver) -> Result<Observation> {
        let country = text(record, self.country).unwrap_or_default();
        let continent = resolver.resolve(&country);

        let mut builder = Observation::builder()
            .country(country)
            .location_name(text(record, self.location).unwrap_or_default())
            .continent(continent)
            .latitude(raw(record, self.latitude).and_then(coerce_latitude))
            .longitude(raw(record, self.longitude).and_then(coerce_longitude))
            .timezone(text(record, self.timezone))
            .last_updated_opt(raw(record, self.last_updated).and_then(parse_last_updated));

        for (measure, position) in &self.measures {
            if let Some(value) = raw(record, *position).and_then(coerce_number) {
                builder = builder.measure(*measure, value);
            }
        }

        if let Some(direction) = text(record, self.wind_direction) {
            builder = builder.wind_direction(direction);
        }
        if let Some(sunrise) = text(record, self.sunrise) {
            builder = builder.sunrise(sunrise);
        }
        if let Some(sunset) = text(record, self.sunset) {
            builder = builder.sunset(sunset);
        }
        if let Some(moonrise) = text(record, self.moonrise) {
            builder = builder.moonrise(moonrise);
        }
        if let Some(moonset) = text(record, self.moonset) {
            builder = builder.moonset(moonset);
        }
        if let Some(phase) = text(record, self.moon_phase) {
            builder = builder.moon_phase(phase);
        }
        if let Some(condition) = text(record, self.condition) {
            builder = builder.condition(condition);
        }

        builder.build()
    }
}

fn raw(record: &StringRecord, position: Option<usize>) -> Option<&str> {
    position
        .and_then(|i| record.get(i))
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn text(record: &StringRecord, position: Option<usize>) -> Option<String> {
    raw(record, position).map(str::to_string)
}
