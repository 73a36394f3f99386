use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv::WriterBuilder;
use tracing::info;

use crate::error::Result;
use crate::models::{Measure, Observation};
use crate::utils::constants::*;
use crate::utils::timestamp::format_last_updated;

/// Serializes observations back to the snapshot's CSV layout, plus `continent`.
pub struct CsvWriter {
    delimiter: u8,
}

impl CsvWriter {
    pub fn new() -> Self {
        Self { delimiter: b',' }
    }

    pub fn header() -> Vec<&'static str> {
        let mut header = vec![
            COL_COUNTRY,
            COL_LOCATION,
            COL_CONTINENT,
            COL_LATITUDE,
            COL_LONGITUDE,
            COL_TIMEZONE,
            COL_LAST_UPDATED,
        ];
        header.extend(Measure::ALL.iter().map(|m| m.column_name()));
        header.extend([
            COL_WIND_DIRECTION,
            COL_SUNRISE,
            COL_SUNSET,
            COL_MOONRISE,
            COL_MOONSET,
            COL_MOON_PHASE,
            COL_CONDITION,
        ]);
        header
    }

    /// Write `rows` to `path`, returning the number of data rows written.
    pub fn write_observations<'a, I>(&self, rows: I, path: &Path) -> Result<usize>
    where
        I: IntoIterator<Item = &'a Observation>,
    {
        let file = File::create(path)?;
        let written = self.write_to(rows, file)?;
        info!("Exported {} rows to {}", written, path.display());
        Ok(written)
    }

    pub fn write_to<'a, I, W>(&self, rows: I, writer: W) -> Result<usize>
    where
        I: IntoIterator<Item = &'a Observation>,
        W: Write,
    {
        let mut csv_writer = WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(writer);

        csv_writer.write_record(Self::header())?;

        let mut written = 0;
        for row in rows {
            csv_writer.write_record(Self::fields(row))?;
            written += 1;
        }
        csv_writer.flush()?;

        Ok(written)
    }

    fn fields(row: &Observation) -> Vec<String> {
        let mut fields = vec![
            row.country.clone(),
            row.location_name.clone(),
            row.continent.to_string(),
            number(row.latitude),
            number(row.longitude),
            text(&row.timezone),
            row.last_updated
                .as_ref()
                .map(format_last_updated)
                .unwrap_or_default(),
        ];
        fields.extend(Measure::ALL.iter().map(|m| match m {
            Measure::UsEpaIndex => row.us_epa_index.map(|i| i.to_string()).unwrap_or_default(),
            _ => number(m.value(row)),
        }));
        fields.extend([
            text(&row.wind_direction),
            text(&row.sunrise),
            text(&row.sunset),
            text(&row.moonrise),
            text(&row.moonset),
            text(&row.moon_phase),
            text(&row.condition_text),
        ]);
        fields
    }
}

impl Default for CsvWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn number(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::readers::ObservationReader;
    use chrono::NaiveDate;

    fn observation() -> Observation {
        Observation::builder()
            .country("Japan")
            .location_name("Sapporo, Hokkaido")
            .coordinates(43.06, 141.35)
            .timezone(Some("Asia/Tokyo".to_string()))
            .last_updated(
                NaiveDate::from_ymd_opt(2024, 5, 16)
                    .unwrap()
                    .and_hms_opt(13, 15, 0)
                    .unwrap(),
            )
            .temperature(14.2)
            .humidity(63.0)
            .wind_mph(7.4)
            .us_epa_index(1)
            .particulates(3.1, 5.25)
            .sun("04:01 AM", "06:59 PM")
            .condition("Partly cloudy")
            .build()
            .unwrap()
    }

    #[test]
    fn test_header_and_quoting() -> Result<()> {
        let mut buffer = Vec::new();
        let written = CsvWriter::new().write_to([&observation()], &mut buffer)?;
        assert_eq!(written, 1);

        let text = String::from_utf8(buffer).unwrap();
        let mut lines = text.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("country,location_name,continent,latitude,longitude"));
        assert!(header.contains("air_quality_PM2.5"));

        let row = lines.next().unwrap();
        assert!(row.starts_with("Japan,\"Sapporo, Hokkaido\",Asia,43.06,141.35"));
        assert!(row.contains("16-05-2024 13:15"));
        Ok(())
    }

    #[test]
    fn test_written_rows_reload_identically() -> Result<()> {
        let original = observation();
        let mut buffer = Vec::new();
        CsvWriter::new().write_to([&original], &mut buffer)?;

        let dataset = ObservationReader::new().read_from_reader(buffer.as_slice(), "export.csv")?;
        assert_eq!(dataset.observations(), &[original]);
        assert!(dataset.synthesized_columns().is_empty());
        Ok(())
    }

    #[test]
    fn test_fractional_timestamps_reload_identically() -> Result<()> {
        let source = "country,location_name,latitude,longitude,temperature_celsius,humidity,wind_mph,last_updated\n\
                      Japan,Tokyo,35.68,139.69,19.8,65,7,2024-05-16T13:15:30.250Z\n";
        let loaded = ObservationReader::new().read_from_reader(source.as_bytes(), "source.csv")?;
        let expected = NaiveDate::from_ymd_opt(2024, 5, 16)
            .unwrap()
            .and_hms_milli_opt(13, 15, 30, 250)
            .unwrap();
        assert_eq!(loaded.observations()[0].last_updated, Some(expected));

        let mut buffer = Vec::new();
        CsvWriter::new().write_to(loaded.observations(), &mut buffer)?;
        let reloaded = ObservationReader::new().read_from_reader(buffer.as_slice(), "export.csv")?;
        assert_eq!(reloaded.observations(), loaded.observations());
        Ok(())
    }
}
