use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ProcessingError;
use crate::models::Observation;

/// Numeric columns that can be range-filtered, aggregated and ranked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Measure {
    Temperature,
    FeelsLike,
    Humidity,
    WindMph,
    PressureMb,
    Cloud,
    PrecipMm,
    VisibilityKm,
    UvIndex,
    Pm25,
    Pm10,
    NitrogenDioxide,
    SulphurDioxide,
    CarbonMonoxide,
    Ozone,
    UsEpaIndex,
    MoonIllumination,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    Mean,
    Sum,
}

impl Measure {
    pub const ALL: [Measure; 17] = [
        Measure::Temperature,
        Measure::FeelsLike,
        Measure::Humidity,
        Measure::WindMph,
        Measure::PressureMb,
        Measure::Cloud,
        Measure::PrecipMm,
        Measure::VisibilityKm,
        Measure::UvIndex,
        Measure::Pm25,
        Measure::Pm10,
        Measure::NitrogenDioxide,
        Measure::SulphurDioxide,
        Measure::CarbonMonoxide,
        Measure::Ozone,
        Measure::UsEpaIndex,
        Measure::MoonIllumination,
    ];

    /// The `air_quality_` columns, reported together by the air-quality command.
    pub const POLLUTANTS: [Measure; 7] = [
        Measure::UsEpaIndex,
        Measure::Pm25,
        Measure::Pm10,
        Measure::CarbonMonoxide,
        Measure::NitrogenDioxide,
        Measure::SulphurDioxide,
        Measure::Ozone,
    ];

    pub fn column_name(&self) -> &'static str {
        match self {
            Measure::Temperature => "temperature_celsius",
            Measure::FeelsLike => "feels_like_celsius",
            Measure::Humidity => "humidity",
            Measure::WindMph => "wind_mph",
            Measure::PressureMb => "pressure_mb",
            Measure::Cloud => "cloud",
            Measure::PrecipMm => "precip_mm",
            Measure::VisibilityKm => "visibility_km",
            Measure::UvIndex => "uv_index",
            Measure::Pm25 => "air_quality_PM2.5",
            Measure::Pm10 => "air_quality_PM10",
            Measure::NitrogenDioxide => "air_quality_Nitrogen_dioxide",
            Measure::SulphurDioxide => "air_quality_Sulphur_dioxide",
            Measure::CarbonMonoxide => "air_quality_Carbon_Monoxide",
            Measure::Ozone => "air_quality_Ozone",
            Measure::UsEpaIndex => "air_quality_us-epa-index",
            Measure::MoonIllumination => "moon_illumination",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Measure::Temperature => "Temperature",
            Measure::FeelsLike => "Feels Like",
            Measure::Humidity => "Humidity",
            Measure::WindMph => "Wind Speed",
            Measure::PressureMb => "Pressure",
            Measure::Cloud => "Cloud Cover",
            Measure::PrecipMm => "Precipitation",
            Measure::VisibilityKm => "Visibility",
            Measure::UvIndex => "UV Index",
            Measure::Pm25 => "PM2.5",
            Measure::Pm10 => "PM10",
            Measure::NitrogenDioxide => "NO2 (Nitrogen Dioxide)",
            Measure::SulphurDioxide => "SO2 (Sulphur Dioxide)",
            Measure::CarbonMonoxide => "CO (Carbon Monoxide)",
            Measure::Ozone => "O3 (Ozone)",
            Measure::UsEpaIndex => "US EPA Index",
            Measure::MoonIllumination => "Moon Illumination",
        }
    }

    pub fn units(&self) -> &'static str {
        match self {
            Measure::Temperature | Measure::FeelsLike => "°C",
            Measure::Humidity | Measure::Cloud | Measure::MoonIllumination => "%",
            Measure::WindMph => "mph",
            Measure::PressureMb => "mb",
            Measure::PrecipMm => "mm",
            Measure::VisibilityKm => "km",
            Measure::UvIndex | Measure::UsEpaIndex => "index",
            Measure::Pm25
            | Measure::Pm10
            | Measure::NitrogenDioxide
            | Measure::SulphurDioxide
            | Measure::CarbonMonoxide
            | Measure::Ozone => "µg/m³",
        }
    }

    /// Precipitation accumulates; everything else is averaged.
    pub fn default_aggregation(&self) -> Aggregation {
        match self {
            Measure::PrecipMm => Aggregation::Sum,
            _ => Aggregation::Mean,
        }
    }

    pub fn value(&self, observation: &Observation) -> Option<f64> {
        match self {
            Measure::Temperature => observation.temperature_celsius,
            Measure::FeelsLike => observation.feels_like_celsius,
            Measure::Humidity => observation.humidity,
            Measure::WindMph => observation.wind_mph,
            Measure::PressureMb => observation.pressure_mb,
            Measure::Cloud => observation.cloud,
            Measure::PrecipMm => observation.precip_mm,
            Measure::VisibilityKm => observation.visibility_km,
            Measure::UvIndex => observation.uv_index,
            Measure::Pm25 => observation.pm2_5,
            Measure::Pm10 => observation.pm10,
            Measure::NitrogenDioxide => observation.nitrogen_dioxide,
            Measure::SulphurDioxide => observation.sulphur_dioxide,
            Measure::CarbonMonoxide => observation.carbon_monoxide,
            Measure::Ozone => observation.ozone,
            Measure::UsEpaIndex => observation.us_epa_index.map(f64::from),
            Measure::MoonIllumination => observation.moon_illumination,
        }
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.column_name())
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Aggregation::Mean => f.write_str("mean"),
            Aggregation::Sum => f.write_str("sum"),
        }
    }
}

impl FromStr for Measure {
    type Err = ProcessingError;

    /// Accepts the CSV column name, the bare pollutant name (`PM2.5`) or a
    /// short alias such as `temperature` or `aqi`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        if let Some(measure) = Measure::ALL.into_iter().find(|m| {
            m.column_name() == wanted
                || m.column_name().strip_prefix("air_quality_") == Some(wanted)
        }) {
            return Ok(measure);
        }

        match wanted.to_ascii_lowercase().as_str() {
            "temperature" | "temp" => Ok(Measure::Temperature),
            "feels_like" => Ok(Measure::FeelsLike),
            "wind" => Ok(Measure::WindMph),
            "pressure" => Ok(Measure::PressureMb),
            "precipitation" | "precip" => Ok(Measure::PrecipMm),
            "visibility" => Ok(Measure::VisibilityKm),
            "uv" => Ok(Measure::UvIndex),
            "pm2.5" | "pm25" => Ok(Measure::Pm25),
            "pm10" => Ok(Measure::Pm10),
            "no2" => Ok(Measure::NitrogenDioxide),
            "so2" => Ok(Measure::SulphurDioxide),
            "co" => Ok(Measure::CarbonMonoxide),
            "o3" | "ozone" => Ok(Measure::Ozone),
            "aqi" | "us-epa-index" | "us_epa_index" => Ok(Measure::UsEpaIndex),
            "moon" => Ok(Measure::MoonIllumination),
            _ => Err(ProcessingError::UnknownMeasure(s.to_string())),
        }
    }
}
