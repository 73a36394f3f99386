use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{ProcessingError, Result};
use crate::models::{Continent, Measure};
use crate::utils::geography::resolve_continent;

/// One row of the weather snapshot.
///
/// Every column other than `country` and `location_name` is nullable: values
/// that fail to parse, and optional columns absent from the source, are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Observation {
    pub country: String,
    pub location_name: String,
    pub continent: Continent,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,

    pub timezone: Option<String>,
    pub last_updated: Option<NaiveDateTime>,

    pub temperature_celsius: Option<f64>,
    pub feels_like_celsius: Option<f64>,
    pub humidity: Option<f64>,
    pub wind_mph: Option<f64>,
    pub wind_direction: Option<String>,
    pub pressure_mb: Option<f64>,
    pub cloud: Option<f64>,
    pub precip_mm: Option<f64>,
    pub visibility_km: Option<f64>,
    pub uv_index: Option<f64>,

    // Air quality concentrations (µg/m³)
    pub pm2_5: Option<f64>,
    pub pm10: Option<f64>,
    pub nitrogen_dioxide: Option<f64>,
    pub sulphur_dioxide: Option<f64>,
    pub carbon_monoxide: Option<f64>,
    pub ozone: Option<f64>,
    pub us_epa_index: Option<i32>,

    pub sunrise: Option<String>,
    pub sunset: Option<String>,
    pub moonrise: Option<String>,
    pub moonset: Option<String>,
    pub moon_phase: Option<String>,
    pub moon_illumination: Option<f64>,

    pub condition_text: Option<String>,
}

impl Observation {
    pub fn builder() -> ObservationBuilder {
        ObservationBuilder::new()
    }

    /// Both coordinates survived coercion, so the row can be placed on a map.
    pub fn has_coordinates(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }

    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }

    /// Difference between the felt and the measured temperature.
    pub fn feels_like_delta(&self) -> Option<f64> {
        match (self.feels_like_celsius, self.temperature_celsius) {
            (Some(feels), Some(actual)) => Some(feels - actual),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct ObservationBuilder {
    country: Option<String>,
    location_name: Option<String>,
    continent: Option<Continent>,
    observation: PartialObservation,
}

#[derive(Debug, Default)]
struct PartialObservation {
    latitude: Option<f64>,
    longitude: Option<f64>,
    timezone: Option<String>,
    last_updated: Option<NaiveDateTime>,
    temperature_celsius: Option<f64>,
    feels_like_celsius: Option<f64>,
    humidity: Option<f64>,
    wind_mph: Option<f64>,
    wind_direction: Option<String>,
    pressure_mb: Option<f64>,
    cloud: Option<f64>,
    precip_mm: Option<f64>,
    visibility_km: Option<f64>,
    uv_index: Option<f64>,
    pm2_5: Option<f64>,
    pm10: Option<f64>,
    nitrogen_dioxide: Option<f64>,
    sulphur_dioxide: Option<f64>,
    carbon_monoxide: Option<f64>,
    ozone: Option<f64>,
    us_epa_index: Option<i32>,
    sunrise: Option<String>,
    sunset: Option<String>,
    moonrise: Option<String>,
    moonset: Option<String>,
    moon_phase: Option<String>,
    moon_illumination: Option<f64>,
    condition_text: Option<String>,
}

impl ObservationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn location_name(mut self, name: impl Into<String>) -> Self {
        self.location_name = Some(name.into());
        self
    }

    /// Use an already resolved continent instead of resolving the country again.
    pub fn continent(mut self, continent: Continent) -> Self {
        self.continent = Some(continent);
        self
    }

    pub fn coordinates(mut self, latitude: f64, longitude: f64) -> Self {
        self.observation.latitude = Some(latitude);
        self.observation.longitude = Some(longitude);
        self
    }

    pub fn latitude(mut self, latitude: Option<f64>) -> Self {
        self.observation.latitude = latitude;
        self
    }

    pub fn longitude(mut self, longitude: Option<f64>) -> Self {
        self.observation.longitude = longitude;
        self
    }

    pub fn timezone(mut self, timezone: Option<String>) -> Self {
        self.observation.timezone = timezone;
        self
    }

    pub fn last_updated(mut self, timestamp: NaiveDateTime) -> Self {
        self.observation.last_updated = Some(timestamp);
        self
    }

    pub fn last_updated_opt(mut self, timestamp: Option<NaiveDateTime>) -> Self {
        self.observation.last_updated = timestamp;
        self
    }

    pub fn temperature(mut self, celsius: f64) -> Self {
        self.observation.temperature_celsius = Some(celsius);
        self
    }

    pub fn feels_like(mut self, celsius: f64) -> Self {
        self.observation.feels_like_celsius = Some(celsius);
        self
    }

    pub fn humidity(mut self, humidity: f64) -> Self {
        self.observation.humidity = Some(humidity);
        self
    }

    pub fn wind_mph(mut self, wind: f64) -> Self {
        self.observation.wind_mph = Some(wind);
        self
    }

    pub fn wind_direction(mut self, direction: impl Into<String>) -> Self {
        self.observation.wind_direction = Some(direction.into());
        self
    }

    pub fn pressure_mb(mut self, pressure: f64) -> Self {
        self.observation.pressure_mb = Some(pressure);
        self
    }

    pub fn cloud(mut self, cloud: f64) -> Self {
        self.observation.cloud = Some(cloud);
        self
    }

    pub fn precip_mm(mut self, precip: f64) -> Self {
        self.observation.precip_mm = Some(precip);
        self
    }

    pub fn visibility_km(mut self, visibility: f64) -> Self {
        self.observation.visibility_km = Some(visibility);
        self
    }

    pub fn uv_index(mut self, uv: f64) -> Self {
        self.observation.uv_index = Some(uv);
        self
    }

    pub fn particulates(mut self, pm2_5: f64, pm10: f64) -> Self {
        self.observation.pm2_5 = Some(pm2_5);
        self.observation.pm10 = Some(pm10);
        self
    }

    pub fn pm2_5(mut self, value: f64) -> Self {
        self.observation.pm2_5 = Some(value);
        self
    }

    pub fn pm10(mut self, value: f64) -> Self {
        self.observation.pm10 = Some(value);
        self
    }

    pub fn us_epa_index(mut self, index: i32) -> Self {
        self.observation.us_epa_index = Some(index);
        self
    }

    pub fn sun(mut self, sunrise: impl Into<String>, sunset: impl Into<String>) -> Self {
        self.observation.sunrise = Some(sunrise.into());
        self.observation.sunset = Some(sunset.into());
        self
    }

    pub fn moon(mut self, moonrise: impl Into<String>, moonset: impl Into<String>) -> Self {
        self.observation.moonrise = Some(moonrise.into());
        self.observation.moonset = Some(moonset.into());
        self
    }

    pub fn sunrise(mut self, sunrise: impl Into<String>) -> Self {
        self.observation.sunrise = Some(sunrise.into());
        self
    }

    pub fn sunset(mut self, sunset: impl Into<String>) -> Self {
        self.observation.sunset = Some(sunset.into());
        self
    }

    pub fn moonrise(mut self, moonrise: impl Into<String>) -> Self {
        self.observation.moonrise = Some(moonrise.into());
        self
    }

    pub fn moonset(mut self, moonset: impl Into<String>) -> Self {
        self.observation.moonset = Some(moonset.into());
        self
    }

    pub fn moon_phase(mut self, phase: impl Into<String>) -> Self {
        self.observation.moon_phase = Some(phase.into());
        self
    }

    pub fn moon_illumination(mut self, illumination: f64) -> Self {
        self.observation.moon_illumination = Some(illumination);
        self
    }

    pub fn condition(mut self, text: impl Into<String>) -> Self {
        self.observation.condition_text = Some(text.into());
        self
    }

    /// Set any numeric column by its [`Measure`].
    ///
    /// The US EPA index only accepts whole numbers; anything else leaves it null.
    pub fn measure(mut self, measure: Measure, value: f64) -> Self {
        let o = &mut self.observation;
        let slot = match measure {
            Measure::Temperature => &mut o.temperature_celsius,
            Measure::FeelsLike => &mut o.feels_like_celsius,
            Measure::Humidity => &mut o.humidity,
            Measure::WindMph => &mut o.wind_mph,
            Measure::PressureMb => &mut o.pressure_mb,
            Measure::Cloud => &mut o.cloud,
            Measure::PrecipMm => &mut o.precip_mm,
            Measure::VisibilityKm => &mut o.visibility_km,
            Measure::UvIndex => &mut o.uv_index,
            Measure::Pm25 => &mut o.pm2_5,
            Measure::Pm10 => &mut o.pm10,
            Measure::NitrogenDioxide => &mut o.nitrogen_dioxide,
            Measure::SulphurDioxide => &mut o.sulphur_dioxide,
            Measure::CarbonMonoxide => &mut o.carbon_monoxide,
            Measure::Ozone => &mut o.ozone,
            Measure::MoonIllumination => &mut o.moon_illumination,
            Measure::UsEpaIndex => {
                let whole = value.fract() == 0.0
                    && value >= f64::from(i32::MIN)
                    && value <= f64::from(i32::MAX);
                o.us_epa_index = whole.then_some(value as i32);
                return self;
            }
        };
        *slot = Some(value);
        self
    }

    pub fn build(self) -> Result<Observation> {
        let country = self
            .country
            .ok_or_else(|| ProcessingError::MissingData("country".to_string()))?;
        let location_name = self
            .location_name
            .ok_or_else(|| ProcessingError::MissingData("location_name".to_string()))?;
        let continent = self
            .continent
            .unwrap_or_else(|| resolve_continent(&country));
        let o = self.observation;

        let observation = Observation {
            country,
            location_name,
            continent,
            latitude: o.latitude,
            longitude: o.longitude,
            timezone: o.timezone,
            last_updated: o.last_updated,
            temperature_celsius: o.temperature_celsius,
            feels_like_celsius: o.feels_like_celsius,
            humidity: o.humidity,
            wind_mph: o.wind_mph,
            wind_direction: o.wind_direction,
            pressure_mb: o.pressure_mb,
            cloud: o.cloud,
            precip_mm: o.precip_mm,
            visibility_km: o.visibility_km,
            uv_index: o.uv_index,
            pm2_5: o.pm2_5,
            pm10: o.pm10,
            nitrogen_dioxide: o.nitrogen_dioxide,
            sulphur_dioxide: o.sulphur_dioxide,
            carbon_monoxide: o.carbon_monoxide,
            ozone: o.ozone,
            us_epa_index: o.us_epa_index,
            sunrise: o.sunrise,
            sunset: o.sunset,
            moonrise: o.moonrise,
            moonset: o.moonset,
            moon_phase: o.moon_phase,
            moon_illumination: o.moon_illumination,
            condition_text: o.condition_text,
        };

        observation.validate()?;
        Ok(observation)
    }
}
