/// Column identifiers the loader cannot do without
pub const COL_COUNTRY: &str = "country";
pub const COL_LOCATION: &str = "location_name";
pub const COL_LATITUDE: &str = "latitude";
pub const COL_LONGITUDE: &str = "longitude";
pub const COL_TEMPERATURE: &str = "temperature_celsius";
pub const COL_HUMIDITY: &str = "humidity";
pub const COL_WIND_MPH: &str = "wind_mph";

pub const REQUIRED_COLUMNS: [&str; 7] = [
    COL_COUNTRY,
    COL_LOCATION,
    COL_LATITUDE,
    COL_LONGITUDE,
    COL_TEMPERATURE,
    COL_HUMIDITY,
    COL_WIND_MPH,
];

/// Optional non-measure columns
pub const COL_TIMEZONE: &str = "timezone";
pub const COL_LAST_UPDATED: &str = "last_updated";
pub const COL_WIND_DIRECTION: &str = "wind_direction";
pub const COL_SUNRISE: &str = "sunrise";
pub const COL_SUNSET: &str = "sunset";
pub const COL_MOONRISE: &str = "moonrise";
pub const COL_MOONSET: &str = "moonset";
pub const COL_MOON_PHASE: &str = "moon_phase";
pub const COL_CONDITION: &str = "condition_text";
pub const COL_CONTINENT: &str = "continent";

/// Timestamp formats
pub const PRIMARY_TIMESTAMP_FORMAT: &str = "%d-%m-%Y %H:%M";
pub const TIME_OF_DAY_FORMAT: &str = "%I:%M %p";

/// Geographic bounds
pub const MIN_LATITUDE: f64 = -90.0;
pub const MAX_LATITUDE: f64 = 90.0;
pub const MIN_LONGITUDE: f64 = -180.0;
pub const MAX_LONGITUDE: f64 = 180.0;

/// US EPA index bounds
pub const MIN_AQI: u8 = 1;
pub const MAX_AQI: u8 = 6;

/// Composite pollution score weights (AQI, PM2.5, PM10)
pub const SCORE_WEIGHT_AQI: f64 = 0.5;
pub const SCORE_WEIGHT_PM2_5: f64 = 0.3;
pub const SCORE_WEIGHT_PM10: f64 = 0.2;

/// Defaults
pub const DEFAULT_DATASET_PATH: &str = "data/processed/processed_weather_data.csv";
pub const DEFAULT_CONFIG_FILE: &str = "weather-insights.toml";
pub const DEFAULT_COUNTRY: &str = "India";
pub const DEFAULT_CONTINENT: &str = "Asia";
pub const DEFAULT_GEOLOCATION_ENDPOINT: &str = "https://ipinfo.io/json";
pub const DEFAULT_GEOLOCATION_TIMEOUT_MS: u64 = 1500;
pub const DEFAULT_TOP_N: usize = 5;
pub const ENV_PREFIX: &str = "WEATHER_INSIGHTS";
