pub mod aggregation;
pub mod air_quality;
pub mod astronomy;
pub mod categories;
pub mod ranking;
pub mod statistics;
pub mod summary;

pub use aggregation::{count_by, group_aggregate, AggregateRow, CategoryCount, GroupId, GroupKey, Grouping, TimeBucket};
pub use air_quality::{location_table, pollution_extremes, LocationAirQuality, PollutionExtremes, ScoredLocation};
pub use astronomy::{moon_illumination, moon_times, sun_position, MoonIllumination, MoonTimes, SunPosition};
pub use categories::{AqiCategory, ConditionGroup, ParticulateCategory};
pub use ranking::{top_n, Direction};
pub use statistics::{correlation, correlation_matrix, describe, CorrelationMatrix, MeasureStats};
pub use summary::{WeatherAnalyzer, WeatherSummary};
