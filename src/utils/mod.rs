pub mod constants;
pub mod coordinates;
pub mod geography;
pub mod progress;
pub mod timestamp;

pub use constants::*;
pub use coordinates::{coerce_latitude, coerce_longitude, coerce_number};
pub use geography::{resolve_continent, ContinentResolver};
pub use progress::ProgressReporter;
pub use timestamp::{format_last_updated, parse_last_updated, parse_time_of_day};
