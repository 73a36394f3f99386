pub mod analyzers;
pub mod cli;
pub mod error;
pub mod geolocation;
pub mod models;
pub mod processors;
pub mod readers;
pub mod settings;
pub mod utils;
pub mod writers;

pub use error::{ProcessingError, Result};
pub use models::{Continent, Dataset, Measure, Observation};
pub use processors::{FilterEngine, FilterOutcome, FilterSpec, FilteredView};
pub use readers::{DatasetCache, ObservationReader};
