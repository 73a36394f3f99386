pub mod continent;
pub mod dataset;
pub mod measure;
pub mod observation;

pub use continent::Continent;
pub use dataset::Dataset;
pub use measure::{Aggregation, Measure};
pub use observation::{Observation, ObservationBuilder};
