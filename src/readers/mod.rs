pub mod dataset_cache;
pub mod observation_reader;

pub use dataset_cache::DatasetCache;
pub use observation_reader::ObservationReader;
