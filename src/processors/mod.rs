pub mod filter_engine;

pub use filter_engine::{
    CascadeOptions, DateFilter, FilterEngine, FilterOutcome, FilterSpec, FilteredView,
    NumericRange, Selection,
};
