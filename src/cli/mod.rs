pub mod args;
pub mod commands;

pub use args::{Cli, Commands, FilterArgs};
pub use commands::{run, setup_logging};
