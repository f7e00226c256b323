#![forbid(unsafe_code)]

pub mod cli;
pub mod document;
pub mod error;
pub mod script;

pub use cli::run_from_env;
pub use error::{CliError, Result};
