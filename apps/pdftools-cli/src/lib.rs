//! Command-line front end for the PDF operations

pub mod cli;
pub mod output;
pub mod run;

pub use cli::{Cli, Command};
pub use run::run;
