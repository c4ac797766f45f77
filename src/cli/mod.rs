//! Command-Line Interface
//!
//! One module per subcommand under [`commands`]; shared terminal output
//! helpers under [`ui`]. The merged configuration is loaded once in `main`
//! and passed into each command.

pub mod commands;
pub mod ui;
