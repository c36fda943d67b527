//! CLI command implementations for statline.
//!
//! This module provides implementations for all CLI subcommands:
//! - `views`: View listing
//! - `config`: Configuration file generation
//! - `check`: Configuration, view and source validation
//! - `generate`: Synthetic status dump generation

pub mod check;
pub mod config;
pub mod generate;
pub mod views;

// Re-export command functions
pub use check::command_check;
pub use config::command_config;
pub use generate::command_generate_testdata;
pub use views::command_views;
