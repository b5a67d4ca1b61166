//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.
//!
//! # Architecture
//!
//! Commands are dispatched via [`CommandDispatcher`], which routes CLI
//! subcommands to their implementations. This allows:
//! - Single binary with subcommands (`warble setup`, `warble fetch`)
//! - Shared initialization logic
//! - Consistent global flag handling

pub mod clean;
pub mod completions;
pub mod dispatcher;
pub mod embed;
pub mod fetch;
pub mod setup;
pub mod status;

pub use dispatcher::{Command, CommandDispatcher, CommandResult};
