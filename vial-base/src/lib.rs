//! # vial-base
//!
//! Bootstrap utilities for applications assembled in a [`vial::Container`]:
//!
//! - **Configuration**: JSON config files merged into a [`Config`] stored as a container parameter
//! - **Tracing**: Global `tracing` subscriber configured from the `tracing` config section
//! - **Commands**: CLI subcommands dispatched by [`RunMainExt::run_main`] once the container is frozen
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::process::ExitCode;
//! use std::sync::Arc;
//!
//! use clap::{ArgMatches, Command as ClapCommand};
//! use vial::Container;
//! use vial_base::{Command, CommandRegistry, RunMainExt as _};
//!
//! struct ServeCommand;
//!
//! impl Command for ServeCommand {
//!     fn command() -> ClapCommand {
//!         ClapCommand::new("serve")
//!     }
//!
//!     fn main(container: Arc<Container>, _matches: ArgMatches) -> ExitCode {
//!         tracing::info!(names = ?container.names(), "Serving");
//!         ExitCode::SUCCESS
//!     }
//! }
//!
//! fn main() -> ExitCode {
//!     let mut commands = CommandRegistry::default();
//!     commands.add_command::<ServeCommand>();
//!     Container::new().run_main(commands)
//! }
//! ```

mod command;
mod config;
mod tracing;

pub use self::command::*;
pub use self::config::*;
pub use self::tracing::*;
