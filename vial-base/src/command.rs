//! Command-line interface for applications bootstrapped from a vial container.
//!
//! Commands are registered in a [`CommandRegistry`] and receive the frozen container
//! once configuration has been loaded and stored in it.
//!
//! # Examples
//!
//! ```rust
//! use std::process::ExitCode;
//! use std::sync::Arc;
//!
//! use clap::{ArgMatches, Command as ClapCommand};
//! use vial::{Container, ResolverExt as _};
//! use vial_base::{Command, CommandRegistry, RunMainExt as _};
//!
//! struct HelloCommand;
//!
//! impl Command for HelloCommand {
//!     fn command() -> ClapCommand {
//!         ClapCommand::new("hello").about("Prints a greeting")
//!     }
//!
//!     fn main(container: Arc<Container>, _matches: ArgMatches) -> ExitCode {
//!         println!("{}", container.must_service_as::<String>("greeting"));
//!         ExitCode::SUCCESS
//!     }
//! }
//!
//! let mut dic = Container::new();
//! dic.register("greeting", |_| Ok("Hello, World!".to_string()));
//! let mut commands = CommandRegistry::default();
//! commands.add_command::<HelloCommand>();
//! let code = dic.run_main_from(commands, ["app", "hello"]);
//! assert_eq!(code, ExitCode::SUCCESS);
//! ```

use std::any::TypeId;
use std::collections::HashMap;
use std::ffi::OsString;
use std::marker::PhantomData;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Arg, ArgAction, ArgMatches};
use vial::{Container, ResolverExt as _, StdError};

use crate::{
    CONFIG_PARAM, Config, ConfigSection as _, StoreConfigExt as _, Tracing, TracingConfig,
};

/// Trait for defining CLI subcommands that run against the frozen container.
pub trait Command {
    /// Defines the CLI command structure for this command.
    fn command() -> clap::Command
    where
        Self: Sized;

    /// Executes the command with the frozen container and its parsed arguments.
    fn main(container: Arc<Container>, matches: ArgMatches) -> ExitCode
    where
        Self: Sized,
    {
        let _ = (container, matches);
        ExitCode::FAILURE
    }
}

trait DynCommand {
    fn command(&self) -> clap::Command;

    fn main(&self, container: Arc<Container>, matches: ArgMatches) -> ExitCode;
}

struct CommandWrapper<T>(PhantomData<fn() -> T>);

impl<T> DynCommand for CommandWrapper<T>
where
    T: Command,
{
    fn command(&self) -> clap::Command {
        T::command()
    }

    fn main(&self, container: Arc<Container>, matches: ArgMatches) -> ExitCode {
        T::main(container, matches)
    }
}

/// Registry of the subcommands available to [`RunMainExt::run_main`].
#[derive(Default)]
pub struct CommandRegistry {
    commands: HashMap<TypeId, Box<dyn DynCommand>>,
}

impl CommandRegistry {
    /// Registers a command type with the registry.
    pub fn add_command<T>(&mut self) -> &mut Self
    where
        T: Command + 'static,
    {
        let type_id = TypeId::of::<T>();
        self.commands
            .insert(type_id, Box::new(CommandWrapper::<T>(PhantomData)));
        self
    }

    /// Checks if a command type has been registered.
    pub fn has_command<T>(&self) -> bool
    where
        T: Command + 'static,
    {
        let type_id = TypeId::of::<T>();
        self.commands.contains_key(&type_id)
    }

    /// Builds the CLI with every registered command as a subcommand, plus the
    /// config file options shared by all of them.
    pub fn build_cli(&self) -> clap::Command {
        let mut subcommands: Vec<_> = self.commands.values().map(|v| v.command()).collect();
        subcommands.sort_by(|a, b| a.get_name().cmp(b.get_name()));
        clap::Command::default()
            .subcommand_required(true)
            .arg(Arg::new("config").long("config").short('c'))
            .arg(
                Arg::new("config-override")
                    .long("config-override")
                    .short('o')
                    .action(ArgAction::Append),
            )
            .subcommands(subcommands)
    }

    /// Executes the subcommand selected in `matches`.
    pub fn run(&self, container: Arc<Container>, mut matches: ArgMatches) -> ExitCode {
        let Some((name, matches)) = matches.remove_subcommand() else {
            return ExitCode::FAILURE;
        };
        match self
            .commands
            .values()
            .find(|v| v.command().get_name() == name)
        {
            Some(command) => command.main(container, matches),
            None => ExitCode::FAILURE,
        }
    }

    /// Returns the number of registered commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Checks if the registry has no registered commands.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Extension trait for running a container as a command-line application.
pub trait RunMainExt {
    /// Runs the application with the process arguments.
    fn run_main(self, commands: CommandRegistry) -> ExitCode;

    /// Runs the application with the given arguments.
    ///
    /// This method:
    /// 1. Registers the built-in `names` and `config` commands if not already present
    /// 2. Parses the arguments
    /// 3. Loads and merges the configuration files
    /// 4. Sets up tracing
    /// 5. Stores the configuration and freezes the container
    /// 6. Executes the selected command
    fn run_main_from<I, T>(self, commands: CommandRegistry, args: I) -> ExitCode
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone;
}

impl RunMainExt for Container {
    fn run_main(self, commands: CommandRegistry) -> ExitCode {
        self.run_main_from(commands, std::env::args_os())
    }

    fn run_main_from<I, T>(mut self, mut commands: CommandRegistry, args: I) -> ExitCode
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        if !commands.has_command::<NamesCommand>() {
            commands.add_command::<NamesCommand>();
        }
        if !commands.has_command::<ConfigCommand>() {
            commands.add_command::<ConfigCommand>();
        }
        let matches = match commands.build_cli().try_get_matches_from(args) {
            Ok(v) => v,
            Err(err) => {
                let _ = err.print();
                return if err.use_stderr() {
                    ExitCode::FAILURE
                } else {
                    ExitCode::SUCCESS
                };
            }
        };
        let config = match load_config(&matches) {
            Ok(v) => v,
            Err(err) => {
                eprintln!("Cannot load config: {err}");
                return ExitCode::FAILURE;
            }
        };
        if let Err(err) = setup_tracing(&config) {
            eprintln!("Cannot setup tracing: {err}");
            return ExitCode::FAILURE;
        }
        self.store_config(config).freeze();
        tracing::debug!(names = ?self.names(), "Container frozen");
        commands.run(Arc::new(self), matches)
    }
}

fn load_config(matches: &ArgMatches) -> Result<Config, StdError> {
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => Config::parse_file(path)?,
        None => Config::new(),
    };
    let config_override_paths = matches
        .get_many::<String>("config-override")
        .unwrap_or_default();
    for path in config_override_paths {
        config.merge_from(Config::parse_file(path)?);
    }
    Ok(config)
}

fn setup_tracing(config: &Config) -> Result<(), StdError> {
    let tracing_config = config
        .get::<Option<TracingConfig>>(TracingConfig::key())?
        .unwrap_or_default();
    Tracing::init(&tracing_config)
}

/// Built-in command printing the names of all parameters and services as JSON.
pub struct NamesCommand;

impl Command for NamesCommand {
    fn command() -> clap::Command {
        clap::Command::new("names").about("Lists parameter and service names")
    }

    fn main(container: Arc<Container>, _matches: ArgMatches) -> ExitCode {
        print_json(&container.names())
    }
}

/// Built-in command printing the loaded configuration as JSON.
pub struct ConfigCommand;

impl Command for ConfigCommand {
    fn command() -> clap::Command {
        clap::Command::new("config").about("Prints the loaded configuration")
    }

    fn main(container: Arc<Container>, _matches: ArgMatches) -> ExitCode {
        match container.param_as::<Config>(CONFIG_PARAM) {
            Ok(config) => print_json(&config.configs),
            Err(err) => {
                eprintln!("{err}");
                ExitCode::FAILURE
            }
        }
    }
}

fn print_json<T>(value: &T) -> ExitCode
where
    T: serde::Serialize,
{
    match serde_json::to_string_pretty(value) {
        Ok(text) => {
            println!("{text}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
