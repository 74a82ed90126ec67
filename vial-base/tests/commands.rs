use std::ffi::OsString;
use std::io::Write as _;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU16, Ordering};

use clap::{Arg, ArgMatches, Command as ClapCommand};
use tempfile::NamedTempFile;
use vial::{Container, ResolverExt as _};
use vial_base::{
    Command, CommandRegistry, ConfigCommand, ConfigResolverExt as _, ConfigSection, NamesCommand,
    RunMainExt as _,
};

#[derive(serde::Deserialize)]
struct ServerConfig {
    port: u16,
}

impl ConfigSection for ServerConfig {
    fn key() -> &'static str {
        "server"
    }
}

static SERVED_PORT: AtomicU16 = AtomicU16::new(0);

struct ServeCommand;

impl Command for ServeCommand {
    fn command() -> ClapCommand {
        ClapCommand::new("serve").about("Serve command for testing")
    }

    fn main(container: Arc<Container>, _matches: ArgMatches) -> ExitCode {
        assert!(container.is_frozen());
        let port = container.must_service_as::<u16>("port");
        SERVED_PORT.store(*port, Ordering::SeqCst);
        ExitCode::SUCCESS
    }
}

static MOCK_CALLED: AtomicBool = AtomicBool::new(false);

struct MockCommand;

impl Command for MockCommand {
    fn command() -> ClapCommand {
        ClapCommand::new("mock")
            .about("Mock command for testing")
            .arg(Arg::new("test-arg").long("test-arg"))
    }

    fn main(_container: Arc<Container>, matches: ArgMatches) -> ExitCode {
        MOCK_CALLED.store(true, Ordering::SeqCst);
        if matches.get_one::<String>("test-arg").is_some() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }
}

struct DefaultCommand;

impl Command for DefaultCommand {
    fn command() -> ClapCommand {
        ClapCommand::new("default")
    }
}

fn container() -> Container {
    let mut dic = Container::new();
    dic.register("port", |r| Ok(r.config_section::<ServerConfig>()?.port));
    dic
}

fn write_config(text: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file
}

#[test]
fn test_command_registry_new() {
    let registry = CommandRegistry::default();
    assert_eq!(registry.len(), 0);
    assert!(registry.is_empty());
}

#[test]
fn test_command_registry_add_command() {
    let mut registry = CommandRegistry::default();
    registry
        .add_command::<MockCommand>()
        .add_command::<ServeCommand>()
        .add_command::<MockCommand>();
    assert_eq!(registry.len(), 2);
    assert!(registry.has_command::<MockCommand>());
    assert!(!registry.has_command::<DefaultCommand>());
}

#[test]
fn test_command_registry_build_cli() {
    let mut registry = CommandRegistry::default();
    registry
        .add_command::<ServeCommand>()
        .add_command::<MockCommand>();
    let cli = registry.build_cli();
    let names: Vec<_> = cli.get_subcommands().map(|v| v.get_name()).collect();
    assert_eq!(names, ["mock", "serve"]);
    assert!(cli.get_arguments().any(|v| v.get_id() == "config"));
    assert!(cli.get_arguments().any(|v| v.get_id() == "config-override"));
}

#[test]
fn test_command_registry_run() {
    let mut registry = CommandRegistry::default();
    registry.add_command::<MockCommand>();
    let matches = registry
        .build_cli()
        .try_get_matches_from(["app", "mock", "--test-arg", "value"])
        .unwrap();
    let code = registry.run(Arc::new(Container::new()), matches);
    assert_eq!(code, ExitCode::SUCCESS);
    assert!(MOCK_CALLED.load(Ordering::SeqCst));
}

#[test]
fn test_default_command_fails() {
    let mut registry = CommandRegistry::default();
    registry.add_command::<DefaultCommand>();
    let code = Container::new().run_main_from(registry, ["app", "default"]);
    assert_eq!(code, ExitCode::FAILURE);
}

#[test]
fn test_run_main_with_config() {
    let config = write_config(r#"{"server": {"port": 8080}}"#);
    let config_override = write_config(r#"{"server": {"port": 9090}}"#);
    let mut registry = CommandRegistry::default();
    registry.add_command::<ServeCommand>();
    let args: Vec<OsString> = vec![
        "app".into(),
        "--config".into(),
        config.path().into(),
        "-o".into(),
        config_override.path().into(),
        "serve".into(),
    ];
    let code = container().run_main_from(registry, args);
    assert_eq!(code, ExitCode::SUCCESS);
    assert_eq!(SERVED_PORT.load(Ordering::SeqCst), 9090);
}

#[test]
fn test_run_main_missing_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.json");
    let mut registry = CommandRegistry::default();
    registry.add_command::<ServeCommand>();
    let args: Vec<OsString> = vec!["app".into(), "-c".into(), path.into(), "serve".into()];
    let code = container().run_main_from(registry, args);
    assert_eq!(code, ExitCode::FAILURE);
}

#[test]
fn test_run_main_builtin_commands() {
    let code = container().run_main_from(CommandRegistry::default(), ["app", "names"]);
    assert_eq!(code, ExitCode::SUCCESS);
    let code = container().run_main_from(CommandRegistry::default(), ["app", "config"]);
    assert_eq!(code, ExitCode::SUCCESS);
    let mut registry = CommandRegistry::default();
    registry
        .add_command::<NamesCommand>()
        .add_command::<ConfigCommand>();
    assert_eq!(registry.len(), 2);
}

#[test]
fn test_run_main_invalid_args() {
    let code = container().run_main_from(CommandRegistry::default(), ["app"]);
    assert_eq!(code, ExitCode::FAILURE);
    let code = container().run_main_from(CommandRegistry::default(), ["app", "unknown"]);
    assert_eq!(code, ExitCode::FAILURE);
}

#[test]
fn test_run_main_invalid_tracing_directive() {
    let config = write_config(r#"{"tracing": {"directives": ["=[bad"]}}"#);
    let args: Vec<OsString> = vec![
        "app".into(),
        "-c".into(),
        config.path().into(),
        "names".into(),
    ];
    let code = container().run_main_from(CommandRegistry::default(), args);
    assert_eq!(code, ExitCode::FAILURE);
}
