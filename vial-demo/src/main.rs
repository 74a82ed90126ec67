use std::process::ExitCode;

use vial_base::{CommandRegistry, RunMainExt as _};
use vial_demo::{RunCommand, resolve};

fn main() -> ExitCode {
    let name = std::env::args().next().unwrap_or_else(|| "vial-demo".into());
    let mut commands = CommandRegistry::default();
    commands.add_command::<RunCommand>();
    resolve(Box::new(std::io::stdout()), name).run_main(commands)
}
