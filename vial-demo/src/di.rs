use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;

use clap::ArgMatches;
use vial::{Container, Resolver, ResolverExt as _, StdError};
use vial_base::Command;

use crate::{AppFeature, Logger, Writer};

pub const NAME_PARAM: &str = "name";
pub const WRITER_PARAM: &str = "writer";
pub const APP_SERVICE: &str = "app";
pub const LOGGER_SERVICE: &str = "logger";

/// Typed accessors over the untyped container lookups.
pub trait AppResolverExt: Resolver {
    fn logger(&self) -> Arc<Logger> {
        self.must_service_as(LOGGER_SERVICE)
    }

    fn app(&self) -> Arc<AppFeature> {
        self.must_service_as(APP_SERVICE)
    }

    fn name(&self) -> Arc<String> {
        self.must_param_as(NAME_PARAM)
    }
}

impl<R> AppResolverExt for R where R: Resolver + ?Sized {}

/// Assembles the parameters and services of the application.
///
/// The returned container is not frozen yet.
pub fn resolve(writer: Box<dyn Write + Send>, name: impl Into<String>) -> Container {
    let mut dic = Container::new();
    dic.store(NAME_PARAM, name.into())
        .store(WRITER_PARAM, Writer::new(writer))
        .register_inject::<AppFeature>(APP_SERVICE)
        .register(LOGGER_SERVICE, logger_service);
    dic
}

/// Builds the logger over the `writer` parameter.
fn logger_service(r: &dyn Resolver) -> Result<Logger, StdError> {
    let writer = r.param_as::<Writer>(WRITER_PARAM)?;
    Ok(Logger::new(writer))
}

/// Command running the application feature.
pub struct RunCommand;

impl Command for RunCommand {
    fn command() -> clap::Command {
        clap::Command::new("run").about("Runs the application")
    }

    fn main(container: Arc<Container>, _matches: ArgMatches) -> ExitCode {
        let app = container.app();
        match app.run() {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                tracing::error!(error = %err, "App failed");
                ExitCode::FAILURE
            }
        }
    }
}
