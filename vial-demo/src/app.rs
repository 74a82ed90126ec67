use std::io::Write;
use std::sync::Arc;

use parking_lot::Mutex;
use vial::{Inject, StdError};

/// Shared output sink of the application.
pub type Writer = Mutex<Box<dyn Write + Send>>;

/// Line logger writing to the application [`Writer`].
pub struct Logger {
    writer: Arc<Writer>,
}

impl Logger {
    pub fn new(writer: Arc<Writer>) -> Self {
        Self { writer }
    }

    pub fn log(&self, message: &str) -> std::io::Result<()> {
        let mut writer = self.writer.lock();
        writeln!(writer, "{message}")?;
        writer.flush()
    }
}

/// The application feature: logs the application name when run.
#[derive(Inject)]
pub struct AppFeature {
    #[param("name")]
    name: String,
    #[service("logger")]
    logger: Arc<Logger>,
}

impl AppFeature {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn run(&self) -> Result<(), StdError> {
        tracing::info!(name = %self.name, "Running app feature");
        self.logger.log(&self.name)?;
        Ok(())
    }
}
