//! Interactive console for firelayer stores.
//!
//! The console runs raw path commands (`get books/b1`, `ls books/b1/tags`) against
//! the current connection, and model commands (`find Book b1`, `rel Book b1 user`)
//! against the models registered in a [`Registry`]. Programs embed it by passing
//! their own registry:
//!
//! ```ignore
//! let mut registry = Registry::new();
//! registry.register::<Book>().belongs_to::<Book, User>("user_id", None);
//!
//! Connection::initialize(InMemoryStore::new());
//! firelayer_console::repl::run(Console::new(registry)).await?;
//! ```

#[allow(unused_extern_crates)]
extern crate self as firelayer_console;

pub mod commands;
pub mod error;
pub mod executor;
pub mod formatter;
pub mod repl;

use firelayer::registry::Registry;

pub use commands::Command;
pub use error::{ConsoleError, ConsoleResult};
pub use executor::CommandResult;
pub use formatter::OutputFormat;

/// A console session over a set of registered models.
#[derive(Debug)]
pub struct Console {
    registry: Registry,
    format: OutputFormat,
}

impl Console {
    /// Creates a console over `registry`, resolving its pending relationships.
    pub fn new(mut registry: Registry) -> Self {
        registry.resolve();

        Self {
            registry,
            format: OutputFormat::default(),
        }
    }

    /// Sets the output format.
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// The registered models.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Parses and runs one line.
    pub async fn execute(&self, line: &str) -> ConsoleResult<CommandResult> {
        let command = commands::parse(line)?;
        let formatter = formatter::create_formatter(self.format);

        executor::execute(&self.registry, command, &*formatter).await
    }

    /// Runs every non-empty, non-comment line of a script, reporting failures and
    /// continuing with the next line.
    pub async fn run_script(&self, script: &str) -> Vec<(String, ConsoleResult<CommandResult>)> {
        let mut results = Vec::new();

        for line in script
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with("//") && !l.starts_with('#'))
        {
            results.push((line.to_string(), self.execute(line).await));
        }

        results
    }
}
