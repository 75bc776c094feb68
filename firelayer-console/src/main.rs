//! firelayer console binary.
//!
//! Connects to a store and opens the interactive console, runs a single command,
//! or runs a script of commands.

use clap::{Parser, ValueEnum};
use firelayer::{
    bson::Bson,
    connection::Connection,
    json::json_to_bson,
    memory::InMemoryStore,
    registry::Registry,
};
use firelayer_console::{Console, ConsoleError, OutputFormat, executor::CommandResult, repl};
use std::path::PathBuf;
use tracing::info;

/// Which store backend to connect to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// In-process store, optionally seeded from a JSON file
    Memory,
    /// MongoDB (requires the `mongodb` feature)
    Mongodb,
}

/// firelayer console
#[derive(Parser, Debug)]
#[command(name = "firelayer-console")]
#[command(version, about = "Interactive console for firelayer document stores")]
pub struct Args {
    /// Store backend
    #[arg(long, default_value = "memory", value_enum)]
    pub backend: Backend,

    /// MongoDB connection string
    #[arg(long, env = "FIRELAYER_DSN", default_value = "mongodb://localhost:27017")]
    pub dsn: String,

    /// MongoDB database name
    #[arg(long, env = "FIRELAYER_DATABASE", default_value = "firelayer")]
    pub database: String,

    /// JSON file of `{ "<collection path>": { "<id>": { ...fields } } }` to load into the memory store
    #[arg(long)]
    pub seed: Option<PathBuf>,

    /// Execute a single command and exit
    #[arg(short = 'c', long)]
    pub command: Option<String>,

    /// Execute commands from file
    #[arg(short = 'f', long)]
    pub file: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "pretty", value_enum)]
    pub format: OutputFormat,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("firelayer=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    connect(&args).await?;

    let console = Console::new(Registry::new()).with_format(args.format);

    if let Some(command) = &args.command {
        run_command_mode(&console, command).await
    } else if let Some(file) = &args.file {
        run_script_mode(&console, file).await
    } else {
        repl::run(console).await
    }
}

async fn connect(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    match args.backend {
        Backend::Memory => {
            let mut builder = InMemoryStore::builder();
            if let Some(path) = &args.seed {
                let seed = serde_json::from_str(&std::fs::read_to_string(path)?)
                    .map_err(ConsoleError::from)?;
                match json_to_bson(seed) {
                    Bson::Document(document) => builder = builder.seed(document),
                    _ => {
                        return Err(ConsoleError::Usage(
                            "seed file must hold a JSON object".to_string(),
                        )
                        .into());
                    }
                }
            }
            Connection::initialize_with(builder).await?;
            info!("connected to in-memory store");
        }
        #[cfg(feature = "mongodb")]
        Backend::Mongodb => {
            Connection::initialize_with(firelayer::mongodb::MongoDbStore::builder(
                &args.dsn,
                &args.database,
            ))
            .await?;
            info!(database = %args.database, "connected to MongoDB");
        }
        #[cfg(not(feature = "mongodb"))]
        Backend::Mongodb => {
            return Err(ConsoleError::Usage(format!(
                "built without the mongodb feature; cannot connect to {} ({})",
                args.dsn, args.database
            ))
            .into());
        }
    }

    Ok(())
}

/// Execute a single command and exit.
async fn run_command_mode(
    console: &Console,
    command: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    match console.execute(command).await? {
        CommandResult::Output(output) => println!("{output}"),
        CommandResult::Exit | CommandResult::ShowHistory | CommandResult::Clear => {}
    }
    Ok(())
}

/// Execute commands from a file, continuing past failures.
async fn run_script_mode(
    console: &Console,
    file: &PathBuf,
) -> Result<(), Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(file)?;

    for (line, result) in console.run_script(&content).await {
        match result {
            Ok(CommandResult::Output(output)) => {
                if !output.is_empty() {
                    println!("{output}");
                }
            }
            Ok(CommandResult::Exit) => break,
            Ok(_) => {}
            Err(e) => eprintln!("Error executing '{line}': {e}"),
        }
    }

    Ok(())
}
