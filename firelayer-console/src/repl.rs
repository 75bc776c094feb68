//! Interactive REPL implementation.

use rustyline::{
    Config, DefaultEditor,
    error::ReadlineError,
    history::History,
};
use std::path::PathBuf;

use crate::{Console, executor::CommandResult};

/// Get the history file path.
fn history_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".firelayer_history")
}

/// Run the interactive REPL until `.exit` or end of input.
pub async fn run(console: Console) -> Result<(), Box<dyn std::error::Error>> {
    let rl_config = Config::builder()
        .history_ignore_space(true)
        .auto_add_history(true)
        .build();
    let mut rl = DefaultEditor::with_config(rl_config)?;

    let hist_path = history_path();
    if hist_path.exists() {
        let _ = rl.load_history(&hist_path);
    }

    println!("firelayer console - Type .help for commands, .exit to quit\n");

    loop {
        match rl.readline("firelayer> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                match console.execute(line).await {
                    Ok(CommandResult::Output(output)) => {
                        if !output.is_empty() {
                            println!("{output}");
                        }
                    }
                    Ok(CommandResult::Exit) => {
                        println!("Bye");
                        break;
                    }
                    Ok(CommandResult::ShowHistory) => {
                        let history = rl.history();
                        let start = history.len().saturating_sub(20);
                        for (i, entry) in history.iter().skip(start).enumerate() {
                            println!("{:4}  {}", start + i + 1, entry);
                        }
                    }
                    Ok(CommandResult::Clear) => {
                        print!("\x1B[2J\x1B[1;1H");
                    }
                    Err(e) => println!("Error: {e}"),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("Bye");
                break;
            }
            Err(err) => {
                println!("Error: {err:?}");
                break;
            }
        }
    }

    let _ = rl.save_history(&hist_path);

    Ok(())
}
