#![forbid(unsafe_code)]

use std::env;
use std::io::{self, BufRead, IsTerminal};
use std::sync::Arc;

use noor_storage::FileKvStore;
use noor_tools::cli::{execute_command, NoorContext, PinPrompt};
use noor_tools::config::ToolConfig;
use tracing_subscriber::EnvFilter;

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

fn run() -> Result<(), String> {
    let config = ToolConfig::from_env()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.log_filter))
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let store = FileKvStore::default_local();
    tracing::debug!(path = %store.path().display(), "using store");
    let mut ctx = NoorContext::with_seed(Arc::new(store), config)?;
    let output = execute_command(&mut ctx, &args, &mut TerminalPins)?;
    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}

struct TerminalPins;

impl PinPrompt for TerminalPins {
    fn read_pin(&mut self, prompt: &str) -> Result<String, String> {
        if io::stdin().is_terminal() {
            return rpassword::prompt_password(prompt).map_err(|e| e.to_string());
        }
        // Piped input: one PIN per line.
        let mut line = String::new();
        io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|e| e.to_string())?;
        let pin = line.trim().to_string();
        if pin.is_empty() {
            return Err("PIN must not be empty".to_string());
        }
        Ok(pin)
    }
}
