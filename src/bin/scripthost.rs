//! Scripthost CLI Binary
//!
//! Interactive REPL over one script engine, plus a one-shot file mode.
//! Each input line executes as a snippet chained onto the previous ones;
//! `:clear` resets the chain and `:quit` exits.

use anyhow::Context;
use clap::Parser;
use owo_colors::OwoColorize;
use scripthost::config::HostConfig;
use scripthost::logging::init_logging;
use scripthost::{CancelToken, EngineOptions, ScriptEngine, ScriptGlobals, ScriptResult};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;
use tracing::info;

#[derive(Parser)]
#[command(name = "scripthost", version, about = "Incremental script execution host")]
struct Cli {
    /// Execute a script file and exit instead of starting the REPL
    #[arg(long)]
    file: Option<PathBuf>,

    /// Path to the host config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Start the engine without the default imports
    #[arg(long)]
    no_default_imports: bool,

    /// Log level override (trace, debug, info, warn, error, off)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let mut config = match HostConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}", err.to_string().red());
            process::exit(1);
        }
    };
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }

    if let Err(err) = init_logging(Some(&config.logging)) {
        eprintln!("Failed to initialize logging: {err}");
        process::exit(1);
    }

    let mut options = EngineOptions {
        default_imports: config.engine.default_imports,
        ..EngineOptions::default()
    };
    if cli.no_default_imports {
        options.default_imports = false;
    }
    options.imports.extend(config.engine.imports.clone());

    let mut engine = ScriptEngine::new(ScriptGlobals::with_tracing(), options);
    info!(target: "scripthost::cli", "engine ready");

    let outcome = match &cli.file {
        Some(path) => run_file(&mut engine, path).await,
        None => repl(&mut engine).await,
    };

    if let Err(err) = outcome {
        eprintln!("{}", format!("{err:#}").red());
        process::exit(1);
    }
}

/// Execute one file and report its result on stdout/stderr.
async fn run_file(engine: &mut ScriptEngine, path: &PathBuf) -> anyhow::Result<()> {
    let result = engine.execute_file(path, &CancelToken::new()).await;
    if print_result(&result) {
        Ok(())
    } else {
        anyhow::bail!("script failed")
    }
}

/// Read-execute-print loop over stdin.
async fn repl(engine: &mut ScriptEngine) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        io::stdout().flush().context("flushing prompt")?;

        let line = match lines.next() {
            Some(line) => line.context("reading input")?,
            None => break,
        };
        let input = line.trim();

        match input {
            "" => continue,
            ":quit" | ":exit" => break,
            ":clear" => {
                engine.clear_state();
                println!("state cleared");
                continue;
            }
            _ => {}
        }

        let result = engine.execute_snippet(input, &CancelToken::new()).await;
        print_result(&result);
    }

    Ok(())
}

/// Print a result; returns whether it was a success.
fn print_result(result: &ScriptResult) -> bool {
    match result {
        ScriptResult::Success(Some(value)) => {
            println!("{value}");
            true
        }
        ScriptResult::Success(None) => true,
        ScriptResult::Failure { kind, message } => {
            eprintln!("{} {}", format!("[{kind:?}]").red().bold(), message.red());
            false
        }
    }
}
