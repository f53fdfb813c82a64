use std::io::Read;

use clap::{Parser, Subcommand};
use wisp::Module;

#[derive(Parser)]
#[command(name = "wisp", about = "WebAssembly control-transfer inspector")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the precomputed transfer map for every function.
    Inspect {
        /// Path to a .wat file. Reads from stdin if omitted.
        file: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Inspect { file } => inspect(file),
    }
}

fn inspect(file: Option<String>) -> anyhow::Result<()> {
    let wat = read_input(file)?;
    let module = Module::new(&wat)?;
    for idx in 0..module.func_count() {
        module.dump_func(idx);
    }
    Ok(())
}

fn read_input(file: Option<String>) -> anyhow::Result<String> {
    match file {
        Some(path) => Ok(std::fs::read_to_string(&path)?),
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}
