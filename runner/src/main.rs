#[macro_use]
extern crate log;

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};

use meter_jet::tree::language_types::ValueType;
use meter_jet::{CostTable, MeterOptions, Module};

#[derive(Parser)]
#[clap(name = "runner", about = "Inspect and meter WebAssembly modules")]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Injects gas metering into a binary module
    Meter {
        input: PathBuf,
        #[clap(short, long)]
        output: Option<PathBuf>,
        /// JSON cost table, the built-in one is used if omitted
        #[clap(long)]
        cost_table: Option<PathBuf>,
        #[clap(long, default_value = "metering")]
        module: String,
        #[clap(long, default_value = "usegas")]
        field: String,
        #[clap(long, default_value = "i32", value_parser = parse_value_type)]
        meter_type: ValueType,
    },
    /// Dumps a binary module as JSON
    ToJson {
        input: PathBuf,
        #[clap(short, long)]
        output: Option<PathBuf>,
    },
    /// Builds a binary module from its JSON form
    FromJson {
        input: PathBuf,
        #[clap(short, long)]
        output: Option<PathBuf>,
    },
}

fn parse_value_type(name: &str) -> Result<ValueType, String> {
    ValueType::from_name(name).ok_or_else(|| format!("expected one of i32, i64, f32, f64, got `{}`", name))
}

fn read(path: &Path) -> anyhow::Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}

fn emit(output: Option<&Path>, bytes: &[u8]) -> anyhow::Result<()> {
    match output {
        Some(path) => fs::write(path, bytes).with_context(|| format!("failed to write {}", path.display())),
        None => io::stdout().lock().write_all(bytes).context("failed to write to stdout"),
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Meter { input, output, cost_table, module, field, meter_type } => {
            let cost_table = match cost_table {
                Some(path) => {
                    let json = fs::read_to_string(&path)
                        .with_context(|| format!("failed to read {}", path.display()))?;
                    CostTable::from_json(&json)
                        .with_context(|| format!("invalid cost table {}", path.display()))?
                }
                None => CostTable::builtin(),
            };
            let options = MeterOptions {
                cost_table,
                import_module: module,
                import_field: field,
                meter_type,
            };
            let bytes = read(&input)?;
            let metered = meter_jet::meter_module(&bytes, &options)
                .with_context(|| format!("failed to meter {}", input.display()))?;
            info!("Metered {}: {} -> {} bytes", input.display(), bytes.len(), metered.len());
            emit(output.as_deref(), &metered)
        }
        Command::ToJson { input, output } => {
            let module = meter_jet::decode(&read(&input)?)
                .with_context(|| format!("failed to decode {}", input.display()))?;
            let json = serde_json::to_vec_pretty(&module)?;
            emit(output.as_deref(), &json)
        }
        Command::FromJson { input, output } => {
            let module: Module = serde_json::from_slice(&read(&input)?)
                .with_context(|| format!("invalid module JSON in {}", input.display()))?;
            let bytes = meter_jet::encode(&module, 0)
                .with_context(|| format!("failed to encode {}", input.display()))?;
            emit(output.as_deref(), &bytes)
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    run(Cli::parse())
}
