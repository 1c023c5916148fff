use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use openapi_route_scaffolder::{compile, GeneratorConfig, ModuleStyle, WritePolicy};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "openapi_route_scaffolder")]
#[command(version)]
#[command(about = "Generates route handler scaffolds from an OpenAPI document")]
struct Args {
    /// OpenAPI source file (JSON or YAML)
    #[arg(short, long, env = "ROUTE_SCAFFOLD_SOURCE")]
    source: PathBuf,

    /// Destination folder for the generated routes
    #[arg(short, long, env = "ROUTE_SCAFFOLD_DESTINATION")]
    destination: PathBuf,

    /// Module style of the generated files
    #[arg(short = 't', long = "type", value_enum, default_value = "ts", env = "ROUTE_SCAFFOLD_TYPE")]
    module_style: ModuleStyle,

    /// Run strict semantic checks on the document before generating
    #[arg(long)]
    validate_spec: bool,

    /// Overwrite scaffolds that already exist
    #[arg(short, long)]
    force: bool,
}

impl From<Args> for GeneratorConfig {
    fn from(args: Args) -> Self {
        GeneratorConfig::new(args.source, args.destination)
            .module_style(args.module_style)
            .strict(args.validate_spec)
            .write_policy(WritePolicy::from_force(args.force))
    }
}

fn init_tracing() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .context("parsing log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|err| anyhow::anyhow!("installing tracing subscriber: {err}"))
}

fn main() -> ExitCode {
    let args = Args::parse();
    if let Err(err) = init_tracing() {
        eprintln!("{err:#}");
    }

    match compile(args.into()) {
        Ok(report) => {
            println!("Successfully generated route scaffolds: {report}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{}: {err}", err.category());
            ExitCode::FAILURE
        }
    }
}
