use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use mal_codegen::{LiftConfig, Strictness, SynthConfig};

mod sink;

use crate::sink::{ArtifactSink, DirectorySink};

#[derive(Parser, Debug)]
#[command(name = "mal-gen")]
#[command(about = "Generate service stubs from a MAL service definition")]
struct Args {
    /// Input XML service definition
    #[arg(default_value = "XML/ServiceDefCOM.xml")]
    input: PathBuf,

    /// Output directory
    #[arg(short, long, default_value = ".")]
    out: PathBuf,

    /// Keep duplicate operation and type names instead of rejecting them
    #[arg(long)]
    lenient: bool,

    /// Width comments are wrapped to (60 to 64)
    #[arg(long, default_value_t = mal_codegen::MIN_WRAP_WIDTH)]
    wrap_width: usize,

    /// Don't emit doc comments
    #[arg(long)]
    no_docs: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let written = run(&args)?;
    tracing::info!(files = written, out = %args.out.display(), "generation complete");

    Ok(())
}

fn run(args: &Args) -> Result<usize> {
    tracing::info!(input = %args.input.display(), "reading service definition");
    let data = std::fs::read(&args.input)
        .with_context(|| format!("reading service definition {}", args.input.display()))?;

    let strictness = match args.lenient {
        true => Strictness::Lenient,
        false => Strictness::Strict,
    };
    let model = mal_codegen::lift_with(&data, &LiftConfig { strictness })
        .with_context(|| format!("lifting {}", args.input.display()))?;

    for area in &model.areas {
        for service in &area.services {
            tracing::info!(
                area = %area.name,
                service = %service.name,
                number = service.number,
                operations = service.operations.len(),
                "generating service"
            );
        }
    }

    let config = SynthConfig { wrap_width: args.wrap_width, emit_docs: !args.no_docs };
    let artifacts =
        mal_codegen::synthesize_with(&model, config).context("synthesizing service stubs")?;

    let mut sink = DirectorySink::new(&args.out);
    for artifact in &artifacts {
        sink.write_artifact(artifact)?;
    }

    Ok(artifacts.len())
}
