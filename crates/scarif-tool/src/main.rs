mod commands;
mod config;

use std::error::Error;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use scarif::{ChunkBounds, CodecOptions, CompressionAlgorithm, ScarifStructure, TranslationTable};
use tracing::{info, warn};

use config::ToolConfig;

#[derive(Parser)]
#[command(name = "scarif", version, about = "Inspect and rewrite SCARIF structure files")]
struct Cli {
    /// Config file (defaults to ./scarif.toml when present).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print a summary of a structure file.
    Info { file: PathBuf },
    /// Print every edit in a structure file.
    Dump {
        file: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Keep only the edits inside a block box.
    Filter {
        input: PathBuf,
        output: PathBuf,
        /// `minX:minY:minZ:maxX:maxY:maxZ`
        #[arg(long)]
        bounds: Option<String>,
    },
    /// Rewrite a structure file with a different compressor.
    Recompress {
        input: PathBuf,
        output: PathBuf,
        #[arg(long)]
        to: CompressionAlgorithm,
    },
    /// Print an id-to-name mapping file.
    Mapping { file: PathBuf },
}

fn main() {
    let cli = Cli::parse();

    let config = match ToolConfig::resolve(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            std::process::exit(1);
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli.command, &config) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(command: Command, config: &ToolConfig) -> Result<(), Box<dyn Error>> {
    match command {
        Command::Info { file } => {
            let structure = load(&file, &config.codec)?;
            print!("{}", commands::info_report(&structure));
        }
        Command::Dump { file, json } => {
            let structure = load(&file, &config.codec)?;
            if json {
                println!("{}", commands::dump_json(&structure)?);
            } else {
                print!("{}", commands::dump_text(&structure, config.tiles.format));
            }
        }
        Command::Filter {
            input,
            output,
            bounds,
        } => {
            let parsed = ChunkBounds::parse(bounds.as_deref());
            if bounds.is_some() && !parsed.exists() {
                warn!("Could not parse bounds {:?}, keeping everything", bounds);
            }
            let structure = load(&input, &config.codec)?;
            let mut filtered = structure.filtered(&parsed);
            info!(
                "Kept {} of {} blocks",
                filtered.block_count(),
                structure.block_count()
            );
            filtered.save_with(&output, &config.codec)?;
        }
        Command::Recompress { input, output, to } => {
            let mut structure = load(&input, &config.codec)?;
            let opts = CodecOptions {
                compression: to,
                ..config.codec
            };
            structure.save_with(&output, &opts)?;
            info!(
                "Rewrote {} ({}) as {} ({})",
                input.display(),
                config.codec.compression,
                output.display(),
                to
            );
        }
        Command::Mapping { file } => {
            let table = TranslationTable::load_nbt(&file)?;
            print!("{}", commands::mapping_report(&table));
        }
    }
    Ok(())
}

fn load(path: &Path, opts: &CodecOptions) -> Result<ScarifStructure, Box<dyn Error>> {
    let structure = ScarifStructure::load_with(path, opts)?;
    info!(
        "Loaded {}: {} chunks, {} blocks",
        path.display(),
        structure.chunk_count(),
        structure.block_count()
    );
    Ok(structure)
}
