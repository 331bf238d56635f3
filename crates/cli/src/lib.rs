//! Command-line front end: stream input from a file or stdin, split it into
//! fixed-size chunks and print each chunk as a JSON array.

use anyhow::{Context, Result};
use chunkstream_chunker::Chunks;
use chunkstream_json::{JsonArrayStream, JsonLinesStream};
use clap::{Args, Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

mod output;
mod settings;

pub use output::ChunkWriter;
pub use settings::{
    Layer, Settings, CHUNK_SIZE_ENV, CONFIG_FILE_NAME, DEFAULT_JSON_PATH, PATH_ENV,
};

#[derive(Parser, Debug)]
#[command(name = "chunkstream")]
#[command(about = "Split streamed input into fixed-size chunks", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Elements per chunk (overrides CHUNKSTREAM_CHUNK_SIZE and the config file)
    #[arg(short = 'k', long, global = true, allow_negative_numbers = true)]
    chunk_size: Option<i64>,

    /// TOML config file (default: ./chunkstream.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Pretty-print each chunk
    #[arg(long, global = true)]
    pretty: bool,

    /// Stop after this many chunks
    #[arg(long, global = true)]
    limit: Option<usize>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Chunk the elements of an array inside a JSON document
    Json(JsonArgs),

    /// Chunk newline-delimited JSON values
    Ndjson(InputArgs),

    /// Chunk text lines
    Lines(InputArgs),
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Input file ("-" or omitted reads stdin)
    input: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct JsonArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Dotted path to the array, e.g. "data.results" ("" for the document root)
    #[arg(long)]
    path: Option<String>,
}

pub fn main_entry() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);
    run(cli)
}

fn init_logging(verbose: bool, quiet: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();
}

/// Resolve settings and stream the selected input to stdout
pub fn run(cli: Cli) -> Result<()> {
    let cli_layer = Layer {
        chunk_size: cli.chunk_size,
        path: match &cli.command {
            Commands::Json(args) => args.path.clone(),
            _ => None,
        },
        pretty: cli.pretty.then_some(true),
    };
    let env_layer = Layer::from_env()?;
    let file_layer = Layer::load(cli.config.as_deref())?;
    let settings = Settings::resolve(&[&cli_layer, &env_layer, &file_layer])?;
    log::debug!("effective settings: {settings:?}");

    let stdout = io::stdout();
    let mut writer = ChunkWriter::new(stdout.lock(), settings.pretty);
    let written = match cli.command {
        Commands::Json(args) => {
            let reader = open_input(args.input.input.as_deref())?;
            let stream = JsonArrayStream::from_pointer(reader, &settings.json_path);
            writer.write_chunks(Chunks::new(stream, settings.chunk_size), cli.limit)?
        }
        Commands::Ndjson(args) => {
            let reader = open_input(args.input.as_deref())?;
            let stream = JsonLinesStream::new(reader);
            writer.write_chunks(Chunks::new(stream, settings.chunk_size), cli.limit)?
        }
        Commands::Lines(args) => {
            let reader = BufReader::new(open_input(args.input.as_deref())?);
            writer.write_chunks(Chunks::new(reader.lines(), settings.chunk_size), cli.limit)?
        }
    };

    log::info!("wrote {written} chunk(s) of up to {}", settings.chunk_size);
    Ok(())
}

fn open_input(path: Option<&Path>) -> Result<Box<dyn Read>> {
    match path {
        Some(path) if path != Path::new("-") => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open {}", path.display()))?;
            Ok(Box::new(file))
        }
        _ => Ok(Box::new(io::stdin().lock())),
    }
}
