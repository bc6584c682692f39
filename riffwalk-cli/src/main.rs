//! riffwalk CLI Tool
//!
//! Command-line interface for inspecting and validating RIFF containers.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use riffwalk_core::{
    ChunkHeader, FileHeader, FourCc, ReaderConfig, RiffReader, SizeMismatch, SizeMismatchPolicy,
    StreamChannel,
};
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, Seek, SeekFrom};
use std::path::PathBuf;

type FileReader = RiffReader<StreamChannel<BufReader<File>>>;

#[derive(Parser)]
#[command(name = "riffwalk")]
#[command(about = "Inspect and validate RIFF, RF64 and BW64 containers")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct OpenArgs {
    /// Input RIFF file path
    input: PathBuf,

    /// Byte offset of the RIFF header inside the input
    #[arg(long, default_value = "0")]
    offset: u64,

    /// Keep going when the header size disagrees with the file length
    #[arg(long)]
    lenient: bool,

    /// Do not compare the header size against the file length
    #[arg(long)]
    no_size_check: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the RIFF header and first chunk
    Info {
        #[command(flatten)]
        open: OpenArgs,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the chunk tree
    Tree {
        #[command(flatten)]
        open: OpenArgs,
    },

    /// Check the whole chunk structure
    Validate {
        #[command(flatten)]
        open: OpenArgs,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Count top-level chunks
    Count {
        #[command(flatten)]
        open: OpenArgs,

        /// Only count chunks with this id
        #[arg(long)]
        id: Option<FourCc>,
    },

    /// Write the payload of a top-level chunk to a file
    Extract {
        #[command(flatten)]
        open: OpenArgs,

        /// Chunk id to extract, e.g. "data" or "fmt"
        #[arg(long)]
        id: FourCc,

        /// Which occurrence to extract, starting at 0
        #[arg(long, default_value = "0")]
        index: u64,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Info { open, json } => show_info(&open, json)?,
        Commands::Tree { open } => print_tree(&open)?,
        Commands::Validate { open, json } => validate(&open, json)?,
        Commands::Count { open, id } => count_chunks(&open, id)?,
        Commands::Extract {
            open,
            id,
            index,
            output,
        } => extract_chunk(&open, id, index, output)?,
    }

    Ok(())
}

fn open_reader(args: &OpenArgs) -> Result<FileReader> {
    let file = File::open(&args.input)
        .with_context(|| format!("Failed to open {}", args.input.display()))?;
    let len = file.metadata().context("Failed to read file metadata")?.len();
    if args.offset >= len {
        bail!("Offset {} is beyond the end of the {} byte input", args.offset, len);
    }

    let mut stream = BufReader::new(file);
    stream
        .seek(SeekFrom::Start(args.offset))
        .context("Failed to seek to RIFF offset")?;

    let mut config = ReaderConfig::default();
    if !args.no_size_check {
        config.expected_size = Some(len - args.offset);
    }
    if args.lenient {
        config.size_mismatch = SizeMismatchPolicy::Tolerate;
    }

    RiffReader::from_stream(stream, config).context("Failed to read RIFF header")
}

#[derive(Serialize)]
struct InfoReport {
    header: FileHeader,
    start_offset: u64,
    first_chunk: Option<ChunkHeader>,
    size_mismatch: Option<SizeMismatch>,
}

fn show_info(args: &OpenArgs, json: bool) -> Result<()> {
    let reader = open_reader(args)?;
    let report = InfoReport {
        header: *reader.header(),
        start_offset: reader.start_offset(),
        first_chunk: reader.current_chunk().copied(),
        size_mismatch: reader.size_mismatch(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("=== RIFF File Information ===");
    println!("File: {}", args.input.display());
    println!("Id: {}", report.header.id);
    println!("Form type: {}", report.header.form_type);
    println!(
        "Size: {} bytes ({} including header)",
        report.header.size,
        report.header.total_size()
    );
    println!("Start offset: {}", report.start_offset);
    match report.first_chunk {
        Some(chunk) => println!(
            "First chunk: '{}' {} bytes at {}",
            chunk.id,
            chunk.size,
            chunk.position()
        ),
        None => println!("First chunk: none (empty file)"),
    }
    if let Some(mismatch) = report.size_mismatch {
        println!(
            "Warning: header declares {} bytes, {} available",
            mismatch.declared, mismatch.expected
        );
    }

    Ok(())
}

fn print_tree(args: &OpenArgs) -> Result<()> {
    let mut reader = open_reader(args)?;
    let header = *reader.header();
    println!(
        "{} ({}) {} bytes @{}",
        header.id,
        header.form_type,
        header.size,
        reader.start_offset()
    );

    reader
        .walk(|visit| {
            let indent = "  ".repeat(visit.depth + 1);
            let chunk = &visit.chunk;
            match visit.list_type {
                Some(list_type) => println!(
                    "{indent}{} ({list_type}) {} bytes @{}",
                    chunk.id,
                    chunk.size,
                    chunk.position()
                ),
                None => println!(
                    "{indent}{} {} bytes @{}",
                    chunk.id,
                    chunk.size,
                    chunk.position()
                ),
            }
        })
        .context("Invalid chunk structure")?;

    Ok(())
}

fn validate(args: &OpenArgs, json: bool) -> Result<()> {
    let mut reader = open_reader(args)?;

    match reader.validate_file() {
        Ok(report) if json => println!("{}", serde_json::to_string_pretty(&report)?),
        Ok(report) => println!(
            "OK: {} chunks, {} lists, max depth {}",
            report.chunks, report.lists, report.max_depth
        ),
        Err(err) => {
            let kind = err.kind();
            bail!(
                "{}: {} (error {}: {})",
                args.input.display(),
                err,
                kind.code(),
                kind.message()
            );
        }
    }

    Ok(())
}

fn count_chunks(args: &OpenArgs, id: Option<FourCc>) -> Result<()> {
    let mut reader = open_reader(args)?;
    let count = match id {
        Some(id) => reader.count_in_level_with_id(id),
        None => reader.count_in_level(),
    }
    .context("Failed to count chunks")?;

    println!("{count}");
    Ok(())
}

fn extract_chunk(args: &OpenArgs, id: FourCc, index: u64, output: PathBuf) -> Result<()> {
    let mut reader = open_reader(args)?;

    let mut seen = 0;
    let mut next = reader.seek_level_start().context("Failed to seek to first chunk")?;
    while let Some(chunk) = next {
        if chunk.id == id {
            if seen == index {
                let data = reader
                    .read_chunk_data()
                    .with_context(|| format!("Failed to read chunk '{id}'"))?;
                std::fs::write(&output, &data)
                    .with_context(|| format!("Failed to write {}", output.display()))?;
                println!(
                    "Extracted {} bytes of '{}' to {}",
                    data.len(),
                    id,
                    output.display()
                );
                return Ok(());
            }
            seen += 1;
        }
        next = reader.next_chunk().context("Failed to seek to next chunk")?;
    }

    bail!("No chunk '{}' with index {} at the top level", id, index)
}
