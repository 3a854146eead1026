use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use std::io::{self, BufWriter, Write};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

mod dispatch;
mod event;
mod output;
mod source;
mod station;

pub type Result<T> = anyhow::Result<T>;

#[derive(Parser)]
#[command(name = "station-stream")]
#[command(about = "Weather station high/low aggregator over a JSON event stream", long_about = None)]
struct Cli {
    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Stream records through a fresh session and write outputs as JSON lines.
    Run {
        /// Input file, one JSON record per line ("-" for stdin).
        #[arg(short, long, default_value = "-")]
        input: String,

        /// Output file (defaults to stdout).
        #[arg(short = 'o', long)]
        out: Option<String>,

        /// Log and skip records that fail validation instead of aborting.
        #[arg(long)]
        skip_invalid: bool,
    },
    /// Validate every record without aggregating.
    Check {
        #[arg(short, long, default_value = "-")]
        input: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_json);

    match cli.cmd {
        Commands::Run {
            input,
            out,
            skip_invalid,
        } => {
            let writer: Box<dyn Write> = match &out {
                Some(path) => Box::new(
                    std::fs::File::create(path)
                        .with_context(|| format!("create output file {}", path))?,
                ),
                None => Box::new(io::stdout().lock()),
            };
            run(&input, BufWriter::new(writer), skip_invalid)?;
        }
        Commands::Check { input } => check(&input)?,
    }

    Ok(())
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn run<W: Write>(input: &str, mut out: W, skip_invalid: bool) -> Result<()> {
    let records = source::open(input)?;
    let mut outputs = dispatch::Session::new().process(records);

    let mut emitted = 0usize;
    let mut skipped = 0usize;
    while let Some(item) = outputs.next() {
        match item {
            Ok(record) => {
                debug!(kind = record.kind(), "emit");
                serde_json::to_writer(&mut out, &record)?;
                out.write_all(b"\n")?;
                out.flush()?;
                emitted += 1;
            }
            Err(err) if skip_invalid => {
                warn!(line = outputs.records().line(), "skipping invalid record: {}", err);
                skipped += 1;
            }
            Err(err) => {
                bail!("line {} of {}: {}", outputs.records().line(), input, err);
            }
        }
    }

    let consumed = outputs.consumed();
    let (records, session) = outputs.into_parts();
    records.finish()?;

    info!(
        consumed,
        emitted,
        skipped,
        stations = session.stations().len(),
        as_of = ?session.cursor(),
        "stream finished"
    );
    Ok(())
}

fn check(input: &str) -> Result<()> {
    let mut records = source::open(input)?;

    let mut total = 0usize;
    let mut invalid = 0usize;
    while let Some(raw) = records.next() {
        total += 1;
        if let Err(err) = event::validate(&raw) {
            invalid += 1;
            error!(line = records.line(), "{}", err);
            println!("line {}: {}", records.line(), err.issues);
        }
    }
    records.finish()?;

    println!("{} records checked, {} invalid", total, invalid);
    if invalid > 0 {
        bail!("{} of {} records in {} failed validation", invalid, total, input);
    }
    Ok(())
}
