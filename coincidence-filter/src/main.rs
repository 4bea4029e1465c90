mod engine;
mod error;
mod output;
mod parameters;
mod source;
mod statistics;
mod window;

use anyhow::Result;
use clap::Parser;
use engine::CoincidenceEngine;
use listmode_common::{DEFAULT_MODULE_COUNT, DEFAULT_TABLE_SIZE, ModuleId};
use output::RowWriter;
use parameters::{Config, OutputMode, TimingWindows, WindowBound};
use source::LineSource;
use std::{
    fs::File,
    io::{self, BufRead, BufReader, BufWriter, Write},
    path::PathBuf,
};
use tracing::debug;

/// Correlates time-ordered list-mode detector events into coincidences
/// across modules, relative to the events of a trigger module.
#[derive(Debug, Parser)]
#[clap(author, version, about)]
struct Cli {
    /// Input list-mode data file, stdin if omitted
    input: Option<PathBuf>,

    /// Output file, stdout if omitted
    output: Option<PathBuf>,

    /// Number of modules to process
    #[clap(long = "modules", default_value_t = DEFAULT_MODULE_COUNT)]
    module_count: usize,

    /// Module used as the timing reference
    #[clap(long = "trigger", default_value = "0")]
    trigger_module: ModuleId,

    /// Number of events held in the coincidence table
    #[clap(long = "table-size", default_value_t = DEFAULT_TABLE_SIZE)]
    table_size: usize,

    /// Lines to discard from the beginning of the input
    #[clap(long, default_value = "0")]
    skip: usize,

    /// Stop after this many coincidence rows, 0 for unbounded
    #[clap(long = "max-rows", default_value = "0")]
    max_output_rows: u64,

    /// Fields emitted per module in each row
    #[clap(long, value_enum, default_value_t = OutputMode::Raw)]
    mode: OutputMode,

    /// Low edge of a module's timing window, as MODULE,TICKS
    #[clap(long)]
    low: Vec<WindowBound>,

    /// High edge of a module's timing window, as MODULE,TICKS
    #[clap(long)]
    high: Vec<WindowBound>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Cli::parse();

    let config = Config {
        module_count: args.module_count,
        trigger_module: args.trigger_module,
        capacity: args.table_size,
        output_mode: args.mode,
        max_output_rows: args.max_output_rows,
    };
    config.validate()?;

    let mut windows = TimingWindows::default();
    for bound in &args.low {
        windows.set_low(bound.module, bound.ticks)?;
    }
    for bound in &args.high {
        windows.set_high(bound.module, bound.ticks)?;
    }

    let reader: Box<dyn BufRead> = match &args.input {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(BufReader::new(io::stdin())),
    };
    let writer: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout())),
    };

    debug!(
        "correlating {} modules, trigger {}, table size {}, {} output",
        config.module_count, config.trigger_module, config.capacity, config.output_mode
    );

    let source = LineSource::new(reader, args.skip, config.module_count);
    let engine = CoincidenceEngine::new(
        config,
        windows,
        source,
        RowWriter::new(writer, config.output_mode),
    );

    let stats = engine.run()?;
    stats.report();

    Ok(())
}
