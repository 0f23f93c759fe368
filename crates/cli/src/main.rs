use clap::Parser;
use ingest_core::amazon::amazon_products_source;
use ingest_core::ports::{Destination, Result};
use ingest_core::{LoadInfo, PipelineRunner};
use log::debug;
use sqlite_adapter::SqliteDestination;
use std::io::{self, Write};
use std::path::PathBuf;

const SUCCESS_MESSAGE: &str = "✅ Data loaded successfully into SQLite!";

/// CLI tool to load the Amazon products sample into a local SQLite dataset
#[derive(Parser, Debug)]
#[command(name = "amazon-pipeline")]
#[command(about = "Loads the Amazon products and reviews sample into a local SQLite dataset")]
struct Cli {
    /// Directory holding one SQLite file per dataset
    #[arg(long = "pipelines-dir", default_value = ".")]
    pipelines_dir: PathBuf,

    /// Name reported in the load summary and load bookkeeping
    #[arg(long = "pipeline-name", default_value = "amazon_products")]
    pipeline_name: String,

    /// Destination dataset receiving the products and reviews tables
    #[arg(long = "dataset", default_value = "amazon_raw")]
    dataset: String,

    /// Enable debug logging
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

/// Runs the pipeline once against `destination`
fn run(cli: &Cli, destination: Box<dyn Destination>) -> Result<LoadInfo> {
    let source = amazon_products_source()?;
    let mut runner = PipelineRunner::new(cli.pipeline_name.as_str(), cli.dataset.as_str(), destination);
    runner.run(&source)
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    debug!("{:?}", cli);

    // Instantiate the concrete destination adapter
    let destination: Box<dyn Destination> = Box::new(SqliteDestination::new(cli.pipelines_dir.clone()));

    let code = report(run(&cli, destination), &mut io::stdout(), &mut io::stderr());
    if code != 0 {
        std::process::exit(code);
    }
}

/// Prints the load summary and success message, or the error. Returns the exit code.
fn report(result: Result<LoadInfo>, out: &mut impl Write, err: &mut impl Write) -> i32 {
    match result {
        Ok(load_info) => {
            if writeln!(out, "{}", load_info)
                .and_then(|_| writeln!(out, "{}", SUCCESS_MESSAGE))
                .is_err()
            {
                return 1;
            }
            0
        }
        Err(e) => {
            let _ = writeln!(err, "Error during load: {}", e);
            1
        }
    }
}
