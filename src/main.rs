use anyhow::Context;
use clap::Parser;
use scint_rawparse::cli::Args;
use scint_rawparse::{Demultiplexer, ProcessingStats};
use std::process;

fn main() {
    // Parse command line arguments
    let args = Args::parse();
    setup_logging(&args);

    // Create async runtime and run the batch
    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    match runtime.block_on(run(&args)) {
        Ok(stats) if stats.files_failed == 0 => process::exit(0),
        Ok(stats) => {
            eprintln!("Error: {} file(s) failed to process", stats.files_failed);
            process::exit(1);
        }
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

async fn run(args: &Args) -> anyhow::Result<ProcessingStats> {
    let config = args.to_config();
    let mut processor = Demultiplexer::new(config).context("Invalid configuration")?;
    if args.json {
        processor = processor.without_progress();
    }

    let stats = processor
        .process()
        .await
        .with_context(|| format!("Failed to process {}", args.source_dir.display()))?;

    if args.json {
        let json = serde_json::to_string_pretty(&stats).context("Failed to serialize stats")?;
        println!("{}", json);
    }

    Ok(stats)
}

/// Set up structured logging on stderr
fn setup_logging(args: &Args) {
    tracing_subscriber::fmt()
        .with_max_level(args.log_level())
        .with_target(false)
        .with_level(true)
        .with_timer(tracing_subscriber::fmt::time::uptime())
        .with_writer(std::io::stderr)
        .init();
}
