use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use kwscan::{
    scan, EncodingMode, FinalResult, KeywordSet, ProcessScanner, ScanConfig, ScanMode,
    ThreadScanner,
};
use std::io;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct CliScanConfig {
    /// Files to scan, in partitioning order
    files: Vec<PathBuf>,

    /// Keyword to search for, case-insensitive (can be specified multiple times)
    #[arg(short = 'k', long = "keyword")]
    keywords: Vec<String>,

    /// Directory whose files are appended to the file list
    #[arg(short = 'd', long)]
    root: Option<PathBuf>,

    /// File extensions to keep when walking --root (e.g. txt,log)
    #[arg(short = 'e', long)]
    extensions: Option<String>,

    /// Patterns to ignore when walking --root (glob format)
    #[arg(short, long)]
    ignore: Vec<String>,

    /// Number of workers (default: config file, then CPU cores)
    #[arg(short = 'j', long)]
    workers: Option<usize>,

    /// How to handle invalid UTF-8 (failfast|lossy)
    #[arg(long)]
    encoding: Option<String>,

    /// Configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace|debug|info|warn|error; default: config file, then warn).
    /// RUST_LOG takes precedence
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Args)]
struct ScanArgs {
    #[command(flatten)]
    common: CliScanConfig,

    /// Concurrency model (threads|processes)
    #[arg(short = 'm', long)]
    mode: Option<String>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan files for keywords
    Scan(Box<ScanArgs>),

    /// Run the thread and process drivers on the same input and compare them
    Compare(Box<CliScanConfig>),

    /// Process worker: reads a task on stdin, writes its partial result on stdout
    #[command(hide = true)]
    Worker {
        #[arg(long, default_value = "warn")]
        log_level: String,
    },
}

fn main() -> Result<()> {
    run()
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan(args) => {
            let config = build_config(&args.common, args.mode.as_deref())?;
            init_tracing(&config.log_level);
            debug!("Resolved configuration: {:?}", config);

            let result = scan(&config)?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_scan_result(&result);
            }
            Ok(())
        }
        Commands::Compare(common) => {
            let config = build_config(&common, None)?;
            init_tracing(&config.log_level);
            debug!("Resolved configuration: {:?}", config);
            compare(&config)
        }
        Commands::Worker { log_level } => {
            init_tracing(&log_level);
            kwscan::run_worker(io::stdin().lock(), io::stdout().lock())
                .context("worker failed")
        }
    }
}

/// Loads the config file (if any) and lets command-line values override it.
fn build_config(args: &CliScanConfig, mode: Option<&str>) -> Result<ScanConfig> {
    let file_config = ScanConfig::load_from(args.config.as_deref())?;

    let mode = match mode {
        Some(m) => m.parse::<ScanMode>()?,
        None => file_config.mode,
    };
    let encoding_mode = match &args.encoding {
        Some(e) => e.parse::<EncodingMode>()?,
        None => file_config.encoding_mode,
    };
    let file_extensions = args.extensions.as_ref().map(|e| {
        e.split(',')
            .map(|s| s.trim().to_string())
            .collect::<Vec<_>>()
    });

    let cli_config = ScanConfig {
        files: args.files.clone(),
        keywords: args.keywords.clone(),
        root_path: args.root.clone(),
        file_extensions,
        ignore_patterns: args.ignore.clone(),
        worker_count: args.workers.unwrap_or(file_config.worker_count),
        mode,
        encoding_mode,
        log_level: args
            .log_level
            .clone()
            .unwrap_or_else(|| file_config.log_level.clone()),
    };

    Ok(file_config.merge_with_cli(cli_config))
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn compare(config: &ScanConfig) -> Result<()> {
    let keywords = KeywordSet::new(config.keywords.iter().cloned());
    let files = kwscan::scan::resolve_files(config)?;

    let threaded = ThreadScanner::new()
        .with_encoding(config.encoding_mode)
        .scan(&files, &keywords, config.worker_count)?;
    let processes = ProcessScanner::current_exe()?
        .with_args(["worker", "--log-level", config.log_level.as_str()])
        .with_encoding(config.encoding_mode)
        .scan(&files, &keywords, config.worker_count)?;

    println!("{}", "Thread-based scan:".bold());
    print_scan_result(&threaded);
    println!("\n{}", "Process-based scan:".bold());
    print_scan_result(&processes);

    if !threaded.same_associations(&processes) {
        bail!("thread and process scans found different keyword/file pairs");
    }
    println!("\n{}", "Both drivers found the same keyword/file pairs".green());
    Ok(())
}

fn print_scan_result(result: &FinalResult) {
    if result.hits.is_empty() {
        println!("No keywords found");
    }

    for (keyword, files) in result.hits.iter() {
        println!("{}", keyword.blue().bold());
        for path in files {
            println!("  {}", path.display());
        }
    }

    println!(
        "Scanned {} files ({} skipped) with {} {} in {:.6} seconds",
        result.stats.files_scanned,
        result.stats.files_skipped,
        result.stats.workers,
        result.stats.mode,
        result.stats.elapsed.as_secs_f64()
    );
}
