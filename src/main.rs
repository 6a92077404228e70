use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use termcolor::{ColorChoice, StandardStream};

use dirstat::config::settings::AnalyzerSettings;
use dirstat::config::size::parse_size;
use dirstat::core::analyzer::{self, DiskAnalyzer};
use dirstat::export;
use dirstat::render;
use dirstat::web::server::WebServer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ExportFormat {
    Json,
    Csv,
}

#[derive(Parser, Debug)]
#[command(
    name = "dirstat",
    version,
    about = "Recursive directory statistics with terminal and web frontends"
)]
struct Cli {
    /// Path to analyze (default: current directory)
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Minimum entry size, e.g. 1MB or 500KB
    #[arg(long, default_value = "0B")]
    min_size: String,

    /// Maximum recursion depth
    #[arg(short = 'd', long, default_value_t = 10)]
    max_depth: usize,

    /// Glob patterns to exclude (repeatable), e.g. --exclude "*.tmp"
    #[arg(short = 'e', long = "exclude")]
    exclude: Vec<String>,

    /// Include hidden entries
    #[arg(long)]
    include_hidden: bool,

    /// Maximum entries shown per tree level
    #[arg(long, default_value_t = 20)]
    tree_items: usize,

    /// Export results to a file
    #[arg(long, value_enum)]
    export: Option<ExportFormat>,

    /// Output file for export (default: disk_analysis.<format>)
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// List files larger than the given size, e.g. 100MB
    #[arg(long)]
    large_files: Option<String>,

    /// Suppress tables and tree output
    #[arg(short, long)]
    quiet: bool,

    /// Run the web interface instead of the terminal report
    #[arg(long)]
    serve: bool,

    /// Web server bind address
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Web server port
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing (logs to stderr)
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.serve {
        let server = WebServer::new(cli.host.clone(), cli.port);
        return server.start().await;
    }

    let min_size = parse_size(&cli.min_size).context("invalid --min-size")?;

    let settings = AnalyzerSettings {
        min_size,
        max_depth: cli.max_depth,
        exclude_patterns: cli.exclude.clone(),
        include_hidden: cli.include_hidden,
        ..AnalyzerSettings::default()
    };

    let analyzer = DiskAnalyzer::new(settings)?;

    // Resolve to an absolute path when possible; a missing path is
    // reported by analyze() instead.
    let path = std::fs::canonicalize(&cli.path).unwrap_or_else(|_| cli.path.clone());

    let spinner = if cli.quiet { None } else { Some(make_spinner()) };

    let stats = analyzer.analyze(&path).await?;

    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    let summary = analyzer.summary(&stats);
    let mut out = StandardStream::stdout(ColorChoice::Auto);

    if !cli.quiet {
        render::tables::print_summary(&mut out, &summary)?;
        render::tree::print_tree(&mut out, &stats, cli.tree_items)?;
        render::tables::print_file_types(&mut out, &summary)?;
    }

    if let Some(ref threshold_str) = cli.large_files {
        let threshold = parse_size(threshold_str).context("invalid --large-files")?;
        let files = analyzer::find_large_files(&stats, threshold);
        render::tables::print_large_files(&mut out, &files, threshold_str)?;
    }

    if let Some(format) = cli.export {
        let output = cli.output.clone().unwrap_or_else(|| match format {
            ExportFormat::Json => PathBuf::from("disk_analysis.json"),
            ExportFormat::Csv => PathBuf::from("disk_analysis.csv"),
        });
        match format {
            ExportFormat::Json => export::json::export_json(&stats, &summary, &output)?,
            ExportFormat::Csv => export::csv::export_csv(&stats, &output)?,
        }
        println!("Exported to: {}", output.display());
    }

    if !cli.quiet {
        render::tables::print_errors(&mut out, &analyzer.errors().snapshot())?;
    }

    Ok(())
}

fn make_spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("{spinner} Analyzing directories... [{elapsed}]")
            .unwrap(),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
