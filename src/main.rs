// intervis: step-through visualizer for the covered-intervals filter

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;

use intervis::config::Config;
use intervis::model::{remove_covered, Interval};
use intervis::presets::{load_intervals, Preset};
use intervis::session::Session;
use intervis::source::{group_by_category, CatalogClient, LocalSource, RemoteSource, TraceSource};
use intervis::ui::App;

#[derive(Parser)]
#[command(name = "intervis", version)]
#[command(about = "Step through the remove-covered-intervals recursion", long_about = None)]
struct Cli {
    /// Config file (default: <config dir>/intervis/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// JSON file with intervals: `[{id,start,end,color}]` or `{"intervals": [...]}`
    #[arg(short, long, global = true, conflicts_with = "preset")]
    input: Option<PathBuf>,

    /// Built-in input
    #[arg(short, long, value_enum, global = true)]
    preset: Option<Preset>,

    /// Fetch traces from the trace service instead of simulating locally
    #[arg(long, global = true)]
    remote: bool,

    /// Trace service base URL (implies --remote)
    #[arg(long, global = true)]
    backend: Option<String>,

    /// Catalog algorithm id to request (implies --remote)
    #[arg(long, global = true)]
    algorithm: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Open the interactive viewer (default)
    Play,
    /// Print the trace document as JSON
    Export {
        /// Single-line output
        #[arg(long)]
        compact: bool,
    },
    /// List the service's algorithms, or show one
    Catalog {
        /// Algorithm id
        id: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref()).context("Failed to load config")?;
    let remote = cli.remote || cli.backend.is_some() || cli.algorithm.is_some();
    if let Some(url) = cli.backend.clone() {
        config.source.backend_url = url;
    }
    if let Some(id) = cli.algorithm.clone() {
        config.source.algorithm = Some(id);
    }

    let command = cli.command.unwrap_or(Command::Play);
    init_logging(&config, matches!(command, Command::Play))?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    match command {
        Command::Play => {
            let intervals = resolve_input(cli.input.as_deref(), cli.preset)?;
            let source = build_source(&config, remote)?;
            play(&runtime, &config, source, intervals)
        }
        Command::Export { compact } => {
            let intervals = resolve_input(cli.input.as_deref(), cli.preset)?;
            let source = build_source(&config, remote)?;
            let trace = runtime
                .block_on(source.fetch(&intervals))
                .with_context(|| format!("Failed to fetch trace from {} source", source.name()))?;
            if trace.result() == remove_covered(&intervals).as_slice() {
                tracing::info!(kept = trace.result().len(), "trace result matches reference filter");
            } else {
                tracing::warn!(
                    source = source.name(),
                    "trace result differs from the reference filter"
                );
            }
            let document = trace.to_document();
            let json = if compact {
                serde_json::to_string(&document)?
            } else {
                serde_json::to_string_pretty(&document)?
            };
            println!("{json}");
            Ok(())
        }
        Command::Catalog { id } => catalog(&runtime, &config, id.as_deref()),
    }
}

/// The TUI owns the terminal, so `to_file` sends logs to the configured log file
fn init_logging(config: &Config, to_file: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.filter))
        .with_context(|| format!("Invalid log filter '{}'", config.logging.filter))?;

    if to_file {
        fs::create_dir_all(&config.logging.directory).with_context(|| {
            format!(
                "Failed to create log directory {}",
                config.logging.directory.display()
            )
        })?;
        let log_file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(config.logging.log_file())?;

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(log_file)
            .with_ansi(false) // Disable ANSI colors in log file
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    }
    Ok(())
}

fn resolve_input(input: Option<&Path>, preset: Option<Preset>) -> Result<Vec<Interval>> {
    match input {
        Some(path) => load_intervals(path)
            .with_context(|| format!("Failed to load intervals from {}", path.display())),
        None => Ok(preset.unwrap_or_default().intervals()),
    }
}

fn build_source(config: &Config, remote: bool) -> Result<Arc<dyn TraceSource>> {
    if !remote {
        return Ok(Arc::new(LocalSource::new()));
    }
    let source = RemoteSource::new(
        config.source.backend_url.clone(),
        config.source.algorithm.clone(),
        config.source.request_timeout,
    )
    .context("Failed to build HTTP client")?;
    tracing::info!(endpoint = %source.endpoint(), "using remote trace source");
    Ok(Arc::new(source))
}

fn play(
    runtime: &Runtime,
    config: &Config,
    source: Arc<dyn TraceSource>,
    intervals: Vec<Interval>,
) -> Result<()> {
    let session = Session::new(config.playback.autoplay_interval);
    let mut app = App::new(session, source, intervals, runtime.handle().clone());
    app.request_trace();

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res.context("Terminal UI failed")
}

fn catalog(runtime: &Runtime, config: &Config, id: Option<&str>) -> Result<()> {
    let client = CatalogClient::new(
        config.source.backend_url.clone(),
        config.source.request_timeout,
    )
    .context("Failed to build HTTP client")?;

    match id {
        None => {
            let (algorithms, categories) = runtime
                .block_on(async { tokio::try_join!(client.list_algorithms(), client.categories()) })
                .context("Failed to list algorithms")?;
            if algorithms.is_empty() {
                println!("No algorithms registered at {}", config.source.backend_url);
            }
            for (category, members) in group_by_category(&categories, algorithms) {
                println!("{category}:");
                for info in members {
                    println!("  {info}");
                }
            }
        }
        Some(id) => {
            let (info, example) = runtime.block_on(async {
                tokio::try_join!(client.algorithm(id), client.default_example(id))
            })?;
            println!("{info}");
            if !info.description.is_empty() {
                println!("  {}", info.description);
            }
            if let Some(difficulty) = &info.difficulty {
                println!("  difficulty: {difficulty}");
            }
            if !info.tags.is_empty() {
                println!("  tags: {}", info.tags.join(", "));
            }
            println!("  example input:");
            for interval in example {
                println!("    #{} {} {}", interval.id, interval, interval.color.name());
            }
        }
    }
    Ok(())
}
