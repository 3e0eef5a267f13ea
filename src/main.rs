//! Webgrab main entry point
//!
//! This is the command-line front-end for the webgrab site mirror. It starts
//! the engine, prints the status stream, and turns Ctrl-C into a stop.

use anyhow::{bail, Context};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use webgrab::config::{load_settings, CrawlConfig, Settings};
use webgrab::output::print_statistics;
use webgrab::{Grabber, StatusEvent};

/// Webgrab: a bounded-depth website mirror
///
/// Webgrab fetches a page together with the stylesheets, scripts, images
/// and pages it references, and stores them under OUTPUT/<site>/.
#[derive(Parser, Debug)]
#[command(name = "webgrab")]
#[command(version)]
#[command(about = "A bounded-depth website mirror", long_about = None)]
struct Cli {
    /// URL of the site to grab
    #[arg(value_name = "URL")]
    url: String,

    /// Directory mirrored files are written under
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Path to a TOML settings file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Maximum number of link hops from the seed
    #[arg(long, value_name = "N")]
    max_depth: Option<u32>,

    /// Maximum number of fetches in flight
    #[arg(long, value_name = "N")]
    concurrency: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// User-Agent header sent with every request
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let settings = build_settings(&cli)?;
    let config = CrawlConfig::from_settings(&cli.url, &settings)
        .with_context(|| format!("Cannot start grab of '{}'", cli.url))?;

    handle_grab(config, cli.quiet).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("webgrab=warn"),
            1 => EnvFilter::new("webgrab=info,warn"),
            2 => EnvFilter::new("webgrab=debug,info"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads the settings file, if any, and applies command-line overrides
fn build_settings(cli: &Cli) -> anyhow::Result<Settings> {
    let mut settings = match &cli.config {
        Some(path) => {
            tracing::info!("Loading settings from: {}", path.display());
            load_settings(path)
                .with_context(|| format!("Failed to load settings from {}", path.display()))?
        }
        None => Settings::default(),
    };

    if let Some(output) = &cli.output {
        settings.output.directory = output.to_string_lossy().into_owned();
    }
    if let Some(max_depth) = cli.max_depth {
        settings.crawler.max_depth = max_depth;
    }
    if let Some(concurrency) = cli.concurrency {
        settings.crawler.max_concurrent_fetches = concurrency;
    }
    if let Some(timeout) = cli.timeout {
        settings.crawler.request_timeout_secs = timeout;
    }
    if let Some(user_agent) = &cli.user_agent {
        settings.user_agent.user_agent = user_agent.clone();
    }

    Ok(settings)
}

/// Runs a grab, printing status lines until the run ends
async fn handle_grab(config: CrawlConfig, quiet: bool) -> anyhow::Result<()> {
    let output_root = config.output_root.clone();
    let mut grabber = Grabber::new();
    let mut events = grabber
        .start(config)
        .with_context(|| format!("Failed to start grab into {}", output_root.display()))?;

    let mut stop_requested = false;
    let mut terminal = None;

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                if !quiet || event.is_terminal() {
                    println!("{}", event);
                }
                if event.is_terminal() {
                    terminal = Some(event);
                    break;
                }
            }
            _ = tokio::signal::ctrl_c(), if !stop_requested => {
                stop_requested = true;
                println!("Stopping, waiting for in-flight requests...");
                grabber.stop().await;
            }
        }
    }

    let state = grabber.wait().await;
    tracing::info!("Grab finished in state {}", state);

    if !quiet {
        if let Some(stats) = grabber.statistics() {
            println!();
            print_statistics(&stats);
        }
    }

    match terminal {
        Some(StatusEvent::Completed) => {
            println!(
                "Webserver grabbing completed. Files saved in {}.",
                output_root.display()
            );
            Ok(())
        }
        Some(StatusEvent::Stopped) => Ok(()),
        Some(StatusEvent::Failed(reason)) => bail!("Grab failed: {}", reason),
        Some(StatusEvent::Progress(_)) | None => {
            bail!("Status stream closed before the grab finished")
        }
    }
}
