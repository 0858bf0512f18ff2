//! Preso CLI - loop presenting decks and refresh their content
//!
//! Usage:
//!   preso init                          Write default .preso/config.toml
//!   preso next-url <url>                Print the next slide's URL
//!   preso loop <url>                    Open a deck and loop its slides
//!   preso refresh <id> --mappings <f>   Substitute managed text and tables

mod mappings;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mappings::MappingFile;
use preso_core::PresoConfig;
use preso_looper::{
    next_slide_url, BrowserSession, LoopState, PresentationTab, PresentingMatcher, SlideLooper,
    SlideStep,
};
use preso_slides::{ChainedTokenProvider, Refresher, SheetsClient, SlidesClient, TokenProvider};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "preso")]
#[command(author, version, about = "Loop and refresh Google Slides presentations")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Directory holding .preso/config.toml
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the default configuration file
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Print the URL the looper would navigate to next
    NextUrl {
        /// Presenting URL with a slide=id.<base>_<index>_<total> parameter
        url: String,
    },

    /// Open a presenting URL in Chrome and loop its slides until Ctrl-C
    Loop {
        /// Presenting URL
        url: String,

        /// Start looping even without loop=1 in the URL
        #[arg(long)]
        start: bool,

        /// Attach to Chrome on this remote debugging port instead of launching one
        #[arg(long)]
        port: Option<u16>,

        /// Seconds per slide
        #[arg(long)]
        interval_secs: Option<u64>,

        /// Launch Chrome headless
        #[arg(long)]
        headless: bool,
    },

    /// Rename marked objects and substitute managed content
    Refresh {
        /// Presentation ID
        presentation_id: String,

        /// TOML file with [text] and [tables.<key>] mappings
        #[arg(short, long)]
        mappings: PathBuf,

        /// Also map KEY to "Last updated: <now>"
        #[arg(long, value_name = "KEY")]
        stamp: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Init { path } => cmd_init(path),
        Commands::NextUrl { url } => cmd_next_url(&url),
        Commands::Loop {
            url,
            start,
            port,
            interval_secs,
            headless,
        } => {
            let mut config = load_config(&cli.root)?;
            if port.is_some() {
                config.looper.debugging_port = port;
            }
            if let Some(secs) = interval_secs {
                config.looper.interval_ms = secs * 1000;
            }
            config.looper.headless |= headless;
            cmd_loop(config, &url, start).await
        }
        Commands::Refresh {
            presentation_id,
            mappings,
            stamp,
        } => {
            let config = load_config(&cli.root)?;
            cmd_refresh(config, &presentation_id, mappings, stamp).await
        }
    }
}

fn load_config(root: &std::path::Path) -> Result<PresoConfig> {
    PresoConfig::load_or_default(root)
        .with_context(|| format!("Failed to load configuration from {:?}", root))
}

fn cmd_init(path: PathBuf) -> Result<()> {
    info!("Initializing preso in {:?}", path);
    PresoConfig::write_default(&path)?;

    println!("Initialized preso in {:?}", path);
    println!("Created:");
    println!("  .preso/config.toml");
    Ok(())
}

fn cmd_next_url(url: &str) -> Result<()> {
    if !PresentingMatcher::default().is_presenting(url) {
        warn!("Not a presenting URL: {}", url);
    }

    match next_slide_url(url) {
        SlideStep::Advanced { url, position } => {
            info!("Slide {} of {}", position.index + 1, position.total);
            println!("{}", url);
        }
        SlideStep::Stalled => {
            warn!("No slide position in URL, staying on the current slide");
            println!("{}", url);
        }
    }
    Ok(())
}

async fn cmd_loop(config: PresoConfig, url: &str, start: bool) -> Result<()> {
    let session = Arc::new(
        BrowserSession::from_config(&config.looper)
            .await
            .context("Failed to open Chrome")?,
    );

    session.navigate(url).await?;
    let landed = session.current_url().await?;

    let mut handle = SlideLooper::from_config(session.clone(), &config.looper)?.spawn();
    handle.navigation_complete(&landed).await?;
    if start {
        handle.click().await?;
    }

    println!("Looping every {}s. Press Ctrl-C to stop.", config.looper.interval_ms / 1000);

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result.context("Failed to listen for Ctrl-C")?;
            info!("Interrupted");
        }
        state = handle.wait_for(|state| *state == LoopState::Stopped) => {
            // Tab left the presentation or a navigation failed
            state?;
            println!("Loop stopped: tab is no longer presenting");
        }
    }

    handle.shutdown().await?;
    Ok(())
}

async fn cmd_refresh(
    config: PresoConfig,
    presentation_id: &str,
    mappings: PathBuf,
    stamp: Option<String>,
) -> Result<()> {
    let mut mappings = MappingFile::load(&mappings)?;
    if let Some(key) = stamp {
        mappings.stamp(&key, &chrono::Local::now());
    }
    info!(
        "Loaded {} text and {} table mappings",
        mappings.text.len(),
        mappings.tables.len()
    );

    let refresher_config = &config.refresher;
    let tokens: Arc<dyn TokenProvider> = Arc::new(ChainedTokenProvider::from_config(refresher_config));
    let refresher = Refresher::new(
        SlidesClient::new(&refresher_config.slides_api_base, tokens.clone()),
        SheetsClient::new(&refresher_config.sheets_api_base, tokens),
        &refresher_config.managed_prefix,
    )?;

    let summary = refresher
        .update_presentation(presentation_id, &mappings.text, &mappings.tables)
        .await
        .with_context(|| format!("Failed to refresh presentation {}", presentation_id))?;

    println!("Refreshed {}", presentation_id);
    println!("  Objects renamed: {}", summary.rename_requests / 2);
    println!("  Content requests: {}", summary.content_requests);
    println!("  Charts refreshed: {}", summary.charts_refreshed);
    Ok(())
}
