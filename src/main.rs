//! # Codecrawl Main Entry Point
//!
//! Scans the working tree for source files, derives the seed, and runs the game loop.

use clap::Parser;
use codecrawl::{
    config, find_source_files, seed_or_default, CrawlResult, GameState, InputHandler,
    MacroquadDisplay, SceneManager, SessionConfig,
};
use log::{info, warn};
use macroquad::prelude::request_new_screen_size;
use std::path::PathBuf;

/// Font size of the character grid in pixels.
const FONT_SIZE: f32 = 18.0;

/// Command line arguments for Codecrawl.
#[derive(Parser, Debug)]
#[command(name = "codecrawl")]
#[command(about = "A roguelike carved out of the code in your repository")]
#[command(version)]
struct Args {
    /// Seed for dungeon generation; derived from the scanned sources when omitted
    #[arg(short, long)]
    seed: Option<u64>,

    /// Directory to scan for source files (defaults to the current directory)
    #[arg(short, long)]
    root: Option<PathBuf>,

    /// JSON file with session settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Start invulnerable
    #[arg(long)]
    invulnerable: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[macroquad::main("Codecrawl")]
async fn main() -> CrawlResult<()> {
    let args = Args::parse();

    initialize_logging(&args.log_level);
    info!("Starting Codecrawl v{}", codecrawl::VERSION);

    let mut session = match &args.config {
        Some(path) => SessionConfig::from_json_file(path)?,
        None => SessionConfig::default(),
    };
    session.invulnerable |= args.invulnerable;

    let root = match args.root.clone() {
        Some(root) => root,
        None => std::env::current_dir().unwrap_or_else(|e| {
            warn!("Cannot read current directory ({}), scanning '.'", e);
            PathBuf::from(".")
        }),
    };

    let files = find_source_files(
        &root,
        config::MIN_SOURCE_LINES,
        config::MAX_SOURCE_FILES,
    )?;
    for file in &files {
        info!("Background: {} ({} lines)", file.path.display(), file.line_count());
    }
    let seed = args.seed.unwrap_or_else(|| seed_or_default(&files));
    info!("Using seed {}", seed);

    let display = MacroquadDisplay::new(FONT_SIZE)?;
    let (window_width, window_height) =
        display.window_size_for(config::DEFAULT_VIEW_WIDTH, config::DEFAULT_VIEW_HEIGHT);
    request_new_screen_size(window_width, window_height);

    let state = GameState::with_config(
        files,
        seed,
        config::DEFAULT_VIEW_WIDTH,
        config::DEFAULT_VIEW_HEIGHT,
        session,
    );

    let mut scenes = SceneManager::new(state, display, InputHandler::new());
    scenes.run().await
}

/// Initializes the logging system based on the specified log level.
fn initialize_logging(log_level: &str) {
    #[cfg(feature = "dev-tools")]
    {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::new(log_level))
            .with_target(false)
            .init();
    }

    #[cfg(not(feature = "dev-tools"))]
    {
        env_logger::Builder::new().parse_filters(log_level).init();
    }
}
