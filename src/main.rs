use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use pixview::{
    app::{restore_terminal, setup_terminal, App},
    frames::FrameSequence,
};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt};

/// View images in the terminal as pixel art.
///
/// Animated GIF and WebP sources play back at their native frame delay.
#[derive(Parser, Debug)]
#[command(name = "pixview", version)]
struct Args {
    /// Path of the image to display
    #[arg(short, long)]
    image: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging();
    info!("Starting pixview for {}", args.image.display());

    // Load before touching the terminal so failures print to a clean screen.
    let frames = FrameSequence::load(&args.image)
        .with_context(|| format!("Failed to load image '{}'", args.image.display()))?;

    let mut terminal = setup_terminal().context("Failed to initialize terminal")?;
    let session = App::new(&args.image, frames).run(&mut terminal);
    restore_terminal(&mut terminal).context("Failed to restore terminal")?;
    session
}

#[tracing::instrument(level = "debug")]
fn setup_logging() {
    // Stdout logging would scribble over the alternate screen, so the UI
    // only ever logs to a file. Missing log file just means no logs.
    if let Err(e) = try_setup_file_logging() {
        eprintln!("Warning: Could not set up file logging ({e}), continuing without logs");
    }
}

#[tracing::instrument(level = "debug")]
fn try_setup_file_logging() -> Result<()> {
    let file_appender = tracing_appender::rolling::daily("./logs", "pixview.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Store the guard to prevent it from being dropped
    std::mem::forget(guard);

    let subscriber = tracing_subscriber::registry().with(
        fmt::Layer::new()
            .with_writer(non_blocking)
            .with_thread_names(true)
            .with_line_number(true)
            .fmt_fields(fmt::format::PrettyFields::new())
            .with_ansi(false),
    );

    tracing::subscriber::set_global_default(subscriber)
        .with_context(|| "Failed to set up file logging")?;

    Ok(())
}
