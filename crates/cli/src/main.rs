use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use palm_read_core::{Config, PalmRead, init};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Analyze a PNG file headlessly instead of launching the UI
    #[arg(short, long)]
    image: Option<PathBuf>,

    /// Override the analysis endpoint defined in the environment
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Preferred camera device index
    #[arg(long)]
    camera: Option<u32>,

    /// List available cameras and exit
    #[arg(long)]
    list_cameras: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    init();
    let args = Args::parse();

    // Load config and apply CLI overrides
    let mut config = Config::load().context("Failed to load configuration")?;
    if let Some(endpoint) = args.endpoint {
        config = config
            .with_endpoint(endpoint)
            .context("Invalid --endpoint value")?;
    }
    if let Some(camera) = args.camera {
        config = config.with_camera_index(camera);
    }

    let app = PalmRead::with_config(config);

    if args.list_cameras {
        println!("Available cameras:");
        for info in app.list_cameras().context("Failed to list cameras")? {
            println!("{}", info);
        }
        return Ok(());
    }

    match args.image {
        Some(path) => analyze_file(&app, &path).await,
        None => {
            app.run().context("Failed to run UI")?;
            Ok(())
        }
    }
}

/// Headless flow: submit an existing image and print the report cards.
async fn analyze_file(app: &PalmRead, path: &PathBuf) -> Result<()> {
    let png = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
            .template("{spinner:.green} {msg}")?,
    );
    spinner.set_message("Analyzing palm image...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let outcome = app.analyze_bytes(png).await;
    spinner.finish_and_clear();

    let (result, cards) = outcome.context("Analysis failed")?;

    println!(
        "{} line(s), {} mount(s), image {}x{}",
        result.lines.len(),
        result.mounts.len(),
        result.image_size.width,
        result.image_size.height
    );

    if cards.is_empty() {
        println!("\nNo report sections were recognized.");
        return Ok(());
    }

    for card in &cards {
        println!("\n== {} [{}] ==", card.label, card.key);
        println!("{}", card.content_text());
    }

    Ok(())
}
