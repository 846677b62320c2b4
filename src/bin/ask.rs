//! vqa-ask: ask a question about a local image or an image URL
//!
//! Runs the VQA pipeline in-process against the configured inference
//! backend, without going through the HTTP server.

use std::path::PathBuf;

use clap::{ArgGroup, Parser};
use eyre::{bail, Context, Result};

use vqa_agent::agent::VqaAgent;
use vqa_agent::config::Config;
use vqa_agent::images;

#[derive(Parser)]
#[command(name = "vqa-ask", about = "Ask a question about an image")]
#[command(group(ArgGroup::new("source").required(true).args(["image", "url"])))]
struct Args {
    /// Path to an image file
    #[arg(long)]
    image: Option<PathBuf>,

    /// URL of an image
    #[arg(long)]
    url: Option<String>,

    /// Question to ask about the image
    #[arg(long)]
    question: String,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let config = Config::from_env().context("invalid configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vqa_agent=info".into()),
        )
        .init();

    let image_path = match (&args.image, &args.url) {
        (Some(path), _) => path.clone(),
        (None, Some(url)) => images::download_image(url, &config.temp_image_dir)
            .context("failed to download image")?,
        (None, None) => bail!("either --image or --url must be provided"),
    };

    if !images::validate_image(&image_path) {
        bail!("invalid image file: {}", image_path.display());
    }

    tracing::info!("Initializing VQA agent...");
    let agent = VqaAgent::new(&config)?;

    let answer = agent.answer_question(&image_path, &args.question)?;

    println!("\nQuestion: {}", args.question);
    println!("\nAnswer: {}", answer);

    Ok(())
}
