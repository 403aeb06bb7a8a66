use anyhow::Result;
use clap::Parser;
use rps_classifier::{config::Config, web::serve};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rps-classifier")]
#[command(about = "Classify a rock, paper or scissors hand gesture from an image URL")]
struct Args {
    /// Server bind address
    #[arg(long, default_value = "0.0.0.0:8501")]
    bind: String,

    /// ONNX model (feature extractor + trained head)
    #[arg(long, default_value = "models/rps_inception.onnx")]
    model_path: String,

    /// Directory with the page illustrations
    #[arg(long, default_value = "assets")]
    assets_dir: String,

    /// Seconds allowed for fetching one image
    #[arg(long, default_value_t = 10)]
    fetch_timeout: u64,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Enable development mode
    #[arg(long)]
    dev: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)),
        )
        .with_target(false)
        .init();

    tracing::info!("Starting rock-paper-scissors classifier...");
    tracing::info!("Bind address: {}", args.bind);
    tracing::info!("Model path: {}", args.model_path);

    let config = Config::new(
        args.bind,
        args.model_path,
        args.assets_dir,
        args.fetch_timeout,
        args.dev,
    )?;

    serve(config).await?;

    Ok(())
}
