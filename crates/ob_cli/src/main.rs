use std::path::PathBuf;

use clap::Parser;
use ob_news::archive::DEFAULT_ARCHIVE_URL;
use ob_web::AppState;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ob", about = "Public budget dashboard API server")]
struct Args {
    /// Port to listen on
    #[arg(long, default_value_t = 3000)]
    port: u16,

    /// Directory holding the year-keyed JSON datasets
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Base URL of the archive text-search service
    #[arg(long, default_value = DEFAULT_ARCHIVE_URL)]
    archive_url: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let state = AppState::load(&args.archive_url, &args.data_dir).await;
    let app = ob_web::create_app(state).await;

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", args.port)).await?;
    info!(port = args.port, data_dir = %args.data_dir.display(), "serving dashboard API");
    axum::serve(listener, app).await?;
    Ok(())
}
