use clap::Parser;
use ret::retplay::{playback_source, start_server, AppState};
use ret::utils::logger;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "retplay")]
#[command(about = "Play back a RET model run in the browser")]
struct Args {
    /// playback.json, a run folder, an output folder (latest run is used) or an http(s) URL
    playback: String,

    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = 8050)]
    port: u16,

    /// Folder holding the header logos, served under /assets
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    tracing::info!("🚀 Starting RetPlay");
    let source = playback_source(&args.playback)?;
    let results = match source.load().await {
        Ok(results) => results,
        Err(e) => {
            eprintln!("❌ Failed to load playback '{}': {}", source.describe(), e);
            eprintln!("💡 建議: {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };
    tracing::info!(
        "✅ Loaded {} steps with {} agents",
        results.step_data.len(),
        results.initial_data.agents.len()
    );

    let state = Arc::new(AppState::new(results, &format!("RetPlay - {}", source.describe()))?);
    let addr = start_server(state, args.assets, &args.host, args.port).await?;
    println!("🎞️ RetPlay running at http://{} (Ctrl+C to stop)", addr);

    tokio::signal::ctrl_c().await?;
    tracing::info!("👋 RetPlay stopped");
    Ok(())
}
