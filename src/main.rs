use clap::Parser;
use tracing::{error, info};

mod cli;
mod session;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("cuevision=info")),
        )
        .init();

    let args = cli::Args::parse();

    match session::run(&args) {
        Ok(summary) => {
            info!(
                frames = summary.frames_processed,
                skipped = summary.frames_skipped,
                collisions = summary.collisions,
                "done"
            );
            if args.summary.is_none() {
                match serde_json::to_string_pretty(&summary) {
                    Ok(json) => println!("{}", json),
                    Err(e) => error!("Failed to render summary: {}", e),
                }
            }
        }
        Err(e) => {
            error!("Run failed: {:#}", e);
            std::process::exit(1);
        }
    }
}
