//! echoverse: AI audiobook studio.
//!
//! Rewrites text in a chosen tone with a language model, narrates it with a
//! text-to-speech service, and serves both through a small web page.

mod config;
mod history;
mod http;
mod narrator;
mod normalize;
mod rewriter;
mod studio;
mod titles;
mod voices;
mod web;

use clap::Parser;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "echoverse", about = "AI audiobook studio")]
struct Args {
    /// Path to config.yaml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind (overrides config)
    #[arg(long)]
    host: Option<IpAddr>,

    /// Port to bind (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable verbose (debug) logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Keep hyper/reqwest internals quiet unless debugging
    let filter = if args.verbose {
        EnvFilter::new("debug,hyper=info,hyper_util=info,reqwest=info")
    } else {
        EnvFilter::new("info,hyper=warn,hyper_util=warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("echoverse starting");

    let config = config::Config::load(args.config.as_deref());
    info!(
        "Rewriter: {} | TTS endpoint: {} | narrations dir: {}",
        config.rewriter.backend,
        config.narrator.endpoint,
        config.narrator.output_dir.display()
    );

    std::fs::create_dir_all(&config.narrator.output_dir)?;

    let rewriter = rewriter::from_config(&config.rewriter)?;
    let synthesizer = Arc::new(narrator::http::HttpSynthesizer::from_config(&config.narrator)?);
    let narrator = narrator::Narrator::new(synthesizer, config.narrator.output_dir.clone());
    info!("Narrations will be written to {}", narrator.output_dir().display());

    let state = web::AppState {
        studio: Arc::new(studio::Studio::new(rewriter, narrator)),
    };

    let host = match args.host {
        Some(host) => host,
        None => config.server.host.parse()?,
    };
    let port = args.port.unwrap_or(config.server.port);
    web::serve(state, SocketAddr::new(host, port)).await?;

    Ok(())
}
