use anyhow::{Context, Result};
use clap::Parser;
use inputhook::{Engine, KeyBus, Session, Status, parse_file, terminal};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(
    name = "inputhook",
    about = "Capture keystrokes until an end key, a matching phrase or a timeout",
    version
)]
struct Args {
    /// Option string, e.g. "C T10 L64"
    #[arg(short, long, default_value = "")]
    options: String,

    /// End keys, e.g. "{Enter}{Esc}"
    #[arg(short, long, default_value = "{Enter}{Esc}")]
    end_keys: String,

    /// Comma-separated phrases that end the capture
    #[arg(short, long, default_value = "")]
    match_list: String,

    /// Replay a script instead of reading the terminal
    #[arg(short, long)]
    script: Option<String>,
}

fn log_filter() -> tracing_subscriber::EnvFilter {
    let level = std::env::var("RUST_LOG")
        .or_else(|_| std::env::var("INPUTHOOK_LOG"))
        .unwrap_or_else(|_| "warn".to_string());
    tracing_subscriber::EnvFilter::try_new(level)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Some(script) = &args.script {
        let commands = parse_file(script)
            .with_context(|| format!("Failed to parse script file: {}", script))?;
        let mut engine = Engine::new(&args.options, &args.end_keys, &args.match_list)?;
        engine
            .execute(commands)
            .await
            .context("Failed to execute script")?;
        return Ok(());
    }

    let bus = Arc::new(KeyBus::new());
    let session = Session::create(bus.clone(), &args.options, &args.end_keys, &args.match_list)
        .context("Invalid capture settings")?;
    terminal::capture(&session, &bus)
        .await
        .context("Failed to capture terminal input")?;

    println!("EndReason: {}", session.status());
    match session.status() {
        Status::EndKey => println!("EndKey: {}", session.end_key()),
        Status::Match => println!("Match: {}", session.end_match()),
        _ => {}
    }
    println!("Input: {}", session.input());
    Ok(())
}
