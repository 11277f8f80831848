use clap::{Parser, Subcommand};
use std::time::Duration;
use tracing::{info, Level};

use floodgate::analysis::analyze_text;
use floodgate::config::FloodgateConfig;
use floodgate::fetch::{fetch_with_retry, RetryPolicy, SimulatedUpstream};
use floodgate::ratelimit::RateLimiter;

const SAMPLE_TEXT: &str = "The quick brown fox jumps over the lazy dog the fox";

#[derive(Parser)]
#[command(name = "floodgate", version, about = "Rate limiting and demo utilities")]
struct Cli {
    /// Path to a YAML configuration file
    #[arg(long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the sliding-window rate limiter demo
    RateLimit,
    /// Analyze a piece of text and print the statistics as JSON
    Analyze {
        /// Text to analyze (defaults to a sample sentence)
        text: Option<String>,
    },
    /// Fetch from the simulated upstream, retrying on failure
    Fetch {
        /// URL to fetch (defaults to the configured one)
        url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(true)
        .init();

    let cli = Cli::parse();

    let config = match cli.config.as_deref() {
        Some(path) => {
            let config = FloodgateConfig::from_file(path)?;
            info!(path, "Configuration loaded");
            config
        }
        None => FloodgateConfig::default(),
    };

    match cli.command {
        Command::RateLimit => run_rate_limit_demo(&config).await,
        Command::Analyze { text } => run_analyze_demo(text)?,
        Command::Fetch { url } => run_fetch_demo(&config, url).await?,
    }

    Ok(())
}

/// Simulate a burst from one user, then a fresh user, printing each outcome.
async fn run_rate_limit_demo(config: &FloodgateConfig) {
    let limiter = RateLimiter::new(
        config.rate_limiting.max_requests,
        config.rate_limiting.window(),
    );

    println!("Rate Limiter Demo");
    println!(
        "Limit: {} requests per {} seconds\n",
        limiter.max_requests(),
        config.rate_limiting.window_secs
    );

    println!("Simulating rapid requests from user_123...");
    for i in 1..=8 {
        let allowed = limiter.allow("user_123");
        let stats = limiter.stats("user_123");

        let verdict = if allowed { "Allowed" } else { "Blocked" };
        println!("Request {i}: {verdict} ({}/{})", stats.current, stats.limit);

        tokio::time::sleep(Duration::from_millis(200)).await;
    }

    println!("\nWaiting 3 seconds...");
    tokio::time::sleep(Duration::from_secs(3)).await;

    println!("Testing with a different user (user_456)...");
    for i in 1..=3 {
        let allowed = limiter.allow("user_456");
        let stats = limiter.stats("user_456");

        let verdict = if allowed { "Allowed" } else { "Blocked" };
        println!("Request {i}: {verdict} ({}/{})", stats.current, stats.limit);
    }

    println!("\nChecking user_123 stats after waiting...");
    let stats = limiter.stats("user_123");
    println!(
        "user_123: {}/{} requests in window",
        stats.current, stats.limit
    );
}

/// Print the statistics for `text` as pretty JSON.
fn run_analyze_demo(text: Option<String>) -> anyhow::Result<()> {
    let text = text.unwrap_or_else(|| SAMPLE_TEXT.to_string());

    let result = analyze_text(&text);

    println!("Input:");
    println!("\"{text}\"\n");
    println!("Output:");
    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(())
}

/// Fetch from the simulated upstream and print the result or final error.
async fn run_fetch_demo(config: &FloodgateConfig, url: Option<String>) -> anyhow::Result<()> {
    let url = url.unwrap_or_else(|| config.upstream.url.clone());

    let upstream = SimulatedUpstream::new(config.upstream.latency(), config.upstream.success_rate);
    let policy = RetryPolicy {
        attempts: config.upstream.attempts,
        delay: config.upstream.retry_delay(),
    };

    println!("Fetching: {url}\n");
    println!("{}\n", "=".repeat(50));

    let result = fetch_with_retry(&upstream, &url, policy).await;

    println!("\n{}", "=".repeat(50));

    match result {
        Ok(response) => {
            println!("Result:");
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Err(e) => {
            println!("Error:");
            println!("{e}");
        }
    }

    Ok(())
}
