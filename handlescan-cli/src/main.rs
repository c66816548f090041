//! handlescan CLI
//!
//! Probe a platform catalog for username presence.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use handlescan_core::{Category, PlatformCatalog, Priority, ResultCache, SystemClock};
use handlescan_engine::{SearchEngine, SearchOptions, SessionStatus};
use handlescan_probe::{HttpConfig, ProbeContext, ProbeCoordinator, StrategyRegistry};

#[derive(Parser)]
#[command(name = "handlescan")]
#[command(author, version, about = "handlescan: username-presence probing for OSINT", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level (0-3)
    #[arg(short, long, default_value = "1")]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Search a catalog for a username
    Scan {
        /// The username to search for
        username: String,

        /// Platform catalog file (JSON array of platforms)
        #[arg(short, long)]
        catalog: PathBuf,

        /// Include platforms hosting adult content
        #[arg(long)]
        adult: bool,

        /// Include Tor-only platforms (requires a local SOCKS5 proxy)
        #[arg(long)]
        tor: bool,

        /// Restrict to critical/high priority platforms
        #[arg(long)]
        priority_only: bool,

        /// Restrict to these platform categories (repeatable; catalog
        /// snake_case names, unrecognized names map to "other")
        #[arg(long = "category", value_parser = parse_category)]
        categories: Vec<Category>,

        /// Maximum platforms to probe
        #[arg(long, default_value = "100")]
        max_platforms: usize,

        /// Maximum username variations to try
        #[arg(long, default_value = "30")]
        max_variations: usize,

        /// Concurrent platform probes
        #[arg(long, default_value = "8")]
        concurrency: usize,

        /// Whole-search timeout in seconds
        #[arg(long, default_value = "300")]
        timeout: u64,

        /// Scan not-found pages for bare-username mentions
        #[arg(long)]
        keyword_pass: bool,

        /// Tor SOCKS5h proxy address
        #[arg(long, env = "HANDLESCAN_SOCKS", default_value = "socks5h://127.0.0.1:9050")]
        socks: String,

        /// Print results as JSON to stdout instead of a table
        #[arg(long)]
        json: bool,

        /// Write results as JSON to a file instead of printing a table
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate and summarize a catalog file
    Catalog {
        /// Platform catalog file
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => Level::ERROR,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    match cli.command {
        Commands::Scan {
            username,
            catalog,
            adult,
            tor,
            priority_only,
            categories,
            max_platforms,
            max_variations,
            concurrency,
            timeout,
            keyword_pass,
            socks,
            json,
            output,
        } => {
            let options = SearchOptions {
                include_adult: adult,
                include_tor: tor,
                priority_only,
                categories: if categories.is_empty() {
                    None
                } else {
                    Some(categories)
                },
                max_platforms,
                max_variations,
                max_concurrency: concurrency,
                timeout_secs: timeout,
                keyword_pass,
                ..SearchOptions::default()
            };
            run_scan(&username, &catalog, options, socks, json, output).await?;
        }
        Commands::Catalog { file } => {
            summarize_catalog(&file)?;
        }
    }

    Ok(())
}

/// Parse a category by its catalog (snake_case) name. Unrecognized names
/// map to the catch-all variant, matching catalog deserialization.
fn parse_category(s: &str) -> Result<Category, String> {
    serde_json::from_value(serde_json::Value::String(s.to_lowercase()))
        .map_err(|e| format!("invalid category {s:?}: {e}"))
}

fn load_catalog(path: &PathBuf) -> Result<PlatformCatalog> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog {}", path.display()))?;
    PlatformCatalog::from_json(&json)
        .with_context(|| format!("Invalid catalog {}", path.display()))
}

async fn run_scan(
    username: &str,
    catalog_path: &PathBuf,
    options: SearchOptions,
    socks: String,
    json: bool,
    output: Option<PathBuf>,
) -> Result<()> {
    let catalog = Arc::new(load_catalog(catalog_path)?);
    // JSON mode keeps stdout machine-readable; the chrome is skipped
    if !json {
        println!("🔎 handlescan - username presence probing\n");
        println!("📚 Catalog: {} platforms", catalog.len());
        println!("👤 Username: {}", username);
        println!(
            "⚙️  Concurrency: {} | Timeout: {}s | Adult: {} | Tor: {}\n",
            options.max_concurrency,
            options.timeout_secs,
            if options.include_adult { "yes" } else { "no" },
            if options.include_tor { "yes" } else { "no" },
        );
    }

    let clock = Arc::new(SystemClock);
    let cache = Arc::new(ResultCache::new(clock.clone()));
    let ctx = ProbeContext {
        http: HttpConfig {
            socks_addr: socks,
            ..HttpConfig::default()
        },
        clock: clock.clone(),
        assume_found_on_ambiguity: options.assume_found_on_ambiguity,
    };
    let coordinator = Arc::new(ProbeCoordinator::new(
        StrategyRegistry::default(),
        cache,
        ctx,
    ));

    let engine = SearchEngine::new(catalog, coordinator, clock);
    let id = engine.start_search(username, options)?;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                println!("\n🛑 Cancelling search...");
                engine.cancel_search(id);
            }
            _ = tokio::time::sleep(Duration::from_millis(250)) => {
                let Some(snapshot) = engine.get_status(id) else { break };
                eprint!(
                    "\r⏳ {}/{} platforms ({:.0}%) - {} hits, {} errors   ",
                    snapshot.platforms_checked,
                    snapshot.platforms_total,
                    snapshot.progress * 100.0,
                    snapshot.results_count,
                    snapshot.errors_count,
                );
                if snapshot.status.is_terminal() {
                    eprintln!();
                    break;
                }
            }
        }
    }

    let snapshot = engine.get_status(id).context("session vanished")?;
    let results = engine.results(id).unwrap_or_default();
    let errors = engine.errors(id).unwrap_or_default();

    if !json {
        match snapshot.status {
            SessionStatus::Completed => println!("\n✅ Search complete"),
            SessionStatus::Cancelled => println!("\n🛑 Search cancelled (partial results)"),
            other => println!("\n⚠️  Search ended as {:?}", other),
        }
        println!(
            "   {} platforms checked, {} hits, {} errors\n",
            snapshot.platforms_checked,
            results.len(),
            errors.len()
        );
    }

    if let Some(path) = output {
        let rendered = serde_json::to_string_pretty(&results)?;
        fs::write(&path, rendered)?;
        if !json {
            println!("📄 Results written to {}", path.display());
        }
        return Ok(());
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    if results.is_empty() {
        println!("No presence detected.");
        return Ok(());
    }

    println!(
        "{:<20} {:>5}  {:<9} {:<18} {}",
        "PLATFORM", "RISK", "TIER", "VARIATION", "URL"
    );
    for result in &results {
        println!(
            "{:<20} {:>5}  {:<9} {:<18} {}",
            result.platform_name,
            result.risk_score,
            format!("{:?}", result.risk_tier).to_lowercase(),
            result.variation_used,
            result.url,
        );
        if !result.message.is_empty() {
            println!("{:<20} {}", "", result.message);
        }
    }

    let tiers = snapshot.risk_tier_counts;
    println!(
        "\n📊 Tiers: {} critical, {} high, {} medium, {} low, {} minimal",
        tiers.critical, tiers.high, tiers.medium, tiers.low, tiers.minimal
    );

    Ok(())
}

fn summarize_catalog(path: &PathBuf) -> Result<()> {
    let catalog = load_catalog(path)?;

    let mut by_priority = [0usize; 4];
    let mut adult = 0usize;
    let mut tor = 0usize;
    for platform in catalog.iter() {
        match platform.priority {
            Priority::Critical => by_priority[0] += 1,
            Priority::High => by_priority[1] += 1,
            Priority::Medium => by_priority[2] += 1,
            Priority::Low => by_priority[3] += 1,
        }
        if platform.adult {
            adult += 1;
        }
        if platform.requires_tor {
            tor += 1;
        }
    }

    let sensitive = catalog
        .iter()
        .filter(|p| {
            matches!(
                p.category,
                Category::Adult | Category::Cam | Category::Escort | Category::Darkweb
            )
        })
        .count();

    println!("✅ Catalog {} is valid", path.display());
    println!("   {} platforms", catalog.len());
    println!(
        "   Priority: {} critical, {} high, {} medium, {} low",
        by_priority[0], by_priority[1], by_priority[2], by_priority[3]
    );
    println!(
        "   {} adult, {} tor-only, {} sensitive-category",
        adult, tor, sensitive
    );

    Ok(())
}
