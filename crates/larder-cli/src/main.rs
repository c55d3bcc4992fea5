//! larder - a local-first menu browser.
//!
//! Thin front end over larder-core: populates the catalog from the remote
//! document on first run, then serves every search from the local store.

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use larder_core::{App, Config, MenuItem};

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn print_usage() {
    eprintln!("Usage: larder [--search TERM [--category NAME ...] | --reset | --profile]");
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();
    info!("larder starting");

    let config = Config::load().unwrap_or_default();
    let app = App::new(config)?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        None => {
            let menu = app.load_menu().await?;
            print_items(&menu);
        }
        Some("--search") => {
            let term = args.get(1).cloned().unwrap_or_default();
            let categories = parse_categories(&args[2..]);
            run_search(&app, &categories, &term).await?;
        }
        Some("--reset") => {
            app.reset().await?;
            println!("Local catalog and saved profile cleared.");
        }
        Some("--profile") => show_profile(&app)?,
        Some(other) => {
            eprintln!("Unknown option: {other}");
            print_usage();
            std::process::exit(2);
        }
    }

    Ok(())
}

/// Collect every value following a `--category` flag.
fn parse_categories(args: &[String]) -> Vec<String> {
    let mut categories = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--category" {
            if let Some(value) = iter.next() {
                categories.push(value.clone());
            }
        }
    }
    categories
}

async fn run_search(app: &App, categories: &[String], term: &str) -> Result<()> {
    // Make sure there is something to search before querying.
    app.load_menu().await?;

    let hits = app.store().filter(categories, term).await?;
    if hits.is_empty() {
        println!("No menu items match.");
    } else {
        print_items(&hits);
    }
    Ok(())
}

fn show_profile(app: &App) -> Result<()> {
    match app.profile().load()? {
        Some(saved) => {
            let profile = &saved.profile;
            match profile.last_name {
                Some(ref last) => println!("{} {} <{}>", profile.first_name, last, profile.email),
                None => println!("{} <{}>", profile.first_name, profile.email),
            }
            if let Some(ref phone) = profile.phone_number {
                println!("phone: {phone}");
            }
            println!("saved: {}", saved.saved_at.format("%b %d, %Y"));
        }
        None => println!("No saved profile - onboarding not completed."),
    }
    Ok(())
}

fn print_items(items: &[MenuItem]) {
    for item in items {
        println!(
            "{:>4}  {:<28} ${:<8.2} {}",
            item.id, item.name, item.price, item.category
        );
    }
}
