// src/main.rs - Complete main entry point

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use nectar_core::app::AppCore;
use nectar_core::config::ConfigManager;
use nectar_core::error::Result;
use nectar_core::types::OrderStatus;

#[derive(Parser)]
#[command(
    name = "nectar",
    version = nectar_core::VERSION,
    about = "Nectar - a grocery storefront state engine",
    long_about = None
)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug mode
    #[arg(short, long)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the storefront core until interrupted
    Run,
    /// Run a scripted shopping session against the stores
    Demo,
    /// Show application status
    Status,
    /// Check application health
    Health,
    /// Validate configuration
    ValidateConfig {
        /// Configuration file to validate
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(&cli);

    match cli.command {
        Some(Commands::Run) | None => run_application(cli.config).await,
        Some(Commands::Demo) => run_demo(cli.config).await,
        Some(Commands::Status) => show_status(cli.config).await,
        Some(Commands::Health) => check_health(cli.config).await,
        Some(Commands::ValidateConfig { config }) => validate_config(config.or(cli.config)).await,
    }
}

fn setup_logging(cli: &Cli) {
    // The logging manager installs the configured subscriber during
    // initialization; the flags only force an earlier, louder one.
    if !cli.verbose && !cli.debug {
        return;
    }

    let level = if cli.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();
}

fn build_app(config_path: Option<PathBuf>) -> AppCore {
    match config_path {
        Some(path) => AppCore::with_config_file(path),
        None => AppCore::new(),
    }
}

async fn run_application(config_path: Option<PathBuf>) -> Result<()> {
    let mut app = build_app(config_path);

    app.initialize().await?;
    println!("Nectar core is running. Press Ctrl+C to stop.");

    app.wait_for_shutdown().await?;
    app.shutdown().await?;

    println!("Shutdown complete.");
    Ok(())
}

/// Walks one shopping session end to end: sign-in, delivery zone,
/// catalog filtering, a review, a favorite, and a checkout.
async fn run_demo(config_path: Option<PathBuf>) -> Result<()> {
    let mut app = build_app(config_path);
    app.initialize().await?;

    println!("=== Nectar demo session ===");
    run_shopping_session(&app).await?;
    app.shutdown().await?;
    println!("=== Demo session complete ===");
    Ok(())
}

async fn run_shopping_session(app: &AppCore) -> Result<()> {
    let account = app.account()?;
    let catalog = app.catalog()?;
    let cart = app.cart()?;

    // Sign in and pick a delivery zone.
    let user = account.login("shopper@example.com").await?;
    println!("Signed in as {} <{}>", user.name, user.email);
    if account.verify_otp("1234") {
        println!("Phone verified.");
    }
    println!(
        "Delivery zones: {}",
        nectar_core::account::DELIVERY_ZONES.join(", ")
    );
    let location = account.set_location("Banasree", Some("Block C")).await;
    println!("Delivering to {location}");

    // Browse the catalog through each filter axis.
    println!("Catalog holds {} products.", catalog.products().len());

    catalog.set_search_query("egg");
    let hits = catalog.filtered_products();
    println!(
        "Search \"egg\" matches {}: {}",
        hits.len(),
        product_names(&hits)
    );

    catalog.reset_filters();
    catalog.set_category_filter(Some("Dairy & Eggs".to_string()));
    println!(
        "Dairy & Eggs shelf holds {} products.",
        catalog.filtered_products().len()
    );

    catalog.toggle_sub_category("Eggs");
    let tagged = catalog.filtered_products();
    println!("Eggs tag narrows to: {}", product_names(&tagged));

    catalog.toggle_brand("Cocola");
    let branded = catalog.filtered_products();
    println!("Cocola only: {}", product_names(&branded));
    catalog.reset_filters();

    // Leave a review and a favorite on the first search hit.
    if let Some(product) = hits.first() {
        catalog
            .add_review(
                &product.id,
                Some(&account.display_name()),
                5,
                "Fresh and exactly as described.",
            )
            .await;
        if let Some(reviewed) = catalog.product(&product.id) {
            println!(
                "Reviewed {} ({} reviews, now rated {:.1})",
                reviewed.name,
                reviewed.reviews.len(),
                reviewed.rating
            );
        }
        catalog.toggle_favorite(&product.id).await;
        println!(
            "Favorited {}: {}",
            product.name,
            catalog.is_favorite(&product.id)
        );
    }

    // Fill the cart and check out.
    for rail_item in catalog.best_selling().into_iter().take(2) {
        cart.add_to_cart(rail_item, 1).await;
    }
    if let Some(extra) = catalog.product("5") {
        cart.add_to_cart(extra, 2).await;
        cart.update_quantity("5", -1).await;
    }
    println!(
        "Cart holds {} items totalling ${:.2}",
        cart.item_count(),
        cart.total_price()
    );

    let status = cart.checkout().await?;
    if status == OrderStatus::Success {
        println!("Order placed. Cart is empty: {}", cart.is_empty());
    }

    Ok(())
}

fn product_names(products: &[nectar_core::catalog::Product]) -> String {
    products
        .iter()
        .map(|p| p.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

async fn show_status(config_path: Option<PathBuf>) -> Result<()> {
    let mut app = build_app(config_path);
    app.initialize().await?;

    let stats = app.stats().await;
    println!("Nectar Status:");
    println!("  Version: {}", stats.version);
    println!("  State: {:?}", stats.state);
    println!("  Uptime: {:?}", stats.uptime);
    println!("  Managers: {}", stats.manager_count);

    app.shutdown().await?;
    Ok(())
}

async fn check_health(config_path: Option<PathBuf>) -> Result<()> {
    let mut app = build_app(config_path);
    app.initialize().await?;

    let health = app.get_health().await;
    println!("Application Health: {:?}", health.status);
    println!("Uptime: {:?}", health.uptime);
    println!("Managers:");

    for (name, status) in &health.managers {
        let status_icon = match status {
            nectar_core::manager::HealthStatus::Healthy => "✅",
            nectar_core::manager::HealthStatus::Degraded => "⚠️",
            nectar_core::manager::HealthStatus::Unhealthy => "❌",
            nectar_core::manager::HealthStatus::Unknown => "❓",
        };
        println!("  {} {}: {:?}", status_icon, name, status);
    }

    app.shutdown().await?;

    let exit_code = match health.status {
        nectar_core::manager::HealthStatus::Healthy => 0,
        nectar_core::manager::HealthStatus::Degraded => 1,
        nectar_core::manager::HealthStatus::Unhealthy => 2,
        nectar_core::manager::HealthStatus::Unknown => 3,
    };

    if exit_code != 0 {
        process::exit(exit_code);
    }

    Ok(())
}

async fn validate_config(config_path: Option<PathBuf>) -> Result<()> {
    let Some(path) = config_path else {
        println!("No configuration file given; built-in defaults are valid.");
        return Ok(());
    };

    println!("Validating configuration: {}", path.display());

    match ConfigManager::load_file(&path).await {
        Ok(config) => match config.validate() {
            Ok(()) => {
                println!("✅ Configuration is valid");
                Ok(())
            }
            Err(e) => {
                eprintln!("❌ Configuration is invalid: {e}");
                process::exit(1);
            }
        },
        Err(e) => {
            eprintln!("❌ Failed to load configuration: {e}");
            process::exit(1);
        }
    }
}
