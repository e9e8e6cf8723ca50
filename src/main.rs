use anyhow::Result;
use clap::Parser;
use log::{error, info};
use turngrid_bot::config::load_config;
use turngrid_bot::config::simulation::load_simulation_config;
use turngrid_bot::constants::LOG_DIR;
use turngrid_bot::data::load_bars;
use turngrid_bot::engine::simulation::{spawn_feed, SimulationEngine};
use turngrid_bot::logging::order_audit::OrderAuditLogger;
use turngrid_bot::strategy::init_strategy;
use turngrid_bot::ui::console::ConsoleRenderer;

#[derive(Parser, Debug)]
#[command(author, version, about = "Turn Grid Trading Bot", long_about = None)]
struct Args {
    /// Strategy TOML file
    #[arg(short, long)]
    config: Option<String>,

    /// Bar history CSV to replay
    #[arg(short, long)]
    data: Option<String>,

    /// Simulation JSON file (falls back to TURNGRID_SIMULATION_CONFIG_FILE)
    #[arg(long)]
    sim_config: Option<String>,

    #[arg(short, long)]
    list_strategies: bool,
}

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // ---------------------------------------------------------
    // 1. Setup Logging (Tracing)
    // ---------------------------------------------------------
    let file_appender = tracing_appender::rolling::daily(LOG_DIR, "application.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    // Console Layer (Env Filter)
    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into())
                .add_directive("turngrid_bot=debug".parse()?),
        );

    // File Layer (Simple Text)
    let file_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(non_blocking)
        .with_target(false)
        .with_filter(tracing_subscriber::EnvFilter::new("info,turngrid_bot=debug"));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();

    let args = Args::parse();

    if args.list_strategies {
        turngrid_bot::config::strategy::print_strategy_help();
        return Ok(());
    }

    // ---------------------------------------------------------
    // 2. Setup Audit Logger
    // ---------------------------------------------------------
    let audit_logger = match OrderAuditLogger::new(LOG_DIR) {
        Ok(l) => Some(l),
        Err(e) => {
            error!("Failed to initialize Order Audit Logger: {}", e);
            None
        }
    };

    let config_path = args
        .config
        .ok_or_else(|| anyhow::anyhow!("Config file is required unless --list-strategies is used"))?;
    let data_path = args
        .data
        .ok_or_else(|| anyhow::anyhow!("Bar data file is required (--data)"))?;

    info!("Loading config from: {}", config_path);
    let config = load_config(&config_path)?;
    let sim_config = load_simulation_config(args.sim_config.as_deref());

    let bars = load_bars(&data_path)?;
    if bars.is_empty() {
        error!("No bars found in {}", data_path);
        std::process::exit(1);
    }

    info!(
        "Starting {} Strategy for {}",
        config.type_name(),
        config.symbol()
    );

    let mut strategy = match init_strategy(config.clone()) {
        Ok(s) => s,
        Err(e) => {
            error!("Strategy initialization failed: {}", e);
            std::process::exit(1);
        }
    };

    let mut engine = SimulationEngine::new(config, sim_config, audit_logger);
    if let Err(e) = engine.run(strategy.as_mut(), spawn_feed(bars)).await {
        error!("Engine error: {}", e);
        std::process::exit(1);
    }

    ConsoleRenderer::render(
        engine.config(),
        Some(&engine.get_summary(strategy.as_ref())),
        engine.get_grid_state(strategy.as_ref()).as_ref(),
        &engine.report(),
    );

    Ok(())
}
