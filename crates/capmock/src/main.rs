use anyhow::Context;
use clap::{Parser, Subcommand};
use cm_db::JsonFileStore;
use cm_serve::config::ServeConfig;
use owo_colors::OwoColorize;
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "capmock=info,cm_serve=info,cm_core=info,cm_db=info,tower_http=info";

/// Local mock of the SDK auth and event ingestion backend.
#[derive(Parser)]
#[command(name = "capmock", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the mock server.
    Serve {
        #[arg(long)]
        port: Option<u16>,
        #[arg(long)]
        host: Option<IpAddr>,
        /// Flat-file database path.
        #[arg(long)]
        db: Option<PathBuf>,
        /// Delay applied to simulated event replies, in milliseconds.
        #[arg(long)]
        delay_ms: Option<u64>,
    },
    /// Write an empty database file.
    Init {
        #[arg(long)]
        db: Option<PathBuf>,
        #[arg(long)]
        force: bool,
    },
    /// Print the OpenAPI document.
    Openapi,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Command::Serve {
            port,
            host,
            db,
            delay_ms,
        } => {
            let mut config = ServeConfig::from_env();
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(db) = db {
                config.db_path = db;
            }
            if let Some(delay_ms) = delay_ms {
                config.response_delay = Duration::from_millis(delay_ms);
            }
            print_banner(&config);
            let addr = config.addr();
            cm_serve::serve(cm_serve::AppState::new(&config), addr)
                .await
                .with_context(|| format!("failed to serve on {addr}"))?;
        }
        Command::Init { db, force } => {
            let path = db.unwrap_or_else(|| ServeConfig::from_env().db_path);
            let store = JsonFileStore::new(&path);
            let written = store
                .init(force)
                .with_context(|| format!("failed to initialize {}", path.display()))?;
            if written {
                println!("{} {}", "initialized".green(), path.display());
            } else {
                println!(
                    "{} {} already exists (use --force to overwrite)",
                    "skipped".yellow(),
                    path.display()
                );
            }
        }
        Command::Openapi => {
            println!("{}", cm_serve::openapi::generate_spec());
        }
    }
    Ok(())
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn print_banner(config: &ServeConfig) {
    let base = format!("http://{}", config.addr());
    println!("{} listening on {}", "capmock".bold().cyan(), base.underline());
    println!("  database: {}", config.db_path.display());
    println!("  reply delay: {} ms", config.response_delay.as_millis());
    println!();
    println!("{}", "Endpoints".bold());
    println!("  {} {base}/auth/nonce", "POST".green());
    println!("  {} {base}/mapp/events", "POST".green());
    println!("  {}  {base}/<resource>[/<id>]", "ANY".dimmed());
    println!();
    println!("{}", "Test scenarios".bold());
    println!("  1-5 events    all accepted (200)");
    println!("  6-10 events   first 7 accepted, rest rate limited (201)");
    println!("  11-50 events  all accepted (200)");
    println!("  51+ events    batch rejected (500)");
    println!(
        "  {}  fails until attempt {}",
        "attributes.test_retry".yellow(),
        cm_core::simulator::RETRY_SUCCESS_ATTEMPT
    );
}
