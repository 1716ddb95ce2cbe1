use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use modelcat::api::{self, AppState};
use modelcat::config::{self, Config};
use modelcat::models::{ModelCategory, ProviderId};
use modelcat::service::{ModelCatalogService, ModelsResponse, ResolveOptions};
use modelcat::{jobs, sanitize};

mod cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    // `.env` may carry MODELCAT_CREDENTIAL for `resolve`.
    dotenvy::dotenv().ok();
    // Parse before loading config: `--help` and `sanitize` never need it.
    let args = cli::Cli::parse();

    let result = match args.command {
        Some(cli::Commands::Serve { port }) => serve(port).await,
        Some(cli::Commands::Resolve {
            provider,
            credential,
            endpoint,
            api_version,
            force_refresh,
        }) => {
            let options = ResolveOptions::new(endpoint, api_version, force_refresh);
            resolve_once(&provider, &credential, &options).await
        }
        Some(cli::Commands::Sanitize {
            provider,
            category,
            model,
            allow,
        }) => sanitize_once(&provider, &category, &model, allow.as_deref()),
        Some(cli::Commands::Catalog) => print_catalog().await,
        None => serve(None).await,
    };

    if let Err(ref e) = result {
        eprintln!("Error: {:?}", e);
    }
    result
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "modelcat=debug,tower_http=debug".into()),
    );
    let json = std::env::var("MODELCAT_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    // Logs go to stderr so CLI output on stdout stays machine-readable.
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn resolve_once(provider: &str, credential: &str, options: &ResolveOptions) -> anyhow::Result<()> {
    let provider: ProviderId = provider.parse().map_err(anyhow::Error::msg)?;
    let cfg = config::load()?;
    let service = ModelCatalogService::new(&cfg)?;

    let resolution = service.resolve(provider, credential, options).await;
    let response = ModelsResponse::from(resolution);
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

fn sanitize_once(provider: &str, category: &str, model: &str, allow: Option<&[String]>) -> anyhow::Result<()> {
    let provider: ProviderId = provider.parse().map_err(anyhow::Error::msg)?;
    let category: ModelCategory = category.parse().map_err(anyhow::Error::msg)?;
    println!("{}", sanitize::sanitize(model, provider, category, allow));
    Ok(())
}

async fn serve(port: Option<u16>) -> anyhow::Result<()> {
    let cfg = config::load()?;
    let port = port.unwrap_or(cfg.port);
    run_server(cfg, port).await
}

async fn run_server(cfg: Config, port: u16) -> anyhow::Result<()> {
    let service = ModelCatalogService::new(&cfg).context("failed to build upstream client")?;

    if let Some(every) = cfg.cache_sweep_interval {
        jobs::eviction::spawn(service.cache().clone(), every);
        tracing::info!(every_secs = every.as_secs(), "result cache sweep started");
    }

    let state = Arc::new(AppState { service });
    let app = api::app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("modelcat listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn print_catalog() -> anyhow::Result<()> {
    let cfg = config::load()?;
    let service = ModelCatalogService::new(&cfg)?;
    let catalog = service.catalog();
    catalog.ensure_fresh().await;

    let snapshot = catalog.snapshot().await;
    if !snapshot.is_loaded() {
        anyhow::bail!("universal catalog could not be loaded from {}", cfg.catalog_url);
    }

    let mut namespaces: Vec<_> = snapshot.data.iter().collect();
    namespaces.sort_by(|a, b| a.0.cmp(b.0));
    for (namespace, provider_catalog) in namespaces {
        let eligible = provider_catalog.models.values().filter(|e| e.is_eligible()).count();
        println!("{:<24} {:>5} eligible / {:>5} total", namespace, eligible, provider_catalog.models.len());
    }
    Ok(())
}
