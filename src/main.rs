use agent_desk::config::AppConfig;
use agent_desk::dashboard::{
    catalog, dashboard_router, CityFilter, CredentialStore, DashboardService,
    InMemorySessionStore, PriceRange, RoiInput,
};
use agent_desk::error::AppError;
use agent_desk::telemetry;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json};
use axum_prometheus::PrometheusMetricLayer;
use clap::{Args, Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: Arc<PrometheusHandle>,
}

#[derive(Parser, Debug)]
#[command(
    name = "Agent Desk",
    about = "Run the agent dashboard service and desk utilities from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Project the annual return on investment for a candidate property
    Roi(RoiArgs),
    /// Filter the listings catalog from the command line
    Listings(ListingsArgs),
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Args, Debug)]
struct RoiArgs {
    /// Purchase price in dollars (must be positive)
    #[arg(long, value_parser = parse_positive_amount)]
    purchase_price: f64,
    /// Expected monthly rental income in dollars
    #[arg(long, value_parser = parse_non_negative_amount)]
    monthly_income: f64,
    /// Expected monthly operating expenses in dollars
    #[arg(long, value_parser = parse_non_negative_amount)]
    monthly_expenses: f64,
}

#[derive(Args, Debug)]
struct ListingsArgs {
    /// Path to the listings CSV file
    #[arg(long, default_value = "listings.csv")]
    path: PathBuf,
    /// Exact city to keep ("all" keeps every city)
    #[arg(long)]
    city: Option<String>,
    /// Lowest price to keep (defaults to the catalog minimum)
    #[arg(long)]
    min_price: Option<f64>,
    /// Highest price to keep (defaults to the catalog maximum)
    #[arg(long)]
    max_price: Option<f64>,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Roi(args) => run_roi(args),
        Command::Listings(args) => run_listings(args),
    }
}

fn parse_positive_amount(raw: &str) -> Result<f64, String> {
    let amount: f64 = raw
        .trim()
        .parse()
        .map_err(|err| format!("failed to parse '{raw}' as a dollar amount ({err})"))?;
    if !amount.is_finite() || amount <= 0.0 {
        return Err(format!("'{raw}' must be a positive dollar amount"));
    }
    Ok(amount)
}

fn parse_non_negative_amount(raw: &str) -> Result<f64, String> {
    let amount: f64 = raw
        .trim()
        .parse()
        .map_err(|err| format!("failed to parse '{raw}' as a dollar amount ({err})"))?;
    if !amount.is_finite() || amount < 0.0 {
        return Err(format!("'{raw}' must not be negative"));
    }
    Ok(amount)
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let sessions = Arc::new(InMemorySessionStore::default());
    let service = Arc::new(DashboardService::new(
        CredentialStore::demo(),
        sessions,
        config.listings.path.clone(),
    ));

    let app = dashboard_router(service)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, listings = %config.listings.path.display(), "agent desk dashboard ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn run_roi(args: RoiArgs) -> Result<(), AppError> {
    let input = RoiInput {
        purchase_price: args.purchase_price,
        monthly_income: args.monthly_income,
        monthly_expenses: args.monthly_expenses,
    };

    // Value parsers already enforced the input domain.
    let projection = agent_desk::dashboard::roi::project(input);
    render_roi(input, projection);
    Ok(())
}

fn run_listings(args: ListingsArgs) -> Result<(), AppError> {
    let ListingsArgs {
        path,
        city,
        min_price,
        max_price,
    } = args;

    let catalog = match catalog::load_from_path(&path) {
        Ok(records) => records,
        Err(err) if err.is_unavailable() => {
            println!("Warning: {err}. No listings to show.");
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    let bounds = catalog::price_bounds(&catalog);
    let city_filter = city
        .as_deref()
        .map(CityFilter::from_selector)
        .unwrap_or_default();
    let range = PriceRange {
        low: min_price.unwrap_or_else(|| bounds.map(|b| b.min).unwrap_or(0.0)),
        high: max_price.unwrap_or_else(|| bounds.map(|b| b.max).unwrap_or(0.0)),
    };
    let filtered = catalog::filter_listings(&catalog, &city_filter, range);

    render_listings(&catalog, &filtered, bounds);
    Ok(())
}

fn render_roi(input: RoiInput, projection: agent_desk::dashboard::RoiProjection) {
    println!("Investment ROI projection");
    println!("Purchase price: ${:.2}", input.purchase_price);
    println!("Annual rental income: ${:.2}", projection.annual_income);
    println!("Annual expenses: ${:.2}", projection.annual_expenses);
    println!("Annual net: ${:.2}", projection.annual_net);
    println!("Estimated ROI: {:.2}%", projection.roi_percent);
}

fn render_listings(
    catalog: &[catalog::PropertyRecord],
    filtered: &[catalog::PropertyRecord],
    bounds: Option<catalog::PriceBounds>,
) {
    println!("Listings search");
    match bounds {
        Some(bounds) => println!("Catalog price range: ${:.0} - ${:.0}", bounds.min, bounds.max),
        None => println!("Catalog is empty"),
    }

    let cities = catalog::cities(catalog);
    if !cities.is_empty() {
        println!("Cities: {}", cities.join(", "));
    }

    println!("\n{} of {} listings match", filtered.len(), catalog.len());
    for record in filtered {
        let extras = record
            .attributes
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join(", ");
        if extras.is_empty() {
            println!("- {} | ${:.0}", record.city, record.price);
        } else {
            println!("- {} | ${:.0} | {}", record.city, record.price, extras);
        }
    }
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
