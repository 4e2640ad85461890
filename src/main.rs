use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use clap::Parser;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod auth;
mod config;
mod error;
mod git;
mod handlers;
mod listing;
mod nav;
mod pages;
mod paths;
mod render;
mod routes;
mod search;

use auth::Credentials;
use config::Config;
use git::{ChangeLog, GitChangeLog};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Root directory being served; canonical, the sandbox boundary
    pub root_dir: PathBuf,
    /// Configuration
    pub config: Arc<Config>,
    /// Basic-auth credentials; None disables the gate
    pub credentials: Option<Arc<Credentials>>,
    /// Version-control collaborator for diff pages
    pub changelog: Arc<dyn ChangeLog>,
    /// Theme stylesheet served at /highlight.css
    pub stylesheet: Arc<String>,
}

#[derive(Parser, Debug)]
#[command(name = "docview")]
#[command(about = "Browsable HTTP viewer for a local directory tree")]
#[command(version)]
struct Cli {
    /// Port to listen on
    #[arg(short, long, env = "DOCVIEW_PORT", default_value = "1234")]
    port: u16,

    /// Address to bind to
    #[arg(short, long, env = "DOCVIEW_BIND", default_value = "0.0.0.0")]
    bind: String,

    /// Root directory to serve
    #[arg(short, long, env = "DOCVIEW_ROOT", default_value = ".")]
    root: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, env = "DOCVIEW_VERBOSE")]
    verbose: bool,

    /// Config file path (optional)
    #[arg(short, long, env = "DOCVIEW_CONFIG")]
    config: Option<PathBuf>,

    /// Basic-auth username; the gate is active only with a password too
    #[arg(long, env = "DOCVIEW_BASIC_AUTH_USERNAME")]
    auth_username: Option<String>,

    /// Basic-auth password; the gate is active only with a username too
    #[arg(long, env = "DOCVIEW_BASIC_AUTH_PASSWORD")]
    auth_password: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        "docview=debug,tower_http=debug"
    } else {
        "docview=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load config from file if provided, otherwise use defaults
    let config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)?
    } else {
        Config::default()
    };

    // Resolve root directory to absolute path
    let root_dir = cli.root.canonicalize().unwrap_or_else(|_| cli.root.clone());

    if !root_dir.exists() {
        return Err(format!("Root directory does not exist: {}", root_dir.display()).into());
    }

    if !root_dir.is_dir() {
        return Err(format!("Root path is not a directory: {}", root_dir.display()).into());
    }

    // Validate the theme up front; the stylesheet never changes afterwards
    let stylesheet = render::theme_css(&config.theme)
        .map_err(|err| format!("Config error: {}", err))?;

    let credentials = match (cli.auth_username, cli.auth_password) {
        (Some(username), Some(password)) => {
            info!("basic-auth gate enabled for user {}", username);
            Some(Arc::new(Credentials { username, password }))
        }
        _ => {
            info!("no credentials configured, serving without authentication");
            None
        }
    };

    info!("Serving directory tree from: {}", root_dir.display());

    let state = AppState {
        root_dir,
        config: Arc::new(config),
        credentials,
        changelog: Arc::new(GitChangeLog),
        stylesheet: Arc::new(stylesheet),
    };

    // Build CORS layer
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router
    let app = Router::new()
        .merge(routes::router(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr: SocketAddr = format!("{}:{}", cli.bind, cli.port).parse()?;
    info!("Starting docview on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
