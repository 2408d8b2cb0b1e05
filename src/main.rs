//! camwatch - backend for a camera-monitoring dashboard.
//!
//! This binary starts the HTTP server and configures all components.

use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use camwatch::{
    auth::{PasswordHasher, TokenService},
    config::{CheckConfig, Cli, Command, ServeConfig, TokenConfig, TokenOutputFormat},
    server::{create_router, AppState, RouterConfig},
    store::{AlertQuery, AlertStore, CameraStore, MemoryStore, SqliteStore, Store},
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.into_command() {
        Command::Serve(config) => run_serve(config).await,
        Command::Token(config) => run_token(config),
        Command::Check(config) => run_check(config).await,
    }
}

// =============================================================================
// Serve Command
// =============================================================================

async fn run_serve(config: ServeConfig) -> ExitCode {
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    print_banner();

    info!("Configuration:");
    match config.database {
        Some(ref path) => {
            info!("  Database: {}", path.display());
            info!("  Alerts: {}", config.alert_source());
        }
        None => {
            warn!("  Database: NONE - using in-memory store, data is lost on exit");
            warn!("            Persist data with: --database=<path>");
            warn!("  Alerts: {}", config.alert_source());
        }
    }
    info!("  Token lifetime: {}s", config.token_ttl);
    info!("  Password hashing: PBKDF2-SHA256, {} iterations", config.password_iterations);
    if config.secret_is_weak() {
        warn!("  Token secret is shorter than 32 bytes; use a longer random value");
    }

    let tokens = TokenService::with_ttl(
        config.jwt_secret_or_empty(),
        Duration::from_secs(config.token_ttl),
    );
    let hasher = PasswordHasher::with_iterations(config.password_iterations);

    match config.database {
        Some(ref path) => {
            let store = match SqliteStore::open(path) {
                Ok(store) => store,
                Err(e) => {
                    error!("Failed to open database {}: {}", path.display(), e);
                    return ExitCode::FAILURE;
                }
            };
            serve(Arc::new(store), tokens, hasher, &config).await
        }
        None => serve(Arc::new(MemoryStore::new()), tokens, hasher, &config).await,
    }
}

async fn serve<S: Store>(
    store: Arc<S>,
    tokens: TokenService,
    hasher: PasswordHasher,
    config: &ServeConfig,
) -> ExitCode {
    let state = AppState::new(store, tokens, hasher);
    let router = create_router(state, build_router_config(config));

    let addr = config.bind_address();

    info!("");
    info!("────────────────────────────────────────────────────────────────");
    info!("  Server listening on: http://{}", addr);
    info!("");
    info!("  Try these endpoints:");
    info!("    curl http://{}/health", addr);
    info!(
        "    curl -X POST http://{}/auth/signup -H 'Content-Type: application/json' \\",
        addr
    );
    info!("         -d '{{\"username\":\"alice\",\"password\":\"secret1\"}}'");
    info!("    curl http://{}/camera -H 'Authorization: Bearer <token>'", addr);
    info!("────────────────────────────────────────────────────────────────");
    info!("");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = axum::serve(listener, router).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Print the startup banner.
fn print_banner() {
    let version = env!("CARGO_PKG_VERSION");
    info!("");
    info!(" ██████╗ █████╗ ███╗   ███╗██╗    ██╗ █████╗ ████████╗ ██████╗██╗  ██╗");
    info!("██╔════╝██╔══██╗████╗ ████║██║    ██║██╔══██╗╚══██╔══╝██╔════╝██║  ██║");
    info!("██║     ███████║██╔████╔██║██║ █╗ ██║███████║   ██║   ██║     ███████║");
    info!("██║     ██╔══██║██║╚██╔╝██║██║███╗██║██╔══██║   ██║   ██║     ██╔══██║");
    info!("╚██████╗██║  ██║██║ ╚═╝ ██║╚███╔███╔╝██║  ██║   ██║   ╚██████╗██║  ██║");
    info!(" ╚═════╝╚═╝  ╚═╝╚═╝     ╚═╝ ╚══╝╚══╝ ╚═╝  ╚═╝   ╚═╝    ╚═════╝╚═╝  ╚═╝");
    info!("");
    info!("                               v{}", version);
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "camwatch=debug,tower_http=debug"
    } else {
        "camwatch=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build RouterConfig from the application ServeConfig.
fn build_router_config(config: &ServeConfig) -> RouterConfig {
    let mut router_config = RouterConfig::new();

    if let Some(ref origins) = config.cors_origins {
        router_config = router_config.with_cors_origins(origins.clone());
    }

    router_config.with_tracing(!config.no_tracing)
}

// =============================================================================
// Token Command
// =============================================================================

fn run_token(config: TokenConfig) -> ExitCode {
    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    let tokens = TokenService::with_ttl(
        config.jwt_secret_or_empty(),
        Duration::from_secs(config.ttl),
    );
    let token = tokens.issue(config.user_id);

    match config.format {
        TokenOutputFormat::Token => {
            println!("{}", token);
        }
        TokenOutputFormat::Json => {
            let json = serde_json::json!({
                "token": token,
                "userId": config.user_id,
                "ttl": config.ttl,
            });
            match serde_json::to_string_pretty(&json) {
                Ok(text) => println!("{}", text),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    return ExitCode::FAILURE;
                }
            }
        }
    }

    ExitCode::SUCCESS
}

// =============================================================================
// Check Command
// =============================================================================

async fn run_check(config: CheckConfig) -> ExitCode {
    if config.verbose {
        init_logging(true);
    }

    println!("camwatch Database Check");
    println!("═══════════════════════");
    println!();

    if !config.database.exists() {
        println!("✗ Database: {} does not exist", config.database.display());
        return ExitCode::FAILURE;
    }

    let store = match SqliteStore::open(&config.database) {
        Ok(store) => {
            println!("✓ Database: {}", config.database.display());
            store
        }
        Err(e) => {
            println!("✗ Database: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let cameras = match store.list_cameras().await {
        Ok(cameras) => cameras,
        Err(e) => {
            println!("✗ Cameras: {}", e);
            return ExitCode::FAILURE;
        }
    };
    println!("✓ Cameras: {}", cameras.len());

    if config.list_cameras {
        println!();
        if cameras.is_empty() {
            println!("  (no cameras registered)");
        }
        for camera in &cameras {
            println!(
                "  #{} {} [{}] {}",
                camera.id, camera.name, camera.location, camera.rtsp_url
            );
        }
        println!();
    }

    let latest = AlertQuery {
        camera_id: None,
        skip: 0,
        take: 1,
    };
    match store.list_alerts(latest).await {
        Ok(alerts) => match alerts.first() {
            Some(entry) => println!(
                "✓ Latest alert: {} faces on '{}' at {}",
                entry.alert.faces,
                entry.camera.name,
                entry.alert.timestamp.to_rfc3339()
            ),
            None => println!("✓ Latest alert: (none)"),
        },
        Err(e) => {
            println!("✗ Alerts: {}", e);
            return ExitCode::FAILURE;
        }
    }

    println!();
    println!("═══════════════════════");
    println!("✓ All checks passed!");

    ExitCode::SUCCESS
}
