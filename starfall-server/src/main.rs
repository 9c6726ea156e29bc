use starfall_server::{page, server, storage};
mod cli;

use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;

const DEFAULT_PORT: u16 = 5252;
const DEFAULT_DB_PATH: &str = "data/starfall.db";

#[tokio::main]
async fn main() {
    use clap::Parser;
    let args = cli::Cli::parse();

    // Console-only logging with env-driven level
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .init();

    let config = match server::AppConfig::load() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error=%e, "Failed to load config");
            std::process::exit(2);
        }
    };

    match args.command.unwrap_or(cli::Command::Serve) {
        cli::Command::Render { year, out } => render(&config, year, out),
        cli::Command::Serve => serve(config).await,
    }
}

fn render(config: &server::AppConfig, year: Option<i32>, out: Option<std::path::PathBuf>) {
    let mut landing = page::LandingPage::current();
    landing.brand = config.site.brand.clone();
    if let Some(year) = year {
        landing.year = year;
    }
    let html = match landing.render() {
        Ok(html) => html,
        Err(e) => {
            tracing::error!(error=%e, "Failed to render landing page");
            std::process::exit(2);
        }
    };
    match out {
        Some(path) => {
            if let Err(e) = std::fs::write(&path, html) {
                tracing::error!(error=%e, path=%path.display(), "Failed to write landing page");
                std::process::exit(2);
            }
            tracing::info!(path=%path.display(), "Landing page written");
        }
        None => print!("{}", html),
    }
}

async fn serve(config: server::AppConfig) {
    let db_path = std::env::var("DB_PATH")
        .ok()
        .or_else(|| config.db_path.clone())
        .unwrap_or_else(|| DEFAULT_DB_PATH.into());
    // Ensure data dir exists
    if let Some(parent) = std::path::Path::new(&db_path).parent()
        && !parent.as_os_str().is_empty()
    {
        let _ = std::fs::create_dir_all(parent);
    }
    let store = match storage::Store::connect_sqlite(&db_path).await {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error=%e, path=%db_path, "Failed to connect DB");
            std::process::exit(3);
        }
    };

    // Decide listen port: env PORT overrides config.listen_port
    let port = std::env::var("PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .or(config.listen_port)
        .unwrap_or(DEFAULT_PORT);

    let state = server::AppState::new(config, store);
    let shutdown_token = state.shutdown_token();
    let shutdown_token_for_server = shutdown_token.clone();

    let app = server::router(state);

    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    tracing::info!(%addr, db_path=%db_path, "Starting server");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(error=%e, %addr, "Failed to bind listener");
            std::process::exit(4);
        }
    };

    let mut server_task = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_token_for_server.cancelled_owned())
            .await
    });

    // Wait for OS signal; then trigger graceful, and if it hangs beyond timeout, force abort.
    shutdown_signal().await;
    tracing::info!("shutdown: initiating graceful stop");
    shutdown_token.cancel();
    match tokio::time::timeout(std::time::Duration::from_secs(3), &mut server_task).await {
        Ok(join_res) => match join_res {
            Ok(Ok(())) => {}
            Ok(Err(err)) => tracing::error!(%err, "server error"),
            Err(e) => tracing::error!(error=%e, "server task join error"),
        },
        Err(_) => {
            tracing::warn!("shutdown: forcing server abort due to timeout");
            server_task.abort();
        }
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        let mut sigint = signal(SignalKind::interrupt()).expect("listen SIGINT");
        let mut sigterm = signal(SignalKind::terminate()).expect("listen SIGTERM");
        tokio::select! {
            _ = sigint.recv() => {
                tracing::info!("shutdown: received SIGINT");
            }
            _ = sigterm.recv() => {
                tracing::info!("shutdown: received SIGTERM");
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("shutdown: received Ctrl+C");
    }
}
