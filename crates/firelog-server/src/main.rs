use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tower_http::trace::{DefaultMakeSpan, TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use firelog_server::auth::gotrue::GoTrueClient;
use firelog_server::auth::mock::InMemoryAuthProvider;
use firelog_server::config::Config;
use firelog_server::rate_limit::RateLimiter;
use firelog_server::repository::{InMemoryRepository, PgRepository};
use firelog_server::state::AppState;
use firelog_server::{db, routes};

#[derive(Parser)]
#[command(name = "firelog-server", version, about = "FireLog incident report API")]
struct Args {
    /// Run on in-memory backends seeded with one demo department.
    #[arg(long)]
    demo: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "firelog_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let cfg = Config::from_env();
    tracing::debug!(config = ?cfg, "configuration loaded");

    let mut state = if args.demo {
        demo_state()
    } else {
        backend_state(&cfg).await?
    };
    state.trust_proxy = cfg.trust_proxy;

    spawn_rate_limit_cleanup(
        state.rate_limiter.clone(),
        Duration::from_secs(cfg.rate_limit_cleanup_secs.max(1)),
    );

    let app = routes::create_router(state).layer(
        // Header capture stays off so bearer tokens never reach the logs.
        TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::new().include_headers(false)),
    );
    let addr = format!("0.0.0.0:{}", cfg.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("listening on {addr}");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;
    Ok(())
}

fn demo_state() -> AppState {
    let repo = Arc::new(InMemoryRepository::new());
    let department = repo.seed_demo();
    tracing::warn!(
        fire_department_id = %department.id,
        verification_code = %department.verification_code,
        "demo mode: in-memory backends, nothing is persisted"
    );
    AppState::new(repo, Arc::new(InMemoryAuthProvider::new()))
}

async fn backend_state(cfg: &Config) -> Result<AppState> {
    let backend = cfg.backend()?;
    let pool = db::create_pool(&backend.database_url).await?;
    let auth = GoTrueClient::new(
        &backend.supabase_url,
        backend.supabase_anon_key,
        backend.supabase_service_role_key,
    )?;
    Ok(AppState::new(
        Arc::new(PgRepository::new(pool)),
        Arc::new(auth),
    ))
}

fn spawn_rate_limit_cleanup(limiter: Arc<RateLimiter>, every: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // The first tick completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let removed = limiter.cleanup();
            if removed > 0 {
                tracing::debug!(removed, remaining = limiter.len(), "rate limit windows evicted");
            }
        }
    });
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("failed to listen for ctrl_c: {e}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => tracing::warn!("failed to install SIGTERM handler: {e}"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
