use std::sync::Arc;

use anyhow::Context;
use assessment_service::config::{AppState, EnvVars, Environment};
use assessment_utils::policy::AssemblyPolicy;
use question_bank::db::{self, ClientOptions, PgQuestionBank};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            format!(
                "{}=debug,assessment_utils=debug,question_bank=debug,tower_http=info",
                env!("CARGO_CRATE_NAME")
            )
            .into()
        }))
        // Log to stdout
        .with(tracing_subscriber::fmt::layer().pretty())
        .with(sentry::integrations::tracing::layer())
        .init();

    info!("Starting assessment service...");
    let env_vars = EnvVars::new();

    let _guard = if let Some(sentry_dsn) = env_vars.sentry_dsn.clone() {
        info!("initializing Sentry");
        // NOTE: Events are only emitted, once the guard goes out of scope.
        Some(sentry::init((
            sentry_dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                environment: Some(env_vars.environment.to_string().into()),
                traces_sample_rate: 1.0,
                ..Default::default()
            },
        )))
    } else {
        None
    };

    if let Err(e) = serve(env_vars).await {
        error!("Server error: {e:?}");
    }
}

async fn serve(env_vars: EnvVars) -> anyhow::Result<()> {
    let policy = match &env_vars.adaptive_policy_path {
        Some(path) => AssemblyPolicy::from_file(path)
            .with_context(|| format!("unable to load adaptive policy from {}", path.display()))?,
        None => AssemblyPolicy::default(),
    };
    info!(
        adaptive_assessment_types = ?policy.adaptive.keys().collect::<Vec<_>>(),
        standard_limit = policy.standard_limit,
        "assembly policy loaded"
    );

    let client_options = ClientOptions {
        max_connections: env_vars.database_max_connections,
        require_tls: env_vars.environment == Environment::Production,
    };
    let pool = db::client(&env_vars.database_url, &client_options)
        .await
        .context("unable to connect to database")?;
    info!("Connected to the database");
    let repository = PgQuestionBank::new(pool);

    let port = env_vars.port;
    let app = assessment_service::app(AppState {
        repository: repository.clone(),
        policy: Arc::new(policy),
        env_vars,
    });

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .with_context(|| format!("unable to bind to port {port}"))?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server exited unexpectedly")?;

    repository.pool().close().await;
    info!("Database connections closed");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
