use std::{env, fs::OpenOptions, net::SocketAddr, sync::Arc};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware,
};
use axum_server::Handle;
use clap::Parser;
use rusqlite::Connection;
use time::Duration;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{EnvFilter, Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use bankbook_rs::{
    AppOptions, AppState, PasswordHash, build_cors_layer, build_router, graceful_shutdown,
    logging_middleware, run_daily_reset,
};

/// The REST API server for bankbook_rs.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long, env = "DATABASE_PATH")]
    db_path: String,

    /// The port to serve the API from.
    #[arg(short, long, env = "PORT", default_value_t = 3001)]
    port: u16,

    /// Limit each session to a number of changes per day and reset the data every night.
    #[arg(long, env = "DEMO_MODE")]
    demo_mode: bool,

    /// Require a bearer token for the bookkeeping routes.
    #[arg(long, env = "REQUIRE_AUTH")]
    require_auth: bool,

    /// The canonical timezone that decides when a day starts, e.g. "America/Montevideo".
    #[arg(long, env = "TIMEZONE", default_value = "Etc/UTC")]
    timezone: String,

    /// Comma separated list of origins allowed by CORS. Any origin is allowed if empty.
    #[arg(long, env = "CORS_ORIGINS", value_delimiter = ',')]
    cors_origins: Vec<String>,

    /// How long issued tokens are valid for, in seconds.
    #[arg(long, env = "JWT_EXPIRATION", default_value_t = 3600)]
    jwt_expiry_seconds: i64,
}

#[tokio::main]
async fn main() {
    setup_logging();

    let args = Args::parse();

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));

    let jwt_secret =
        env::var("JWT_SECRET").expect("The environment variable 'JWT_SECRET' must be set");

    let conn = Connection::open(&args.db_path).expect("Could not open the database.");
    let options = AppOptions {
        local_timezone: args.timezone,
        demo_mode: args.demo_mode,
        require_auth: args.require_auth,
        token_duration: Duration::seconds(args.jwt_expiry_seconds),
        password_hash_cost: PasswordHash::DEFAULT_COST,
    };
    let state = AppState::new(conn, &jwt_secret, options).expect("Could not create app state.");

    if state.demo_mode {
        tracing::info!("Demo mode is on, data resets daily at midnight.");
        tokio::spawn(run_daily_reset(
            state.db_connection.clone(),
            state.local_timezone.clone(),
        ));
    }

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = build_router(state)
        .layer(middleware::from_fn(logging_middleware))
        .layer(build_cors_layer(&args.cors_origins));
    let router = add_tracing_layer(router);

    tracing::info!("HTTP server listening on {}", addr);
    axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .expect("Server stopped unexpectedly.");
}

fn setup_logging() {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")
        .expect("Could not create log file");

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(Arc::new(log_file));

    tracing_subscriber::registry()
        .with(
            stdout_log
                .with_filter(filter::LevelFilter::INFO)
                .and_then(debug_log)
                .with_filter(filter::LevelFilter::DEBUG),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .init();
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // By default, `TraceLayer` will log 5xx responses but we're doing our specific
        // logging of errors so disable that
        .on_failure(());

    router.layer(tracing_layer)
}
