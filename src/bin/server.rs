use std::{
    fs::OpenOptions,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    process::exit,
    sync::{Arc, Mutex},
};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware,
};
use axum_server::Handle;
use clap::Parser;
use reqwest::Client;
use rusqlite::Connection;
use tower_http::trace::TraceLayer;

#[cfg(debug_assertions)]
use tower_livereload::LiveReloadLayer;

use tracing_subscriber::{EnvFilter, Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use sales_dashboard::{
    AppState, DEFAULT_DATASET_URL, InMemoryTransactionStore, PaginationConfig,
    SQLiteTransactionStore, TransactionStore, build_http_client, build_router, graceful_shutdown,
    initialize_db, logging_middleware, reload,
};

/// The web server for the sales dashboard and its JSON API.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long, env = "DB_PATH", default_value = "sales.db")]
    db_path: String,

    /// Keep the transactions in memory instead of a SQLite database.
    ///
    /// `--db-path` is ignored when this is set.
    #[arg(long)]
    in_memory: bool,

    /// The IP address to serve the app from.
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    address: IpAddr,

    /// The port to serve the app from.
    #[arg(short, long, env = "PORT", default_value_t = 5000)]
    port: u16,

    /// Where the initialize database endpoint downloads the dataset from.
    #[arg(long, env = "DATASET_URL", default_value = DEFAULT_DATASET_URL)]
    dataset_url: String,

    /// File path to write debug logs to.
    #[arg(long, default_value = "debug.log")]
    log_path: String,

    /// Load the dataset before accepting requests.
    #[arg(long)]
    seed_on_start: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    setup_logging(&args.log_path);

    let http_client = match build_http_client() {
        Ok(client) => client,
        Err(error) => {
            tracing::error!("Could not create the HTTP client: {error}");
            exit(1);
        }
    };

    if args.in_memory {
        tracing::info!("Storing transactions in memory");
        serve(InMemoryTransactionStore::new(), &args, http_client).await;
        return;
    }

    let connection = match Connection::open(&args.db_path) {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not open the database at {}: {error}", args.db_path);
            exit(1);
        }
    };

    if let Err(error) = initialize_db(&connection) {
        tracing::error!("Could not initialize the database at {}: {error}", args.db_path);
        exit(1);
    }

    tracing::info!("Storing transactions in {}", args.db_path);
    let store = SQLiteTransactionStore::new(Arc::new(Mutex::new(connection)));
    serve(store, &args, http_client).await;
}

async fn serve<T>(store: T, args: &Args, http_client: Client)
where
    T: TransactionStore + Clone + Send + Sync + 'static,
{
    if args.seed_on_start {
        match reload(store.clone(), &http_client, &args.dataset_url).await {
            Ok(count) => tracing::info!("Seeded the store with {count} transactions"),
            Err(error) => tracing::warn!("Could not seed the store, starting empty: {error}"),
        }
    }

    let state = AppState::new(
        store,
        PaginationConfig::default(),
        &args.dataset_url,
        http_client,
    );

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = add_tracing_layer(build_router(state))
        .layer(middleware::from_fn(logging_middleware));

    #[cfg(debug_assertions)]
    let router = router.layer(LiveReloadLayer::new());

    let addr = SocketAddr::new(args.address, args.port);

    tracing::info!("HTTP server listening on {}", addr);
    if let Err(error) = axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
    {
        tracing::error!("The server stopped unexpectedly: {error}");
        exit(1);
    }
}

fn setup_logging(log_path: &str) {
    let stdout_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_filter(stdout_filter);

    let log_file = match OpenOptions::new().create(true).append(true).open(log_path) {
        Ok(log_file) => log_file,
        Err(error) => {
            eprintln!("Could not create log file at {log_path}: {error}");
            exit(1);
        }
    };

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(Arc::new(log_file))
        .with_filter(filter::LevelFilter::DEBUG);

    tracing_subscriber::registry()
        .with(stdout_log)
        .with(debug_log)
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
