//! HTTP server implementation
//!
//! Pattern adapted from holo-host/rust/holo-gateway/src/lib.rs
//! Uses hyper http1 with TokioIo for async handling.

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response};
use hyper_util::rt::TokioIo;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::config::Args;
use crate::db::DocumentDriver;
use crate::routes;
use crate::session::SessionRegistry;
use crate::types::GatewayError;

/// Shared application state
pub struct AppState {
    pub args: Args,
    /// Open sessions, injected into every handler
    pub registry: SessionRegistry,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(args: Args, registry: SessionRegistry) -> Self {
        Self {
            args,
            registry,
            started_at: Instant::now(),
        }
    }

    /// Build state around `driver`, using the timeouts from `args`
    pub fn with_driver(args: Args, driver: Arc<dyn DocumentDriver>) -> Self {
        let registry = SessionRegistry::new(driver, args.connect_timeouts());
        Self::new(args, registry)
    }
}

/// Bind the configured address and serve until Ctrl-C
pub async fn run(state: Arc<AppState>) -> Result<(), GatewayError> {
    let listener = TcpListener::bind(state.args.listen).await?;
    serve(listener, state, shutdown_signal()).await
}

/// Serve connections from `listener` until `shutdown` resolves, then close
/// every remaining session
pub async fn serve(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: impl Future<Output = ()>,
) -> Result<(), GatewayError> {
    info!("docport listening on {}", listener.local_addr()?);
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((stream, addr)) => {
                    let state = Arc::clone(&state);
                    tokio::spawn(async move {
                        let io = TokioIo::new(stream);

                        let service = service_fn(move |req| {
                            let state = Arc::clone(&state);
                            async move { handle_request(state, addr, req).await }
                        });

                        if let Err(err) = http1::Builder::new()
                            .serve_connection(io, service)
                            .await
                        {
                            error!("Error serving connection from {}: {:?}", addr, err);
                        }
                    });
                }
                Err(e) => {
                    error!("Error accepting connection: {:?}", e);
                }
            },
            _ = &mut shutdown => {
                info!("Shutdown requested, closing open sessions");
                break;
            }
        }
    }

    let closed = state.registry.close_all().await;
    info!(closed, "Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to install Ctrl-C handler: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Collect the body and route the request
async fn handle_request(
    state: Arc<AppState>,
    addr: SocketAddr,
    req: Request<Incoming>,
) -> Result<Response<Full<Bytes>>, hyper::Error> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(str::to_string);

    info!("[{}] {} {}", addr, method, path);

    let body = match req.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            warn!("Request body error from {}: {}", addr, e);
            return Ok(routes::bad_request_response("Failed to read request body"));
        }
    };

    Ok(dispatch(&state, &method, &path, query.as_deref(), &body).await)
}

/// Route a request that has already been read into memory
pub async fn dispatch(
    state: &AppState,
    method: &Method,
    path: &str,
    query: Option<&str>,
    body: &[u8],
) -> Response<Full<Bytes>> {
    if *method == Method::OPTIONS {
        return routes::preflight_response();
    }

    let raw_segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();
    let mut decoded = Vec::with_capacity(raw_segments.len());
    for raw in raw_segments {
        match urlencoding::decode(raw) {
            Ok(segment) => decoded.push(segment.into_owned()),
            Err(_) => return routes::bad_request_response("Path is not valid UTF-8"),
        }
    }
    let segments: Vec<&str> = decoded.iter().map(String::as_str).collect();

    match (method.clone(), segments.as_slice()) {
        (Method::GET, [""]) => routes::root_ping(),

        (Method::GET, ["health"]) => routes::health_check(state),

        (Method::GET, ["version"]) => routes::version_info(),

        (Method::POST, ["api", "testConnection"]) => routes::handle_open(state, body).await,

        (Method::GET, ["api", "tables", id]) => routes::handle_list_tables(state, id).await,

        (Method::GET, ["api", "tableData", id, schema, table]) => {
            routes::handle_table_data(state, id, schema, table, query).await
        }

        (Method::DELETE, ["api", "connections", id]) => routes::handle_close(state, id).await,

        _ => routes::not_found_response(path),
    }
}
