//! HTTP server implementation
//!
//! Uses hyper http1 with TokioIo for async handling.

use bytes::Bytes;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Incoming;
use hyper::header::{
    HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN,
};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use gauntlet_judge::JudgeService;

use crate::config::Args;
use crate::error::ServerError;
use crate::routes::{self, error_response};

type BoxBody = http_body_util::combinators::BoxBody<Bytes, hyper::Error>;

/// Shared application state
pub struct AppState {
    pub args: Args,
    pub judge: JudgeService,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(args: Args, judge: JudgeService) -> Self {
        Self {
            args,
            judge,
            started_at: Instant::now(),
        }
    }
}

/// Bind the configured address and serve until the process ends.
pub async fn run(state: Arc<AppState>) -> Result<(), ServerError> {
    let listener = TcpListener::bind(state.args.listen).await?;
    info!("Gauntlet listening on {}", state.args.listen);

    if !state.judge.is_configured() {
        warn!("GOOGLE_AI_API_KEY not set - every judgment will fail until it is configured");
    }

    serve(listener, state).await
}

/// Accept loop over an already bound listener.
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> Result<(), ServerError> {
    loop {
        match listener.accept().await {
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
                        debug!("Error serving connection from {}: {:?}", addr, err);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {:?}", e);
            }
        }
    }
}

/// Route incoming HTTP requests
async fn handle_request(
    state: Arc<AppState>,
    addr: SocketAddr,
    req: Request<Incoming>,
) -> Result<Response<BoxBody>, hyper::Error> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let request_id = Uuid::new_v4();
    let start = Instant::now();

    debug!(%request_id, %addr, %method, path, "Request");

    let response = match (method.clone(), path.as_str()) {
        (Method::OPTIONS, _) => preflight_response(),

        (Method::GET, "/health") | (Method::GET, "/healthz") => routes::health_check(&state),

        (Method::GET, "/version") => routes::version_info(),

        (Method::POST, "/api/judge") => match read_body(req, state.args.max_body_bytes).await {
            Ok(body) => routes::handle_judge(&state.judge, &body).await,
            Err(response) => response,
        },

        _ => not_found_response(&path),
    };

    info!(
        %request_id,
        %method,
        path,
        status = response.status().as_u16(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Request served"
    );

    Ok(to_boxed(response))
}

/// Collect a request body, refusing anything over `limit` bytes.
async fn read_body(req: Request<Incoming>, limit: usize) -> Result<Bytes, Response<Full<Bytes>>> {
    match Limited::new(req.into_body(), limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.is::<LengthLimitError>() => {
            warn!(limit, "Request body too large");
            Err(error_response(StatusCode::BAD_REQUEST, "Request body too large"))
        }
        Err(e) => {
            debug!(error = %e, "Unreadable request body");
            Err(error_response(StatusCode::BAD_REQUEST, "Unreadable request body"))
        }
    }
}

fn to_boxed(response: Response<Full<Bytes>>) -> Response<BoxBody> {
    response.map(|body| body.map_err(|never| match never {}).boxed())
}

/// CORS preflight response
fn preflight_response() -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::new()));
    let headers = response.headers_mut();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("*"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    response
}

/// Not found response
fn not_found_response(path: &str) -> Response<Full<Bytes>> {
    routes::json_response(
        StatusCode::NOT_FOUND,
        &serde_json::json!({
            "error": "Not Found",
            "path": path,
        }),
    )
}
