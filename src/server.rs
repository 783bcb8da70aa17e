//! HTTP server: request logging, serving and shutdown.

use axum::body::{Body, HttpBody};
use axum::extract::ConnectInfo;
use axum::http::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::Router;
use std::net::SocketAddr;
use std::time::Instant;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::commands;
use crate::services::ReviewService;

/// The API router with request logging applied.
pub fn app(service: ReviewService) -> Router {
    commands::router(service).layer(middleware::from_fn(log_requests))
}

/// Serve `service` on `listener` until `shutdown` is cancelled.
///
/// In-flight requests are allowed to finish before this returns.
pub async fn serve(
    listener: TcpListener,
    service: ReviewService,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        log::info!("[http] Listening on http://{}", addr);
    }

    // ConnectInfo lets the logger fall back to the peer address
    let make_service = app(service).into_make_service_with_connect_info::<SocketAddr>();

    axum::serve(listener, make_service)
        .with_graceful_shutdown(async move {
            shutdown.cancelled().await;
        })
        .await?;

    log::info!("[http] Server stopped");
    Ok(())
}

/// Cancel `token` on Ctrl-C or SIGTERM.
pub async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("[http] Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                log::error!("[http] Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => log::info!("[http] Received Ctrl-C, shutting down"),
        _ = terminate => log::info!("[http] Received SIGTERM, shutting down"),
    }

    token.cancel();
}

async fn log_requests(request: Request<Body>, next: Next) -> Response {
    let started = Instant::now();
    let method = request.method().clone();
    let uri = request.uri().clone();
    let client_ip = client_ip(&request);

    let response = next.run(request).await;

    let size = response
        .body()
        .size_hint()
        .exact()
        .map(|n| n.to_string())
        .unwrap_or_else(|| "-".to_string());

    log::info!(
        "[http] http_request uri={} method={} status={} duration={:?} size={} client_ip={}",
        uri,
        method,
        response.status().as_u16(),
        started.elapsed(),
        size,
        client_ip
    );

    response
}

/// Client address from `X-Real-IP`, then the first `X-Forwarded-For` hop,
/// then the socket peer.
fn client_ip(request: &Request<Body>) -> String {
    let headers = request.headers();

    if let Some(ip) = headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
    {
        return ip.to_string();
    }

    if let Some(ip) = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
    {
        return ip.to_string();
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "-".to_string())
}
