use std::net::SocketAddr;

use axum::Router;
use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use camino::{Utf8Path, Utf8PathBuf};
use console::style;
use tower_http::services::ServeDir;

use crate::error::ServeError;
use crate::reload::client_script;

/// Serves `root` on `127.0.0.1:port` until the process ends. When
/// `reload_port` is set, HTML responses get the live reload client injected.
pub fn serve(root: Utf8PathBuf, port: u16, reload_port: Option<u16>) -> Result<(), ServeError> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(ServeError::Runtime)?
        .block_on(run(root, port, reload_port))
}

async fn run(root: Utf8PathBuf, port: u16, reload_port: Option<u16>) -> Result<(), ServeError> {
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| ServeError::Bind { addr, source })?;

    tracing::info!(url = %style(format!("http://localhost:{port}/")).yellow(), "serving {root}");

    axum::serve(listener, router(&root, reload_port)).await?;

    Ok(())
}

fn router(root: &Utf8Path, reload_port: Option<u16>) -> Router {
    let router = Router::new().fallback_service(ServeDir::new(root));

    match reload_port {
        Some(port) => router.layer(middleware::from_fn_with_state(port, inject)),
        None => router,
    }
}

async fn inject(State(port): State<u16>, request: Request, next: Next) -> Response {
    let response = next.run(request).await;

    if response.status() != StatusCode::OK || !is_html(&response) {
        return response;
    }

    let (mut parts, body) = response.into_parts();

    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!("couldn't read response body: {e}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    parts.headers.remove(header::CONTENT_LENGTH);
    let html = inject_script(&bytes, &client_script(port));

    Response::from_parts(parts, Body::from(html))
}

fn is_html(response: &Response) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("text/html"))
}

/// Inserts `script` right before the last `</body>`, or at the end of the
/// document when there is none.
pub fn inject_script(html: &[u8], script: &str) -> Vec<u8> {
    const NEEDLE: &[u8] = b"</body>";

    let tag = format!("<script>{script}</script>");
    let at = html
        .windows(NEEDLE.len())
        .rposition(|window| window.eq_ignore_ascii_case(NEEDLE))
        .unwrap_or(html.len());

    let mut out = Vec::with_capacity(html.len() + tag.len());
    out.extend_from_slice(&html[..at]);
    out.extend_from_slice(tag.as_bytes());
    out.extend_from_slice(&html[at..]);
    out
}
