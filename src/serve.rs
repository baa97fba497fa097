//! Local preview server for the generated site.
//!
//! A small blocking HTTP server on `tiny_http`:
//!
//! - Static file serving from `public/`
//! - Automatic `index.html` resolution for directories
//! - Graceful shutdown on Ctrl+C
//!
//! ```text
//! GET /posts/hello ──► public/posts/hello ──► is dir? ──► public/posts/hello/index.html
//! ```

use crate::{config::defaults::PUBLISH_DIR, log, logger::Logger};
use anyhow::{Context, Result, anyhow, bail};
use std::{
    fs,
    io::Cursor,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::{Component, Path, PathBuf},
    sync::Arc,
};
use tiny_http::{Header, Request, Response, Server, StatusCode};

/// Ports tried after the requested one is taken
const MAX_PORT_RETRIES: u16 = 10;

/// Serve `<root>/public` on `127.0.0.1:<port>` until Ctrl+C.
pub fn develop(root: &Path, port: u16, logger: Logger) -> Result<()> {
    let serve_root = root.join(PUBLISH_DIR);
    if !serve_root.is_dir() {
        bail!(
            "`{}` does not exist, run `clog build` first",
            serve_root.display()
        );
    }

    let (server, addr) = try_bind_port(IpAddr::V4(Ipv4Addr::LOCALHOST), port, logger)?;
    let server = Arc::new(server);

    let server_for_signal = Arc::clone(&server);
    ctrlc::set_handler(move || {
        log!(logger, "serve"; "shutting down...");
        server_for_signal.unblock();
    })
    .context("Failed to set Ctrl+C handler")?;

    log!(logger, "serve"; "http://{}", addr);

    for request in server.incoming_requests() {
        if let Err(e) = handle_request(request, &serve_root) {
            log!(logger, "serve"; "request error: {e}");
        }
    }

    Ok(())
}

/// Bind `base_port`, or the first free one of the next few ports.
fn try_bind_port(interface: IpAddr, base_port: u16, logger: Logger) -> Result<(Server, SocketAddr)> {
    let mut last_error = None;
    for offset in 0..MAX_PORT_RETRIES {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!(logger, "serve"; "port {} in use, using {} instead", base_port, port);
                }
                return Ok((server, addr));
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(anyhow!(
        "Failed to bind after {} attempts (ports {}-{}): {}",
        MAX_PORT_RETRIES,
        base_port,
        base_port.saturating_add(MAX_PORT_RETRIES - 1),
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}

// ============================================================================
// Request Handling
// ============================================================================

fn handle_request(request: Request, serve_root: &Path) -> Result<()> {
    match resolve_path(serve_root, request.url()) {
        Some(path) => serve_file(request, &path),
        None => serve_not_found(request),
    }
}

/// Map a request URL to a file below `serve_root`.
///
/// The URL is decoded and its query string dropped; `..` segments never
/// resolve. Directories resolve to their `index.html`.
fn resolve_path(serve_root: &Path, url: &str) -> Option<PathBuf> {
    let decoded = urlencoding::decode(url).ok()?;
    let path = decoded.split(['?', '#']).next().unwrap_or_default();
    let request_path = Path::new(path.trim_matches('/'));

    if request_path
        .components()
        .any(|c| !matches!(c, Component::Normal(_)))
    {
        return None;
    }

    let local_path = serve_root.join(request_path);
    if local_path.is_file() {
        return Some(local_path);
    }
    let index = local_path.join("index.html");
    index.is_file().then_some(index)
}

fn serve_file(request: Request, path: &Path) -> Result<()> {
    let content = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let response = Response::from_data(content).with_header(content_type(guess_content_type(path))?);
    request.respond(response)?;
    Ok(())
}

fn serve_not_found(request: Request) -> Result<()> {
    let body = "404 Not Found";
    let response = Response::new(
        StatusCode(404),
        vec![content_type("text/plain; charset=utf-8")?],
        Cursor::new(body),
        Some(body.len()),
        None,
    );
    request.respond(response)?;
    Ok(())
}

fn content_type(value: &str) -> Result<Header> {
    Header::from_bytes("Content-Type", value).map_err(|()| anyhow!("invalid header value `{value}`"))
}

/// Guess MIME content type from file extension.
fn guess_content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js" | "mjs") => "application/javascript; charset=utf-8",
        Some("json") => "application/json; charset=utf-8",
        Some("xml") => "application/xml; charset=utf-8",

        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("ico") => "image/x-icon",

        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",

        Some("pdf") => "application/pdf",
        Some("txt") => "text/plain; charset=utf-8",

        _ => "application/octet-stream",
    }
}
