//! Local preview server.
//!
//! Serves the output tree over plain HTTP on a background thread. A
//! [`PreviewServer`] owns that thread; [`PreviewServer::stop`] unblocks the
//! listener and joins it, so the live-rebuild loop can take the server down
//! before touching the tree.
//!
//! Request resolution:
//!
//! 1. exact file → served
//! 2. directory → its `index.html`
//! 3. extensionless path → the `.html` file of that name (feed ids use this)
//! 4. anything else → 404

use std::fs;
use std::net::SocketAddr;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc;
use std::thread::JoinHandle;
use thiserror::Error;
use tiny_http::{Header, Request, Response, Server};

/// Address the `test` and `dev` commands listen on.
pub const PREVIEW_ADDR: &str = "127.0.0.1:8000";

#[derive(Error, Debug)]
pub enum ServeError {
    #[error("could not listen on {addr}: {message}")]
    Bind { addr: String, message: String },
    #[error("output directory {0} does not exist, run `lead build` first")]
    MissingOutput(PathBuf),
    #[error("could not install interrupt handler: {0}")]
    Signal(#[from] ctrlc::Error),
}

pub struct PreviewServer {
    server: Arc<Server>,
    addr: Option<SocketAddr>,
    handle: Option<JoinHandle<()>>,
}

impl PreviewServer {
    /// Bind `addr` and start answering requests from `root`.
    pub fn start(root: &Path, addr: &str) -> Result<Self, ServeError> {
        let server = Server::http(addr).map_err(|e| ServeError::Bind {
            addr: addr.to_string(),
            message: e.to_string(),
        })?;
        let server = Arc::new(server);
        let local = server.server_addr().to_ip();
        log::info!(
            "Serving {} at http://{}",
            root.display(),
            local.map_or_else(|| addr.to_string(), |a| a.to_string())
        );

        let worker = Arc::clone(&server);
        let root = root.to_path_buf();
        let handle = std::thread::spawn(move || {
            for request in worker.incoming_requests() {
                if let Err(e) = handle_request(request, &root) {
                    log::warn!("request error: {e}");
                }
            }
        });

        Ok(Self {
            server,
            addr: local,
            handle: Some(handle),
        })
    }

    /// The bound socket address.
    pub fn addr(&self) -> Option<SocketAddr> {
        self.addr
    }

    /// Stop listening and wait for the worker thread.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.server.unblock();
            if handle.join().is_err() {
                log::warn!("preview server thread panicked");
            }
            log::debug!("Preview server stopped");
        }
    }
}

impl Drop for PreviewServer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Serve `root` until interrupted.
pub fn serve_until_interrupted(root: &Path, addr: &str) -> Result<(), ServeError> {
    if !root.is_dir() {
        return Err(ServeError::MissingOutput(root.to_path_buf()));
    }
    let (tx, rx) = mpsc::channel();
    ctrlc::set_handler(move || {
        let _ = tx.send(());
    })?;

    let server = PreviewServer::start(root, addr)?;
    let _ = rx.recv();
    log::info!("Shutting down...");
    server.stop();
    Ok(())
}

// ============================================================================
// Request handling
// ============================================================================

/// Map a request URL to a file under `root`.
pub fn resolve(root: &Path, url: &str) -> Option<PathBuf> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let decoded = urlencoding::decode(path).ok()?;
    let relative = Path::new(decoded.trim_matches('/'));
    if relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
    {
        return None;
    }

    let local = root.join(relative);
    if local.is_file() {
        return Some(local);
    }
    if local.is_dir() {
        let index = local.join("index.html");
        return index.is_file().then_some(index);
    }
    if local.extension().is_none() {
        let html = local.with_extension("html");
        return html.is_file().then_some(html);
    }
    None
}

fn handle_request(request: Request, root: &Path) -> std::io::Result<()> {
    log::debug!("{} {}", request.method(), request.url());
    match resolve(root, request.url()) {
        Some(path) => {
            let content = fs::read(&path)?;
            let mut response = Response::from_data(content);
            if let Ok(header) = Header::from_bytes("Content-Type", guess_content_type(&path)) {
                response = response.with_header(header);
            }
            request.respond(response)
        }
        None => request.respond(Response::from_string("404 Not Found").with_status_code(404)),
    }
}

/// Guess MIME content type from file extension.
pub fn guess_content_type(path: &Path) -> &'static str {
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
        Some("ico") => "image/x-icon",
        Some("woff2") => "font/woff2",
        Some("txt") => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpStream;
    use tempfile::TempDir;

    fn tree() -> TempDir {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("notebook")).unwrap();
        fs::write(tmp.path().join("index.html"), "home").unwrap();
        fs::write(tmp.path().join("notebook/hi.html"), "hi").unwrap();
        fs::write(tmp.path().join("rss.xml"), "<rss/>").unwrap();
        tmp
    }

    #[test]
    fn resolves_files_directories_and_extensionless_paths() {
        let tmp = tree();
        let root = tmp.path();
        assert_eq!(resolve(root, "/"), Some(root.join("index.html")));
        assert_eq!(resolve(root, "/rss.xml"), Some(root.join("rss.xml")));
        assert_eq!(
            resolve(root, "/notebook/hi"),
            Some(root.join("notebook/hi.html"))
        );
        assert_eq!(
            resolve(root, "/notebook/hi.html?t=1"),
            Some(root.join("notebook/hi.html"))
        );
        assert_eq!(resolve(root, "/notebook/"), None);
        assert_eq!(resolve(root, "/missing.html"), None);
    }

    #[test]
    fn parent_components_are_refused() {
        let tmp = tree();
        assert_eq!(resolve(&tmp.path().join("notebook"), "/../index.html"), None);
        assert_eq!(resolve(tmp.path(), "/%2e%2e/etc/passwd"), None);
    }

    #[test]
    fn content_types_by_extension() {
        assert_eq!(guess_content_type(Path::new("a.html")), "text/html; charset=utf-8");
        assert_eq!(guess_content_type(Path::new("a.jpg")), "image/jpeg");
        assert_eq!(guess_content_type(Path::new("a.bin")), "application/octet-stream");
    }

    fn get(addr: SocketAddr, path: &str) -> String {
        let mut stream = TcpStream::connect(addr).unwrap();
        write!(stream, "GET {path} HTTP/1.0\r\nHost: localhost\r\n\r\n").unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).unwrap();
        response
    }

    #[test]
    fn serves_until_stopped() {
        let tmp = tree();
        let server = PreviewServer::start(tmp.path(), "127.0.0.1:0").unwrap();
        let addr = server.addr().unwrap();

        let ok = get(addr, "/notebook/hi");
        assert!(ok.starts_with("HTTP/1.0 200") || ok.starts_with("HTTP/1.1 200"));
        assert!(ok.ends_with("hi"));
        assert!(ok.contains("text/html"));

        let missing = get(addr, "/nope.css");
        assert!(missing.contains(" 404 "));

        server.stop();
    }
}
