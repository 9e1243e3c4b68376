//! Fixtures shared by unit and behaviour tests.
//!
//! Helpers panic on I/O failure; they are only meant for tests.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpListener};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use camino::{Utf8Path, Utf8PathBuf};
use serde_json::Value;
use tempfile::TempDir;

/// Temporary directory holding JSON fixture files.
#[derive(Debug)]
pub struct FixtureDir {
    dir: TempDir,
    root: Utf8PathBuf,
}

impl Default for FixtureDir {
    fn default() -> Self {
        Self::new()
    }
}

impl FixtureDir {
    /// Create an empty fixture directory.
    ///
    /// # Panics
    /// Panics when the directory cannot be created or is not UTF-8.
    #[must_use]
    pub fn new() -> Self {
        let dir = match TempDir::new() {
            Ok(dir) => dir,
            Err(err) => panic!("create fixture directory: {err}"),
        };
        let root = match Utf8Path::from_path(dir.path()) {
            Some(path) => path.to_path_buf(),
            None => panic!("fixture directory is not UTF-8: {}", dir.path().display()),
        };
        Self { dir, root }
    }

    /// Path of `name` inside the directory, whether or not it exists.
    #[must_use]
    pub fn path(&self, name: &str) -> Utf8PathBuf {
        self.root.join(name)
    }

    /// Write `value` as pretty JSON to `name`.
    ///
    /// # Panics
    /// Panics when the file cannot be written.
    pub fn write_json(&self, name: &str, value: &Value) -> Utf8PathBuf {
        let text = match serde_json::to_string_pretty(value) {
            Ok(text) => text,
            Err(err) => panic!("serialise fixture {name}: {err}"),
        };
        self.write_text(name, &text)
    }

    /// Write raw text to `name`.
    ///
    /// # Panics
    /// Panics when the file cannot be written.
    pub fn write_text(&self, name: &str, text: &str) -> Utf8PathBuf {
        let path = self.path(name);
        if let Err(err) = barri_fs::write_utf8(&path, text) {
            panic!("write fixture {path}: {err}");
        }
        path
    }

    /// Underlying temporary directory.
    #[must_use]
    pub const fn temp_dir(&self) -> &TempDir {
        &self.dir
    }
}

/// A request captured by [`StubBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedRequest {
    /// HTTP method, e.g. `GET`.
    pub method: String,
    /// Request target, e.g. `/api/formularios`.
    pub path: String,
    /// Raw request body.
    pub body: String,
}

impl CapturedRequest {
    /// Body parsed as JSON, or `null` when it is not JSON.
    #[must_use]
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or(Value::Null)
    }
}

/// A canned response served by [`StubBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CannedResponse {
    /// Status code.
    pub status: u16,
    /// Body sent as `application/json`.
    pub body: String,
}

impl CannedResponse {
    /// Respond with `status` and a JSON `body`.
    #[must_use]
    pub fn json(status: u16, body: &Value) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }
}

/// Minimal HTTP/1.1 server answering a fixed sequence of requests.
///
/// Each accepted connection consumes the next canned response. The server
/// thread stops once every response has been served.
#[derive(Debug)]
pub struct StubBackend {
    addr: SocketAddr,
    captured: Arc<Mutex<Vec<CapturedRequest>>>,
    worker: Option<JoinHandle<()>>,
}

impl StubBackend {
    /// Start serving `responses` on an ephemeral local port.
    ///
    /// # Panics
    /// Panics when the listener cannot be bound.
    #[must_use]
    pub fn serve(responses: Vec<CannedResponse>) -> Self {
        let listener = match TcpListener::bind("127.0.0.1:0") {
            Ok(listener) => listener,
            Err(err) => panic!("bind stub backend: {err}"),
        };
        let addr = match listener.local_addr() {
            Ok(addr) => addr,
            Err(err) => panic!("stub backend address: {err}"),
        };
        let captured = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&captured);
        let worker = thread::spawn(move || {
            for response in responses {
                let Ok((mut stream, _)) = listener.accept() else {
                    return;
                };
                let Some(request) = read_request(&mut stream) else {
                    return;
                };
                sink.lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(request);
                let reply = format!(
                    "HTTP/1.1 {} Stub\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    response.status,
                    response.body.len(),
                    response.body
                );
                let _ = stream.write_all(reply.as_bytes());
                let _ = stream.flush();
            }
        });
        Self {
            addr,
            captured,
            worker: Some(worker),
        }
    }

    /// Base URL of the server with `prefix` appended, e.g. `/api/backend`.
    #[must_use]
    pub fn base_url(&self, prefix: &str) -> String {
        format!("http://{}{prefix}", self.addr)
    }

    /// Requests received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.captured
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Wait for the server to serve every response and return the requests.
    #[must_use]
    pub fn finish(mut self) -> Vec<CapturedRequest> {
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
        self.requests()
    }
}

fn read_request(stream: &mut std::net::TcpStream) -> Option<CapturedRequest> {
    let mut reader = BufReader::new(stream.try_clone().ok()?);
    let mut request_line = String::new();
    reader.read_line(&mut request_line).ok()?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next()?.to_owned();
    let path = parts.next()?.to_owned();

    let mut content_length = 0_usize;
    loop {
        let mut header = String::new();
        reader.read_line(&mut header).ok()?;
        let header = header.trim_end();
        if header.is_empty() {
            break;
        }
        if let Some((name, value)) = header.split_once(':') {
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().ok()?;
            }
        }
    }

    let mut body = vec![0_u8; content_length];
    reader.read_exact(&mut body).ok()?;
    Some(CapturedRequest {
        method,
        path,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}
