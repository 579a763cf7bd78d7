//! Static file server for the compiled web client
//!
//! Serves the Trunk output from dist/ on port 8080. Client-side routes
//! (/discover, /matches, ...) fall back to index.html so deep links and
//! reloads work.

use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::path::{Path, PathBuf};

const DIST_DIR: &str = "dist";

fn main() {
    let addr = "127.0.0.1:8080";
    let listener = TcpListener::bind(addr).expect("Failed to bind to port 8080");

    println!("VibeMatch web server running at http://{}", addr);
    println!("Serving from {}/ directory", DIST_DIR);
    println!("Press Ctrl+C to stop\n");

    for stream in listener.incoming() {
        match stream {
            Ok(stream) => handle_client(stream),
            Err(e) => eprintln!("Connection error: {}", e),
        }
    }
}

fn handle_client(mut stream: TcpStream) {
    let buf_reader = BufReader::new(&mut stream);
    let request_line = match buf_reader.lines().next() {
        Some(Ok(line)) => line,
        _ => {
            eprintln!("Failed to read request line");
            return;
        }
    };

    let full_path = request_line.split_whitespace().nth(1).unwrap_or("/");
    let (path, _query) = match full_path.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (full_path, None),
    };

    let file_path = resolve(path);
    match fs::read(&file_path) {
        Ok(contents) => {
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: {}\r\nContent-Length: {}\r\nCache-Control: no-cache\r\n\r\n",
                content_type(&file_path),
                contents.len()
            );
            if stream.write_all(response.as_bytes()).is_ok() {
                stream.write_all(&contents).ok();
            }
        }
        Err(_) => {
            let body = "404 Not Found";
            let response = format!(
                "HTTP/1.1 404 Not Found\r\nContent-Type: text/plain\r\nContent-Length: {}\r\n\r\n{}",
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).ok();
        }
    }
}

/// Map a request path to a file under dist/. Paths without an extension are
/// client-side routes and get index.html.
fn resolve(path: &str) -> PathBuf {
    let trimmed = path.trim_start_matches('/');
    let candidate = Path::new(DIST_DIR).join(trimmed);

    if trimmed.is_empty() || candidate.extension().is_none() {
        return Path::new(DIST_DIR).join("index.html");
    }
    candidate
}

fn content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html") => "text/html; charset=utf-8",
        Some("js") => "application/javascript",
        Some("wasm") => "application/wasm",
        Some("css") => "text/css",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("svg") => "image/svg+xml",
        Some("webp") => "image/webp",
        Some("ico") => "image/x-icon",
        _ => "application/octet-stream",
    }
}
