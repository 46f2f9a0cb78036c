//! A one-shot HTTP server answering with a canned body.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::sync::mpsc::{self, Receiver};
use std::thread;

/// What the server saw.
#[derive(Debug, Clone)]
pub struct SeenRequest {
    /// e.g. `GET /route/v1/foot/... HTTP/1.1`.
    pub line: String,
    pub body: String,
}

/// A server that answers a single request and reports it.
pub struct CannedServer {
    /// Base URL, e.g. `http://127.0.0.1:40123`.
    pub base_url: String,
    /// Receives the request once it has been served.
    pub requests: Receiver<SeenRequest>,
}

/// Serve `body` with `status` to the first connection.
pub fn serve_once(status: &str, body: &str) -> CannedServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback listener");
    let addr = listener.local_addr().expect("listener address");
    let (tx, rx) = mpsc::channel();
    let response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    thread::spawn(move || {
        let Ok((mut stream, _)) = listener.accept() else {
            return;
        };
        let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
        let mut request_line = String::new();
        reader.read_line(&mut request_line).expect("read request line");
        let mut content_length = 0_usize;
        let mut header = String::new();
        while reader.read_line(&mut header).is_ok_and(|n| n > 2) {
            if let Some((name, value)) = header.split_once(':') {
                if name.eq_ignore_ascii_case("content-length") {
                    content_length = value.trim().parse().unwrap_or(0);
                }
            }
            header.clear();
        }
        let mut body = vec![0_u8; content_length];
        reader.read_exact(&mut body).expect("read request body");
        stream.write_all(response.as_bytes()).expect("write response");
        stream.flush().expect("flush response");
        let _ = tx.send(SeenRequest {
            line: request_line.trim_end().to_owned(),
            body: String::from_utf8_lossy(&body).into_owned(),
        });
    });
    CannedServer {
        base_url: format!("http://{addr}"),
        requests: rx,
    }
}

/// A base URL nothing listens on.
pub fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback listener");
    let addr = listener.local_addr().expect("listener address");
    drop(listener);
    format!("http://{addr}")
}
