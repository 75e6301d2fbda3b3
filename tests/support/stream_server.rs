//! Minimal HTTP/1.1 server that replays one scripted response per connection.
//!
//! wiremock cannot cut a response body short, so mid-stream drops are simulated
//! here: the server advertises the full `Content-Length`, writes only part of
//! the body and closes the socket.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// What to send back on one connection.
#[derive(Debug, Clone)]
pub enum Reply {
    /// `200 OK` with the whole body.
    Full(Vec<u8>),
    /// `200 OK` advertising the whole body, but only the first `sent` bytes
    /// are written before the connection is closed.
    DropAfter { body: Vec<u8>, sent: usize },
    /// Like `DropAfter`, but the connection stays open and silent until the
    /// client hangs up.
    StallAfter { body: Vec<u8>, sent: usize },
    /// An empty response with the given status line, e.g. `"503 Service Unavailable"`.
    Status(&'static str),
}

/// Handle to a running scripted server.
pub struct StreamServer {
    pub url: String,
    requests: Arc<AtomicUsize>,
}

impl StreamServer {
    /// Number of requests served so far.
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

/// Starts a server in a background thread. Connection `n` gets `script[n]`;
/// once the script runs out every connection gets `503 Service Unavailable`.
pub fn start(script: Vec<Reply>) -> StreamServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("local addr").port();
    let script = Arc::new(Mutex::new(script.into_iter()));
    let requests = Arc::new(AtomicUsize::new(0));
    let served = Arc::clone(&requests);

    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let reply = script
                .lock()
                .expect("script lock")
                .next()
                .unwrap_or(Reply::Status("503 Service Unavailable"));
            served.fetch_add(1, Ordering::SeqCst);
            // Sequential on purpose: the recorder never overlaps attempts.
            handle(stream, &reply);
        }
    });

    StreamServer {
        url: format!("http://127.0.0.1:{port}/live.mp3"),
        requests,
    }
}

fn handle(mut stream: TcpStream, reply: &Reply) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    if !read_request_head(&mut stream) {
        return;
    }

    let (status, advertised, payload): (&str, usize, &[u8]) = match reply {
        Reply::Full(body) => ("200 OK", body.len(), body.as_slice()),
        Reply::DropAfter { body, sent } | Reply::StallAfter { body, sent } => {
            ("200 OK", body.len(), &body[..*sent])
        }
        Reply::Status(status) => (*status, 0, &[][..]),
    };

    let head = format!(
        "HTTP/1.1 {status}\r\nContent-Type: audio/mpeg\r\nContent-Length: {advertised}\r\nConnection: close\r\n\r\n"
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(payload);
    let _ = stream.flush();
    if matches!(reply, Reply::StallAfter { .. }) {
        wait_for_hangup(&mut stream);
    }
    let _ = stream.shutdown(std::net::Shutdown::Both);
}

fn read_request_head(stream: &mut TcpStream) -> bool {
    let mut received = Vec::new();
    let mut buf = [0u8; 1024];
    while !received.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => return false,
            Ok(n) => received.extend_from_slice(&buf[..n]),
        }
    }
    true
}

fn wait_for_hangup(stream: &mut TcpStream) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(10)));
    let mut buf = [0u8; 64];
    while let Ok(n) = stream.read(&mut buf) {
        if n == 0 {
            break;
        }
    }
}

/// Returns a URL on a port nothing listens on.
pub fn refused_url() -> String {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.local_addr().expect("local addr").port()
    };
    format!("http://127.0.0.1:{port}/live.mp3")
}

/// Deterministic non-repeating-looking test audio.
pub fn audio_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 31 % 251) as u8).collect()
}
